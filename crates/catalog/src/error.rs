use snafu::prelude::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("schema {path:?} was not found"))]
    SchemaNotFound { path: String },

    #[snafu(display("table {name:?} already exists"))]
    TableExists { name: String },

    #[snafu(display("table {name:?} was not found"))]
    TableNotFound { name: String },

    #[snafu(display("type {name:?} was not found"))]
    TypeNotFound { name: String },

    #[snafu(display("column {name:?} not found in the table"))]
    UnknownColumn { name: String },

    #[snafu(display("column index {index} exceeds the number of columns ({count})"))]
    IndexOutOfRange { index: usize, count: usize },

    #[snafu(display("column reference {path:?} is ambiguous ({count} candidates)"))]
    AmbiguousResolution { path: String, count: usize },

    #[snafu(display("the table does not support {operation}"))]
    UnsupportedCapability { operation: &'static str },
}
