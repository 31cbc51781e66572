mod collation;
mod field_type;
mod matcher;
mod row_type;

pub use {
    collation::{Direction, FieldCollation, Monotonicity},
    field_type::FieldType,
    matcher::NameMatcher,
    row_type::{DefaultTypeFactory, RowField, RowType, StructKind, TypeFactory},
};
