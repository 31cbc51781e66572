mod column;
mod entry;
mod error;
mod registry;
mod resolver;
mod table;
mod view;

pub use {
    column::{ColumnDescriptor, ReferentialConstraint},
    entry::{CatalogEntry, DynamicRecordTable, ExtensibleTable, MustFilterTable},
    error::{Error, Result},
    registry::{CatalogRegistry, RegistryConfig},
    resolver::{resolve_unique, ColumnResolver, ResolvedColumn, StructFieldResolver},
    table::{
        AccessKind, CallKind, ClauseKind, Distribution, Modality, TableBuilder, TableDescriptor,
    },
    view::ModifiableView,
};
