use {
    common::pub_fields_struct,
    def::{FieldType, RowField},
};

pub_fields_struct! {
    /// A named, typed column accumulated by the table builder before the row
    /// type is frozen.
    #[derive(Clone, Debug, PartialEq)]
    struct ColumnDescriptor {
        name: String,
        field_type: FieldType,
    }

    /// Reference from a set of this table's columns to another table's key.
    /// Informational only; nothing in the catalog enforces it.
    #[derive(Clone, Debug, PartialEq)]
    struct ReferentialConstraint {
        source_columns: Vec<usize>,
        target_table: Vec<String>,
        target_columns: Vec<usize>,
    }
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn into_field(self) -> RowField {
        RowField::new(self.name, self.field_type)
    }
}
