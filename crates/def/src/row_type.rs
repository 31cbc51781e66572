use {
    crate::{FieldType, NameMatcher},
    common::pub_fields_struct,
};

/// Field-name disambiguation policy of a struct type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StructKind {
    /// Fields may only be referenced through the full column path.
    #[default]
    FullyQualified,
    /// Nested fields may be referenced as if they were top-level columns.
    PeekFields,
    /// Like `PeekFields`, and the struct is also the fallback for otherwise
    /// unresolved names.
    PeekFieldsDefault,
    None,
}

pub_fields_struct! {
    #[derive(Clone, Debug, PartialEq)]
    struct RowField {
        name: String,
        field_type: FieldType,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct RowType {
        kind: StructKind,
        fields: Vec<RowField>,
    }
}

impl RowField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

impl RowType {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, idx: usize) -> Option<&RowField> {
        self.fields.get(idx)
    }

    pub fn field_named(&self, matcher: NameMatcher, name: &str) -> Option<(usize, &RowField)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| matcher.matches(&field.name, name))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

/// Construction seam for struct types, called at descriptor finalization and
/// at table extension.
pub trait TypeFactory {
    fn struct_type_with_kind(&self, kind: StructKind, fields: Vec<RowField>) -> RowType;

    fn struct_type(&self, fields: Vec<RowField>) -> RowType {
        self.struct_type_with_kind(StructKind::FullyQualified, fields)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTypeFactory;

impl TypeFactory for DefaultTypeFactory {
    fn struct_type_with_kind(&self, kind: StructKind, fields: Vec<RowField>) -> RowType {
        RowType { kind, fields }
    }
}
