use crate::RowField;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    Boolean,

    // Numeric types
    Bigint,
    Decimal,
    Float,
    Integer,
    SmallInt,

    // String types
    Char(u32),
    Varchar(u32),

    Timestamp,

    /// Record type with named, typed fields; the resolver can descend into it.
    Struct(Vec<RowField>),

    /// Placeholder for fields of a dynamic-record table discovered at query
    /// time.
    Any,
}

impl FieldType {
    pub fn is_struct(&self) -> bool {
        matches!(self, Self::Struct(_))
    }

    pub fn struct_fields(&self) -> Option<&[RowField]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}
