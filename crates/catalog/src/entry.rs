use {
    crate::{
        error::{Result, UnsupportedCapabilitySnafu},
        resolver::{resolve_unique, ColumnResolver, ResolvedColumn},
        view::ModifiableView,
        TableDescriptor,
    },
    algebra::RelNode,
    def::{FieldType, NameMatcher, RowField, RowType, StructKind, TypeFactory},
    std::sync::RwLock,
};

/// A registered table in one of its capability shapes.
///
/// The variants are alternatives, not a hierarchy: each adds one orthogonal
/// capability to the shared base descriptor, and capability access is a
/// `match` returning an optional value.
#[derive(Debug)]
pub enum CatalogEntry {
    Base(TableDescriptor),
    Extensible(ExtensibleTable),
    ModifiableView(ModifiableView),
    DynamicRecord(DynamicRecordTable),
    MustFilter(MustFilterTable),
}

impl CatalogEntry {
    pub fn descriptor(&self) -> &TableDescriptor {
        match self {
            Self::Base(table) => table,
            Self::Extensible(table) => table.descriptor(),
            Self::ModifiableView(view) => view.descriptor(),
            Self::DynamicRecord(table) => table.descriptor(),
            Self::MustFilter(table) => table.descriptor(),
        }
    }

    pub fn names(&self) -> &[String] {
        self.descriptor().names()
    }

    /// The row type this entry exposes, which for some variants differs from
    /// the base descriptor's (extended fields, projected view columns, lazily
    /// discovered dynamic fields).
    pub fn row_type(&self) -> RowType {
        match self {
            Self::Base(table) => table.row_type().clone(),
            Self::Extensible(table) => table.row_type().clone(),
            Self::ModifiableView(view) => view.descriptor().row_type().clone(),
            Self::DynamicRecord(table) => table.row_type(),
            Self::MustFilter(table) => table.descriptor().row_type().clone(),
        }
    }

    pub fn as_extensible(&self) -> Option<&ExtensibleTable> {
        match self {
            Self::Extensible(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_modifiable_view(&self) -> Option<&ModifiableView> {
        match self {
            Self::ModifiableView(view) => Some(view),
            _ => None,
        }
    }

    pub fn as_dynamic_record(&self) -> Option<&DynamicRecordTable> {
        match self {
            Self::DynamicRecord(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_must_filter(&self) -> Option<&MustFilterTable> {
        match self {
            Self::MustFilter(table) => Some(table),
            _ => None,
        }
    }

    /// Derives an extended table, or fails with `UnsupportedCapability` on a
    /// variant without the extension capability.
    pub fn extend(
        &self,
        extra_fields: Vec<RowField>,
        factory: &dyn TypeFactory,
    ) -> Result<ExtensibleTable> {
        match self.as_extensible() {
            Some(table) => Ok(table.extend(extra_fields, factory)),
            None => UnsupportedCapabilitySnafu {
                operation: "extension",
            }
            .fail(),
        }
    }

    /// Rewrites the entry into relational algebra: views expand into
    /// scan → filter → project, every other variant into a bare scan.
    pub fn to_algebra(&self) -> RelNode {
        match self {
            Self::ModifiableView(view) => view.to_algebra(),
            _ => RelNode::scan(self.names().to_vec(), self.row_type()),
        }
    }

    pub fn resolver(&self) -> Option<&dyn ColumnResolver> {
        self.descriptor().resolver()
    }

    /// All candidates for a dotted column path, through the entry's resolver.
    pub fn resolve_column(&self, path: &[String]) -> Result<Vec<ResolvedColumn>> {
        match self.resolver() {
            Some(resolver) => Ok(resolver.resolve_column(
                &self.row_type(),
                self.descriptor().matcher(),
                path,
            )),
            None => UnsupportedCapabilitySnafu {
                operation: "column resolution",
            }
            .fail(),
        }
    }

    pub fn resolve_column_unique(&self, path: &[String]) -> Result<ResolvedColumn> {
        let resolver = match self.resolver() {
            Some(resolver) => resolver,
            None => {
                return UnsupportedCapabilitySnafu {
                    operation: "column resolution",
                }
                .fail()
            }
        };

        resolve_unique(
            resolver,
            &self.row_type(),
            self.descriptor().matcher(),
            path,
        )
    }
}

/// A table whose row type can be grown at a known offset to model schema
/// evolution.
#[derive(Debug, Clone)]
pub struct ExtensibleTable {
    descriptor: TableDescriptor,
    extension_fields: Vec<RowField>,
    row_type: RowType,
}

impl ExtensibleTable {
    pub fn new(descriptor: TableDescriptor) -> Self {
        let row_type = descriptor.row_type().clone();
        Self {
            descriptor,
            extension_fields: Vec::new(),
            row_type,
        }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn extension_fields(&self) -> &[RowField] {
        &self.extension_fields
    }

    /// Base fields followed by the extension fields.
    pub fn row_type(&self) -> &RowType {
        &self.row_type
    }

    /// Index of the first extension field: always the base field count,
    /// whatever extension produced this value.
    pub fn extension_offset(&self) -> usize {
        self.descriptor.row_type().field_count()
    }

    /// Derives a new table whose row type is the base fields concatenated
    /// with `extra_fields`. Extension never mutates and is always relative to
    /// the base: extending an already-extended table starts over from the
    /// base fields.
    pub fn extend(&self, extra_fields: Vec<RowField>, factory: &dyn TypeFactory) -> Self {
        let base_row_type = self.descriptor.row_type();
        let row_type = factory.struct_type_with_kind(
            base_row_type.kind,
            base_row_type
                .fields
                .iter()
                .cloned()
                .chain(extra_fields.iter().cloned())
                .collect(),
        );

        Self {
            descriptor: self.descriptor.clone(),
            extension_fields: extra_fields,
            row_type,
        }
    }
}

/// A table with an open-ended row type: fields are materialized on first
/// name-based access and typed `Any`, modeling schemas discovered at query
/// time. Positional access is deliberately not offered.
#[derive(Debug)]
pub struct DynamicRecordTable {
    descriptor: TableDescriptor,
    fields: RwLock<Vec<RowField>>,
}

impl DynamicRecordTable {
    pub fn new<I, S>(names: I, matcher: NameMatcher) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let descriptor = TableDescriptor {
            names: names.into_iter().map(Into::into).collect(),
            matcher,
            row_type: RowType {
                kind: StructKind::None,
                fields: Vec::new(),
            },
            keys: Vec::new(),
            constraints: Vec::new(),
            collations: Vec::new(),
            monotonic: Vec::new(),
            rolled_up: Vec::new(),
            row_count: 0.0,
            max_row_count: f64::INFINITY,
            stream: false,
            temporal: false,
            distribution: crate::Distribution::Broadcast,
            allowed_access: crate::AccessKind::All,
            resolver: None,
        };

        Self {
            descriptor,
            fields: RwLock::new(Vec::new()),
        }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    /// Looks up a field by name, materializing it with type `Any` on first
    /// access.
    pub fn field(&self, name: &str) -> RowField {
        let matcher = self.descriptor.matcher();

        {
            let fields = self.fields.read().unwrap_or_else(|e| e.into_inner());
            if let Some(field) = fields.iter().find(|field| matcher.matches(&field.name, name)) {
                return field.clone();
            }
        }

        let mut fields = self.fields.write().unwrap_or_else(|e| e.into_inner());
        // a concurrent reader may have materialized it between the two locks
        if let Some(field) = fields.iter().find(|field| matcher.matches(&field.name, name)) {
            return field.clone();
        }

        let field = RowField::new(name, FieldType::Any);
        fields.push(field.clone());
        field
    }

    /// Snapshot of the fields materialized so far, in discovery order.
    pub fn row_type(&self) -> RowType {
        RowType {
            kind: StructKind::None,
            fields: self
                .fields
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }
}

/// A table whose columns may carry mandatory filter predicates, modeling
/// access-policy metadata the validator enforces.
#[derive(Debug, Clone)]
pub struct MustFilterTable {
    descriptor: TableDescriptor,
    field_filters: Vec<(String, String)>,
    bypass_columns: Vec<usize>,
}

impl MustFilterTable {
    pub fn new(
        descriptor: TableDescriptor,
        field_filters: Vec<(String, String)>,
        bypass_columns: Vec<usize>,
    ) -> Self {
        Self {
            descriptor,
            field_filters,
            bypass_columns,
        }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    fn filter_for(&self, column: usize) -> Option<&str> {
        let field = self.descriptor.row_type().field(column)?;
        let matcher = self.descriptor.matcher();

        self.field_filters
            .iter()
            .find(|(name, _)| matcher.matches(name, &field.name))
            .map(|(_, predicate)| predicate.as_str())
    }

    /// The mandatory filter predicate registered for the column, if any.
    pub fn filter(&self, column: usize) -> Option<&str> {
        self.filter_for(column)
    }

    pub fn must_filter(&self, column: usize) -> bool {
        self.filter_for(column).is_some()
    }

    /// Columns exempt from the must-filter requirement.
    pub fn bypass_columns(&self) -> &[usize] {
        &self.bypass_columns
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::TableBuilder,
        def::{DefaultTypeFactory, FieldType},
    };

    fn three_column_table(name: &str) -> TableDescriptor {
        let mut builder =
            TableBuilder::new(["CATALOG", "SALES", name], NameMatcher::new(true));
        builder.add_key_column("EMPNO", FieldType::Integer);
        builder.add_column("ENAME", FieldType::Varchar(20));
        builder.add_column("DEPTNO", FieldType::Integer);
        builder.finalize(&DefaultTypeFactory)
    }

    #[test]
    fn extension_appends_at_base_offset() {
        let table = ExtensibleTable::new(three_column_table("EMP"));
        assert_eq!(table.extension_offset(), 3);
        assert_eq!(table.row_type().field_count(), 3);

        let extended = table.extend(
            vec![
                RowField::new("SAL", FieldType::Decimal),
                RowField::new("COMM", FieldType::Decimal),
            ],
            &DefaultTypeFactory,
        );

        assert_eq!(extended.row_type().field_count(), 5);
        assert_eq!(extended.extension_offset(), 3);
        assert_eq!(extended.row_type().fields[3].name, "SAL");
        // the original is untouched
        assert_eq!(table.row_type().field_count(), 3);
    }

    #[test]
    fn extension_is_never_cumulative() {
        let table = ExtensibleTable::new(three_column_table("EMP"));

        let first = table.extend(
            vec![RowField::new("SAL", FieldType::Decimal)],
            &DefaultTypeFactory,
        );
        let second = first.extend(
            vec![RowField::new("COMM", FieldType::Decimal)],
            &DefaultTypeFactory,
        );

        // extending an extended table starts over from the base
        assert_eq!(second.extension_offset(), 3);
        assert_eq!(second.row_type().field_count(), 4);
        assert_eq!(second.row_type().fields[3].name, "COMM");
    }

    #[test]
    fn extend_on_plain_base_is_unsupported() {
        let entry = CatalogEntry::Base(three_column_table("EMP"));
        let err = entry
            .extend(
                vec![RowField::new("SAL", FieldType::Decimal)],
                &DefaultTypeFactory,
            )
            .unwrap_err();

        assert!(matches!(err, crate::Error::UnsupportedCapability { .. }));
    }

    #[test]
    fn dynamic_record_materializes_fields_lazily() {
        let table = DynamicRecordTable::new(["CATALOG", "SALES", "NATION"], NameMatcher::new(true));
        assert_eq!(table.row_type().field_count(), 0);

        let field = table.field("N_NATIONKEY");
        assert_eq!(field.field_type, FieldType::Any);

        table.field("N_NAME");
        // repeated access does not duplicate the field
        table.field("N_NATIONKEY");

        let row_type = table.row_type();
        assert_eq!(row_type.field_count(), 2);
        assert_eq!(
            row_type.field_names().collect::<Vec<_>>(),
            vec!["N_NATIONKEY", "N_NAME"],
        );
    }

    #[test]
    fn must_filter_columns() {
        let table = MustFilterTable::new(
            three_column_table("EMP"),
            vec![("EMPNO".to_string(), "= 100".to_string())],
            vec![1],
        );

        assert!(table.must_filter(0));
        assert_eq!(table.filter(0), Some("= 100"));
        assert!(!table.must_filter(1));
        assert_eq!(table.filter(2), None);
        // out-of-range columns carry no filter
        assert!(!table.must_filter(9));
        assert_eq!(table.bypass_columns(), &[1]);
    }

    #[test]
    fn entry_rewrites_non_views_to_a_scan() {
        let entry = CatalogEntry::Base(three_column_table("EMP"));

        let RelNode::Scan(scan) = entry.to_algebra() else {
            panic!("expected a bare scan");
        };
        assert_eq!(scan.table, vec!["CATALOG", "SALES", "EMP"]);
        assert_eq!(scan.row_type.field_count(), 3);
    }

    #[test]
    fn column_resolution_requires_a_resolver() {
        let entry = CatalogEntry::Base(three_column_table("EMP"));
        let err = entry.resolve_column(&["EMPNO".to_string()]).unwrap_err();
        assert!(matches!(err, crate::Error::UnsupportedCapability { .. }));

        let with_resolver = CatalogEntry::Base(
            three_column_table("EMP")
                .with_resolver(std::sync::Arc::new(crate::StructFieldResolver)),
        );
        let candidates = with_resolver
            .resolve_column(&["EMPNO".to_string()])
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].field_index, 0);

        let resolved = with_resolver
            .resolve_column_unique(&["DEPTNO".to_string()])
            .unwrap();
        assert_eq!(resolved.field_index, 2);
    }
}
