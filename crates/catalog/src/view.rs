use {
    crate::{
        error::{IndexOutOfRangeSnafu, Result},
        CatalogEntry, TableDescriptor,
    },
    algebra::{RelNode, ScalarExpr},
    def::TypeFactory,
    snafu::prelude::*,
    std::sync::Arc,
};

/// A table defined as a filtered, projected subset of a base table.
///
/// The view's exposed row type is the projection of the base row type through
/// `column_mapping`, in mapping order. The mapping need not be contiguous,
/// need not cover all base columns, and may reorder them.
///
/// The view holds a shared reference to the base entry that was current at
/// finalization. Re-registering the base does not retarget existing views;
/// they keep rewriting against the captured base.
pub struct ModifiableView {
    descriptor: TableDescriptor,
    base: Arc<CatalogEntry>,
    column_mapping: Vec<usize>,
    constraint: ScalarExpr,
}

impl ModifiableView {
    /// Finalizes a view over `base`.
    ///
    /// Every mapped index and every input reference of the constraint must be
    /// valid in the base row type; violations fail with `IndexOutOfRange`
    /// before the view exists.
    pub fn new(
        names: Vec<String>,
        base: Arc<CatalogEntry>,
        column_mapping: Vec<usize>,
        constraint: ScalarExpr,
        factory: &dyn TypeFactory,
    ) -> Result<Self> {
        let base_row_type = base.row_type();
        let field_count = base_row_type.field_count();

        for &index in &column_mapping {
            ensure!(
                index < field_count,
                IndexOutOfRangeSnafu {
                    index,
                    count: field_count,
                }
            );
        }
        if let Some(index) = constraint.max_input_ref() {
            ensure!(
                index < field_count,
                IndexOutOfRangeSnafu {
                    index,
                    count: field_count,
                }
            );
        }

        let row_type = factory.struct_type_with_kind(
            base_row_type.kind,
            column_mapping
                .iter()
                .map(|&index| base_row_type.fields[index].clone())
                .collect(),
        );

        // Statistics default to the base table's unless overridden through
        // the descriptor's with_* functions.
        let base_descriptor = base.descriptor();
        let descriptor = TableDescriptor {
            names,
            matcher: base_descriptor.matcher,
            row_type,
            keys: Vec::new(),
            constraints: Vec::new(),
            collations: Vec::new(),
            monotonic: Vec::new(),
            rolled_up: Vec::new(),
            row_count: base_descriptor.row_count,
            max_row_count: base_descriptor.max_row_count,
            stream: base_descriptor.stream,
            temporal: base_descriptor.temporal,
            distribution: base_descriptor.distribution.clone(),
            allowed_access: base_descriptor.allowed_access,
            resolver: None,
        };

        Ok(Self {
            descriptor,
            base,
            column_mapping,
            constraint,
        })
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn base(&self) -> &Arc<CatalogEntry> {
        &self.base
    }

    pub fn column_mapping(&self) -> &[usize] {
        &self.column_mapping
    }

    pub fn constraint(&self) -> &ScalarExpr {
        &self.constraint
    }

    /// Overrides the inherited statistics on the view's own descriptor.
    pub fn with_row_count(mut self, row_count: f64) -> Self {
        self.descriptor = self.descriptor.with_row_count(row_count);
        self
    }

    /// Rewrites the view into scan → filter → project algebra.
    ///
    /// The filter predicate stays bound against the unprojected base row
    /// type; only the projection narrows the output to the mapped columns,
    /// in mapping order.
    pub fn to_algebra(&self) -> RelNode {
        let base_row_type = self.base.row_type();

        let scan = RelNode::scan(self.base.names().to_vec(), base_row_type.clone());
        let filtered = RelNode::filter(scan, self.constraint.clone());

        let exprs = self
            .column_mapping
            .iter()
            .map(|&index| ScalarExpr::input(index))
            .collect();
        let field_names = self
            .column_mapping
            .iter()
            .map(|&index| base_row_type.fields[index].name.clone())
            .collect();

        RelNode::project(filtered, exprs, field_names)
    }
}

impl std::fmt::Debug for ModifiableView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifiableView")
            .field("names", &self.descriptor.names)
            .field("base", &self.base.names())
            .field("column_mapping", &self.column_mapping)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::TableBuilder,
        algebra::{FilterNode, ProjectNode},
        def::{DefaultTypeFactory, FieldType, NameMatcher},
    };

    fn base_entry() -> Arc<CatalogEntry> {
        let mut builder = TableBuilder::new(["CATALOG", "SALES", "T"], NameMatcher::new(true));
        builder.add_column("A", FieldType::Integer);
        builder.add_column("B", FieldType::Varchar(10));
        builder.add_column("C", FieldType::Boolean);
        builder.set_row_count(14.0);

        Arc::new(CatalogEntry::Base(builder.finalize(&DefaultTypeFactory)))
    }

    fn view_names() -> Vec<String> {
        vec!["CATALOG".into(), "SALES".into(), "V".into()]
    }

    #[test]
    fn row_type_follows_mapping_order() {
        let view = ModifiableView::new(
            view_names(),
            base_entry(),
            vec![2, 0],
            ScalarExpr::greater_than(ScalarExpr::input(0), ScalarExpr::int(0)),
            &DefaultTypeFactory,
        )
        .unwrap();

        assert_eq!(
            view.descriptor().row_type().field_names().collect::<Vec<_>>(),
            vec!["C", "A"],
        );
        // statistics inherited from the base
        assert_eq!(view.descriptor().row_count(), 14.0);
    }

    #[test]
    fn rewrite_is_scan_filter_project() {
        let constraint = ScalarExpr::greater_than(ScalarExpr::input(0), ScalarExpr::int(0));
        let view = ModifiableView::new(
            view_names(),
            base_entry(),
            vec![2, 0],
            constraint.clone(),
            &DefaultTypeFactory,
        )
        .unwrap();

        let RelNode::Project(project) = view.to_algebra() else {
            panic!("expected a projection at the root");
        };
        let ProjectNode {
            input,
            exprs,
            field_names,
        } = *project;

        assert_eq!(exprs, vec![ScalarExpr::input(2), ScalarExpr::input(0)]);
        assert_eq!(field_names, vec!["C".to_string(), "A".to_string()]);

        let RelNode::Filter(filter) = input else {
            panic!("expected a filter under the projection");
        };
        let FilterNode { input, predicate } = *filter;
        assert_eq!(predicate, constraint);

        let RelNode::Scan(scan) = input else {
            panic!("expected a scan under the filter");
        };
        // the predicate is bound against the full, unprojected base row type
        assert_eq!(scan.row_type.field_count(), 3);
        assert_eq!(scan.table, vec!["CATALOG", "SALES", "T"]);
    }

    #[test]
    fn mapping_out_of_range_is_rejected() {
        let err = ModifiableView::new(
            view_names(),
            base_entry(),
            vec![3],
            ScalarExpr::int(1),
            &DefaultTypeFactory,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            crate::Error::IndexOutOfRange { index: 3, count: 3 }
        ));
    }

    #[test]
    fn constraint_out_of_range_is_rejected() {
        let err = ModifiableView::new(
            view_names(),
            base_entry(),
            vec![0],
            ScalarExpr::greater_than(ScalarExpr::input(5), ScalarExpr::int(0)),
            &DefaultTypeFactory,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            crate::Error::IndexOutOfRange { index: 5, count: 3 }
        ));
    }

    #[test]
    fn statistics_can_be_overridden() {
        let view = ModifiableView::new(
            view_names(),
            base_entry(),
            vec![0],
            ScalarExpr::int(1),
            &DefaultTypeFactory,
        )
        .unwrap()
        .with_row_count(5.0);

        assert_eq!(view.descriptor().row_count(), 5.0);
    }
}
