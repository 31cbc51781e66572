mod expr;
mod filter;
mod project;
mod scan;

pub use {
    expr::{ComparisonExpr, Literal, LogicExpr, ScalarExpr},
    filter::FilterNode,
    project::ProjectNode,
    scan::ScanNode,
};

use def::{RowField, RowType};

/// Relational algebra produced by the view rewrite engine: a scan of a base
/// table, optionally filtered, optionally projected.
#[derive(Debug, Clone, PartialEq)]
pub enum RelNode {
    Scan(ScanNode),
    Filter(Box<FilterNode>),
    Project(Box<ProjectNode>),
}

impl RelNode {
    pub fn scan(table: Vec<String>, row_type: RowType) -> Self {
        Self::Scan(ScanNode { table, row_type })
    }

    pub fn filter(input: RelNode, predicate: ScalarExpr) -> Self {
        Self::Filter(Box::new(FilterNode { input, predicate }))
    }

    pub fn project(input: RelNode, exprs: Vec<ScalarExpr>, field_names: Vec<String>) -> Self {
        Self::Project(Box::new(ProjectNode {
            input,
            exprs,
            field_names,
        }))
    }

    /// Fields this node exposes to its consumer.
    ///
    /// A projection of a non-reference expression exposes it untyped; the
    /// rewrite engine only ever projects input references.
    pub fn output_fields(&self) -> Vec<RowField> {
        match self {
            Self::Scan(scan) => scan.row_type.fields.clone(),
            Self::Filter(filter) => filter.input.output_fields(),
            Self::Project(project) => {
                let input_fields = project.input.output_fields();

                project
                    .exprs
                    .iter()
                    .zip(project.field_names.iter())
                    .map(|(expr, name)| {
                        let field_type = match expr {
                            ScalarExpr::InputRef(idx) => input_fields
                                .get(*idx)
                                .map(|field| field.field_type.clone())
                                .unwrap_or(def::FieldType::Any),
                            _ => def::FieldType::Any,
                        };
                        RowField::new(name.clone(), field_type)
                    })
                    .collect()
            }
        }
    }
}

impl std::fmt::Display for RelNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan(node) => node.fmt(f),
            Self::Filter(node) => node.fmt(f),
            Self::Project(node) => node.fmt(f),
        }
    }
}
