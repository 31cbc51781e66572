use {
    crate::error::{AmbiguousResolutionSnafu, Result, UnknownColumnSnafu},
    common::pub_fields_struct,
    def::{NameMatcher, RowField, RowType},
};

pub_fields_struct! {
    /// One candidate produced by column resolution: the matched top-level
    /// field and the path segments still left to resolve inside it.
    #[derive(Clone, Debug, PartialEq)]
    struct ResolvedColumn {
        field_index: usize,
        field: RowField,
        remaining: Vec<String>,
    }
}

/// Pluggable multi-segment column name resolution.
///
/// A resolver is a pure strategy: given a row type and a dotted name path it
/// returns every structurally valid candidate. When more than one candidate
/// matches, resolution is ambiguous; the caller decides the tie-break, never
/// this component.
pub trait ColumnResolver: Send + Sync {
    fn resolve_column(
        &self,
        row_type: &RowType,
        matcher: NameMatcher,
        path: &[String],
    ) -> Vec<ResolvedColumn>;
}

/// Default strategy: matches the leading segment against top-level fields,
/// and also offers any record-typed field containing the leading segment as a
/// nested field. A name that is both a column and a nested field therefore
/// resolves ambiguously, which is the honest answer.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructFieldResolver;

impl ColumnResolver for StructFieldResolver {
    fn resolve_column(
        &self,
        row_type: &RowType,
        matcher: NameMatcher,
        path: &[String],
    ) -> Vec<ResolvedColumn> {
        let Some((head, tail)) = path.split_first() else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for (index, field) in row_type.fields.iter().enumerate() {
            if matcher.matches(&field.name, head) {
                candidates.push(ResolvedColumn {
                    field_index: index,
                    field: field.clone(),
                    remaining: tail.to_vec(),
                });
            } else if let Some(nested) = field.field_type.struct_fields() {
                // The head may name a field nested inside a record column;
                // the whole path then remains to be resolved within it.
                if nested.iter().any(|inner| matcher.matches(&inner.name, head)) {
                    candidates.push(ResolvedColumn {
                        field_index: index,
                        field: field.clone(),
                        remaining: path.to_vec(),
                    });
                }
            }
        }
        candidates
    }
}

/// Resolves a path and insists on a single candidate.
pub fn resolve_unique(
    resolver: &dyn ColumnResolver,
    row_type: &RowType,
    matcher: NameMatcher,
    path: &[String],
) -> Result<ResolvedColumn> {
    let mut candidates = resolver.resolve_column(row_type, matcher, path);

    match candidates.len() {
        0 => UnknownColumnSnafu {
            name: path.join("."),
        }
        .fail(),
        1 => Ok(candidates.remove(0)),
        count => AmbiguousResolutionSnafu {
            path: path.join("."),
            count,
        }
        .fail(),
    }
}
