use {
    crate::{
        error::{IndexOutOfRangeSnafu, Result, UnknownColumnSnafu},
        ColumnDescriptor, ColumnResolver, ReferentialConstraint,
    },
    common::dsa::BitSet,
    def::{FieldCollation, Monotonicity, NameMatcher, RowType, StructKind, TypeFactory},
    snafu::prelude::*,
    std::sync::Arc,
};

/// How a table's rows are spread across nodes, as exposed to the planner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Distribution {
    /// Every node holds a full copy.
    #[default]
    Broadcast,
    Singleton,
    Hash(Vec<usize>),
    Random,
    Any,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modality {
    Relation,
    Stream,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessKind {
    #[default]
    All,
    ReadOnly,
    WriteOnly,
}

/// Aggregate call kinds the rolled-up governance predicate distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Max,
    Min,
    Sum,
    Count,
    Avg,
}

/// Clause enclosing an aggregate call over a rolled-up column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseKind {
    Select,
    Filter,
    OrderBy,
    GroupBy,
    Having,
}

/// Finalized base-table metadata.
///
/// Produced once by [`TableBuilder::finalize`]; immutable afterwards. The
/// `with_*` functions derive updated copies instead of mutating in place.
#[derive(Clone)]
pub struct TableDescriptor {
    pub(crate) names: Vec<String>,
    pub(crate) matcher: NameMatcher,
    pub(crate) row_type: RowType,
    pub(crate) keys: Vec<BitSet>,
    pub(crate) constraints: Vec<ReferentialConstraint>,
    pub(crate) collations: Vec<FieldCollation>,
    pub(crate) monotonic: Vec<(String, Monotonicity)>,
    pub(crate) rolled_up: Vec<String>,
    pub(crate) row_count: f64,
    pub(crate) max_row_count: f64,
    pub(crate) stream: bool,
    pub(crate) temporal: bool,
    pub(crate) distribution: Distribution,
    pub(crate) allowed_access: AccessKind,
    pub(crate) resolver: Option<Arc<dyn ColumnResolver>>,
}

impl TableDescriptor {
    /// Qualified path of the table, catalog name first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or_default()
    }

    pub fn matcher(&self) -> NameMatcher {
        self.matcher
    }

    pub fn row_type(&self) -> &RowType {
        &self.row_type
    }

    pub fn keys(&self) -> &[BitSet] {
        &self.keys
    }

    /// Whether `columns` is a superset of some registered key.
    pub fn is_key(&self, columns: &BitSet) -> bool {
        self.keys.iter().any(|key| columns.contains_all(key))
    }

    pub fn referential_constraints(&self) -> &[ReferentialConstraint] {
        &self.constraints
    }

    pub fn collations(&self) -> &[FieldCollation] {
        &self.collations
    }

    pub fn row_count(&self) -> f64 {
        self.row_count
    }

    pub fn max_row_count(&self) -> f64 {
        self.max_row_count
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn allowed_access(&self) -> AccessKind {
        self.allowed_access
    }

    pub fn is_stream(&self) -> bool {
        self.stream
    }

    pub fn modality(&self) -> Modality {
        if self.stream {
            Modality::Stream
        } else {
            Modality::Relation
        }
    }

    pub fn supports_modality(&self, modality: Modality) -> bool {
        modality == self.modality()
    }

    pub fn is_temporal(&self) -> bool {
        self.temporal
    }

    pub fn monotonicity(&self, column: &str) -> Monotonicity {
        self.monotonic
            .iter()
            .find(|(name, _)| self.matcher.matches(name, column))
            .map(|(_, monotonicity)| *monotonicity)
            .unwrap_or(Monotonicity::NotMonotonic)
    }

    pub fn is_rolled_up(&self, column: &str) -> bool {
        self.rolled_up
            .iter()
            .any(|name| self.matcher.matches(name, column))
    }

    /// Advisory predicate: may an aggregate call over a rolled-up column
    /// appear under the given enclosing clause? The validator, not the
    /// catalog, rejects invalid usage.
    pub fn rolled_up_valid_inside_agg(&self, call: CallKind, clause: ClauseKind) -> bool {
        !matches!(call, CallKind::Max)
            && matches!(clause, ClauseKind::Select | ClauseKind::Filter)
    }

    pub fn resolver(&self) -> Option<&dyn ColumnResolver> {
        self.resolver.as_deref()
    }

    pub fn with_row_count(mut self, row_count: f64) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_max_row_count(mut self, max_row_count: f64) -> Self {
        self.max_row_count = max_row_count;
        self
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ColumnResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

impl std::fmt::Debug for TableDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDescriptor")
            .field("names", &self.names)
            .field("row_type", &self.row_type)
            .field("keys", &self.keys)
            .field("collations", &self.collations)
            .field("row_count", &self.row_count)
            .field("stream", &self.stream)
            .field("has_resolver", &self.resolver.is_some())
            .finish_non_exhaustive()
    }
}

/// Additive construction phase of a table descriptor.
///
/// Accumulates columns, keys, constraints, and flags; [`finalize`] consumes
/// the builder, computes the row type and the monotonicity-derived collation
/// exactly once, and freezes the result.
///
/// [`finalize`]: TableBuilder::finalize
pub struct TableBuilder {
    names: Vec<String>,
    matcher: NameMatcher,
    columns: Vec<ColumnDescriptor>,
    keys: Vec<BitSet>,
    constraints: Vec<ReferentialConstraint>,
    monotonic: Vec<(String, Monotonicity)>,
    rolled_up: Vec<String>,
    kind: StructKind,
    row_count: f64,
    max_row_count: f64,
    stream: bool,
    temporal: bool,
    distribution: Distribution,
    allowed_access: AccessKind,
    resolver: Option<Arc<dyn ColumnResolver>>,
}

impl TableBuilder {
    pub fn new<I, S>(names: I, matcher: NameMatcher) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            matcher,
            columns: Vec::new(),
            keys: Vec::new(),
            constraints: Vec::new(),
            monotonic: Vec::new(),
            rolled_up: Vec::new(),
            kind: StructKind::FullyQualified,
            row_count: 0.0,
            max_row_count: f64::INFINITY,
            stream: false,
            temporal: false,
            distribution: Distribution::Broadcast,
            allowed_access: AccessKind::All,
            resolver: None,
        }
    }

    pub fn add_column(&mut self, name: impl Into<String>, field_type: def::FieldType) {
        self.columns.push(ColumnDescriptor::new(name, field_type));
    }

    /// Appends a column and registers a single-column key on its index.
    pub fn add_key_column(&mut self, name: impl Into<String>, field_type: def::FieldType) {
        self.keys.push([self.columns.len()].into_iter().collect());
        self.add_column(name, field_type);
    }

    /// Registers a key over the named columns, resolving each name to its
    /// current index. Fails before any mutation if a name is absent.
    pub fn add_key(&mut self, columns: &[&str]) -> Result<()> {
        let key = columns
            .iter()
            .map(|column| {
                self.column_index(column).context(UnknownColumnSnafu {
                    name: column.to_string(),
                })
            })
            .collect::<Result<BitSet>>()?;

        self.keys.push(key);
        Ok(())
    }

    /// Registers a key over column indices. Fails before any mutation if an
    /// index is beyond the current column count.
    pub fn add_key_indices(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<()> {
        let key = indices.into_iter().collect::<BitSet>();
        if let Some(max) = key.max() {
            ensure!(
                max < self.columns.len(),
                IndexOutOfRangeSnafu {
                    index: max,
                    count: self.columns.len(),
                }
            );
        }

        self.keys.push(key);
        Ok(())
    }

    pub fn add_referential_constraint(
        &mut self,
        constraint: ReferentialConstraint,
    ) -> Result<()> {
        if let Some(&index) = constraint
            .source_columns
            .iter()
            .find(|&&index| index >= self.columns.len())
        {
            return IndexOutOfRangeSnafu {
                index,
                count: self.columns.len(),
            }
            .fail();
        }

        self.constraints.push(constraint);
        Ok(())
    }

    /// Declares a column monotonic. Fails with `UnknownColumn` if the column
    /// has not been added yet.
    pub fn add_monotonic(&mut self, column: &str, monotonicity: Monotonicity) -> Result<()> {
        ensure!(
            self.column_index(column).is_some(),
            UnknownColumnSnafu {
                name: column.to_string(),
            }
        );

        self.monotonic.push((column.to_string(), monotonicity));
        Ok(())
    }

    pub fn register_rolled_up(&mut self, column: impl Into<String>) {
        self.rolled_up.push(column.into());
    }

    pub fn set_struct_kind(&mut self, kind: StructKind) {
        self.kind = kind;
    }

    pub fn set_row_count(&mut self, row_count: f64) {
        self.row_count = row_count;
    }

    pub fn set_max_row_count(&mut self, max_row_count: f64) {
        self.max_row_count = max_row_count;
    }

    pub fn set_stream(&mut self, stream: bool) {
        self.stream = stream;
    }

    pub fn set_temporal(&mut self, temporal: bool) {
        self.temporal = temporal;
    }

    pub fn set_distribution(&mut self, distribution: Distribution) {
        self.distribution = distribution;
    }

    pub fn set_allowed_access(&mut self, allowed_access: AccessKind) {
        self.allowed_access = allowed_access;
    }

    pub fn set_resolver(&mut self, resolver: Arc<dyn ColumnResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.matcher
            .index_of(self.columns.iter().map(|column| column.name.as_str()), name)
    }

    /// One-time transition into the frozen descriptor: builds the row type in
    /// declared column order and deduces the collation from the monotonic
    /// columns, in row-type field order.
    pub fn finalize(self, factory: &dyn TypeFactory) -> TableDescriptor {
        let row_type = factory.struct_type_with_kind(
            self.kind,
            self.columns
                .into_iter()
                .map(ColumnDescriptor::into_field)
                .collect(),
        );

        let collations = row_type
            .fields
            .iter()
            .enumerate()
            .filter_map(|(index, field)| {
                self.monotonic
                    .iter()
                    .find(|(name, _)| self.matcher.matches(name, &field.name))
                    .filter(|(_, monotonicity)| *monotonicity != Monotonicity::NotMonotonic)
                    .map(|(_, monotonicity)| FieldCollation::new(index, monotonicity.direction()))
            })
            .collect();

        TableDescriptor {
            names: self.names,
            matcher: self.matcher,
            row_type,
            keys: self.keys,
            constraints: self.constraints,
            collations,
            monotonic: self.monotonic,
            rolled_up: self.rolled_up,
            row_count: self.row_count,
            max_row_count: self.max_row_count,
            stream: self.stream,
            temporal: self.temporal,
            distribution: self.distribution,
            allowed_access: self.allowed_access,
            resolver: self.resolver,
        }
    }
}
