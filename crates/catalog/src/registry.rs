use {
    crate::{
        error::{
            Result, SchemaNotFoundSnafu, TableExistsSnafu, TableNotFoundSnafu, TypeNotFoundSnafu,
        },
        CatalogEntry,
    },
    common::pub_fields_struct,
    def::{FieldType, NameMatcher},
    serde::{Deserialize, Serialize},
    snafu::prelude::*,
    std::sync::Arc,
    tracing::debug,
};

pub_fields_struct! {
    /// Explicit registry configuration; there are no process-wide defaults.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct RegistryConfig {
        catalog: String,
        case_sensitive: bool,
    }
}

impl RegistryConfig {
    pub fn new(catalog: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            catalog: catalog.into(),
            case_sensitive,
        }
    }
}

struct SchemaNode {
    name: String,
    schemas: Vec<SchemaNode>,
    tables: Vec<(String, Arc<CatalogEntry>)>,
    types: Vec<(String, FieldType)>,
}

impl SchemaNode {
    fn new(name: String) -> Self {
        Self {
            name,
            schemas: Vec::new(),
            tables: Vec::new(),
            types: Vec::new(),
        }
    }

    fn child(&self, name: &str, matcher: NameMatcher) -> Option<&SchemaNode> {
        self.schemas
            .iter()
            .find(|schema| matcher.matches(&schema.name, name))
    }

    fn child_mut(&mut self, name: &str, matcher: NameMatcher) -> Option<&mut SchemaNode> {
        self.schemas
            .iter_mut()
            .find(|schema| matcher.matches(&schema.name, name))
    }

    fn table(&self, name: &str, matcher: NameMatcher) -> Option<&Arc<CatalogEntry>> {
        self.tables
            .iter()
            .find(|(table_name, _)| matcher.matches(table_name, name))
            .map(|(_, entry)| entry)
    }
}

/// The in-memory catalog: a tree of schemas rooted at a single catalog name,
/// owning table slots and named types.
///
/// Usage is two-phase: all mutation (`register_schema`, `register`,
/// `reregister`, `register_type`) happens during setup, lookups afterwards.
/// Finalized entries are immutable and shared, so concurrent reads are safe;
/// mutation concurrent with reads is not, and callers must serialize it.
pub struct CatalogRegistry {
    config: RegistryConfig,
    matcher: NameMatcher,
    root: SchemaNode,
}

impl CatalogRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        let matcher = NameMatcher::new(config.case_sensitive);
        let root = SchemaNode::new(config.catalog.clone());

        Self {
            config,
            matcher,
            root,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn matcher(&self) -> NameMatcher {
        self.matcher
    }

    pub fn catalog_name(&self) -> &str {
        &self.root.name
    }

    fn schema_node(&self, path: &[&str]) -> Result<&SchemaNode> {
        let (catalog, rest) = path.split_first().context(SchemaNotFoundSnafu {
            path: path.join("."),
        })?;
        ensure!(
            self.matcher.matches(catalog, &self.root.name),
            SchemaNotFoundSnafu {
                path: path.join("."),
            }
        );

        let mut node = &self.root;
        for segment in rest {
            node = node.child(segment, self.matcher).context(SchemaNotFoundSnafu {
                path: path.join("."),
            })?;
        }
        Ok(node)
    }

    fn schema_node_mut(&mut self, path: &[&str]) -> Result<&mut SchemaNode> {
        let (catalog, rest) = path.split_first().context(SchemaNotFoundSnafu {
            path: path.join("."),
        })?;
        ensure!(
            self.matcher.matches(catalog, &self.root.name),
            SchemaNotFoundSnafu {
                path: path.join("."),
            }
        );

        let matcher = self.matcher;
        let mut node = &mut self.root;
        for segment in rest {
            node = node
                .child_mut(segment, matcher)
                .context(SchemaNotFoundSnafu {
                    path: path.join("."),
                })?;
        }
        Ok(node)
    }

    /// Inserts an empty schema under `parent` (a catalog-prefixed path).
    /// Registering an already-present schema keeps the existing node.
    pub fn register_schema(&mut self, parent: &[&str], name: &str) -> Result<()> {
        let matcher = self.matcher;
        let node = self.schema_node_mut(parent)?;

        if node.child(name, matcher).is_none() {
            debug!(schema = name, "registering schema");
            node.schemas.push(SchemaNode::new(name.to_string()));
        }
        Ok(())
    }

    /// Inserts a finalized entry into the schema slot named by its qualified
    /// path. A slot that is already occupied is a setup error; replacement
    /// goes through [`reregister`].
    ///
    /// [`reregister`]: CatalogRegistry::reregister
    pub fn register(&mut self, entry: CatalogEntry) -> Result<Arc<CatalogEntry>> {
        let names = entry.names().to_vec();
        let (table_name, schema_path) = split_table_path(&names)?;

        let matcher = self.matcher;
        let node = self.schema_node_mut(&schema_path)?;
        ensure!(
            node.table(table_name, matcher).is_none(),
            TableExistsSnafu {
                name: names.join("."),
            }
        );

        debug!(table = %names.join("."), "registering table");
        let entry = Arc::new(entry);
        node.tables.push((table_name.to_string(), entry.clone()));
        Ok(entry)
    }

    /// Removes any entry at the path, then inserts. Not safe concurrent with
    /// in-flight lookups; callers confine it to the setup phase.
    pub fn reregister(&mut self, entry: CatalogEntry) -> Result<Arc<CatalogEntry>> {
        let names = entry.names().to_vec();
        let (table_name, schema_path) = split_table_path(&names)?;

        let matcher = self.matcher;
        let node = self.schema_node_mut(&schema_path)?;
        node.tables
            .retain(|(existing, _)| !matcher.matches(existing, table_name));

        debug!(table = %names.join("."), "replacing table");
        let entry = Arc::new(entry);
        node.tables.push((table_name.to_string(), entry.clone()));
        Ok(entry)
    }

    /// Looks up the current entry at a catalog-prefixed qualified path.
    pub fn lookup(&self, path: &[&str]) -> Result<Arc<CatalogEntry>> {
        let (table_name, schema_path) = split_path(path)?;
        let node = self.schema_node(schema_path)?;

        match node.table(table_name, self.matcher) {
            Some(entry) => Ok(entry.clone()),
            None => {
                debug!(table = %path.join("."), "lookup miss");
                TableNotFoundSnafu {
                    name: path.join("."),
                }
                .fail()
            }
        }
    }

    /// Registers a named type on a schema node, replacing a previous type of
    /// the same name.
    pub fn register_type(&mut self, path: &[&str], field_type: FieldType) -> Result<()> {
        let (type_name, schema_path) = split_path(path)?;
        let matcher = self.matcher;
        let node = self.schema_node_mut(schema_path)?;

        node.types
            .retain(|(existing, _)| !matcher.matches(existing, type_name));
        node.types.push((type_name.to_string(), field_type));
        Ok(())
    }

    pub fn lookup_type(&self, path: &[&str]) -> Result<FieldType> {
        let (type_name, schema_path) = split_path(path)?;
        let node = self.schema_node(schema_path)?;

        node.types
            .iter()
            .find(|(name, _)| self.matcher.matches(name, type_name))
            .map(|(_, field_type)| field_type.clone())
            .context(TypeNotFoundSnafu {
                name: path.join("."),
            })
    }
}

fn split_path<'a>(path: &'a [&'a str]) -> Result<(&'a str, &'a [&'a str])> {
    match path.split_last() {
        Some((last, rest)) if !rest.is_empty() => Ok((*last, rest)),
        _ => SchemaNotFoundSnafu {
            path: path.join("."),
        }
        .fail(),
    }
}

fn split_table_path(names: &[String]) -> Result<(&str, Vec<&str>)> {
    match names.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            Ok((last.as_str(), rest.iter().map(String::as_str).collect()))
        }
        _ => SchemaNotFoundSnafu {
            path: names.join("."),
        }
        .fail(),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::TableBuilder,
        def::{DefaultTypeFactory, FieldType},
    };

    fn registry() -> CatalogRegistry {
        let mut registry = CatalogRegistry::new(RegistryConfig::new("CATALOG", true));
        registry.register_schema(&["CATALOG"], "SALES").unwrap();
        registry
    }

    fn table(registry: &CatalogRegistry, path: &[&str], row_count: f64) -> CatalogEntry {
        let mut builder = TableBuilder::new(path.iter().copied(), registry.matcher());
        builder.add_key_column("ID", FieldType::Integer);
        builder.set_row_count(row_count);
        CatalogEntry::Base(builder.finalize(&DefaultTypeFactory))
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = registry();
        let entry = table(&registry, &["CATALOG", "SALES", "EMP"], 14.0);
        registry.register(entry).unwrap();

        let found = registry.lookup(&["CATALOG", "SALES", "EMP"]).unwrap();
        assert_eq!(found.names(), &["CATALOG", "SALES", "EMP"]);
        assert_eq!(found.descriptor().row_count(), 14.0);
    }

    #[test]
    fn register_into_missing_schema_fails() {
        let mut registry = registry();
        let entry = table(&registry, &["CATALOG", "MARKETING", "LEADS"], 1.0);

        let err = registry.register(entry).unwrap_err();
        assert!(matches!(err, crate::Error::SchemaNotFound { .. }));
    }

    #[test]
    fn duplicate_register_is_rejected() {
        let mut registry = registry();
        registry
            .register(table(&registry, &["CATALOG", "SALES", "EMP"], 14.0))
            .unwrap();

        let err = registry
            .register(table(&registry, &["CATALOG", "SALES", "EMP"], 7.0))
            .unwrap_err();
        assert!(matches!(err, crate::Error::TableExists { .. }));

        // the original slot is untouched
        let found = registry.lookup(&["CATALOG", "SALES", "EMP"]).unwrap();
        assert_eq!(found.descriptor().row_count(), 14.0);
    }

    #[test]
    fn reregister_replaces_the_slot() {
        let mut registry = registry();
        registry
            .register(table(&registry, &["CATALOG", "SALES", "EMP"], 14.0))
            .unwrap();
        registry
            .reregister(table(&registry, &["CATALOG", "SALES", "EMP"], 100.0))
            .unwrap();

        let found = registry.lookup(&["CATALOG", "SALES", "EMP"]).unwrap();
        assert_eq!(found.descriptor().row_count(), 100.0);
    }

    #[test]
    fn nested_schemas() {
        let mut registry = registry();
        registry
            .register_schema(&["CATALOG", "SALES"], "NEST")
            .unwrap();
        registry
            .register(table(&registry, &["CATALOG", "SALES", "NEST", "EMP_R"], 14.0))
            .unwrap();

        assert!(registry
            .lookup(&["CATALOG", "SALES", "NEST", "EMP_R"])
            .is_ok());

        let err = registry
            .register_schema(&["CATALOG", "MARKETING"], "NEST")
            .unwrap_err();
        assert!(matches!(err, crate::Error::SchemaNotFound { .. }));
    }

    #[test]
    fn lookup_miss() {
        let registry = registry();

        let err = registry.lookup(&["CATALOG", "SALES", "MISSING"]).unwrap_err();
        assert!(matches!(err, crate::Error::TableNotFound { .. }));

        let err = registry.lookup(&["OTHER", "SALES", "EMP"]).unwrap_err();
        assert!(matches!(err, crate::Error::SchemaNotFound { .. }));
    }

    #[test]
    fn case_insensitive_paths() {
        let mut registry = CatalogRegistry::new(RegistryConfig::new("CATALOG", false));
        registry.register_schema(&["catalog"], "SALES").unwrap();
        registry
            .register(table(&registry, &["CATALOG", "SALES", "EMP"], 14.0))
            .unwrap();

        assert!(registry.lookup(&["catalog", "sales", "emp"]).is_ok());
    }

    #[test]
    fn named_types() {
        let mut registry = registry();
        registry
            .register_type(&["CATALOG", "SALES", "CUSTOMER_ID"], FieldType::Bigint)
            .unwrap();

        assert_eq!(
            registry
                .lookup_type(&["CATALOG", "SALES", "CUSTOMER_ID"])
                .unwrap(),
            FieldType::Bigint,
        );

        // re-registration replaces the previous definition
        registry
            .register_type(&["CATALOG", "SALES", "CUSTOMER_ID"], FieldType::Integer)
            .unwrap();
        assert_eq!(
            registry
                .lookup_type(&["CATALOG", "SALES", "CUSTOMER_ID"])
                .unwrap(),
            FieldType::Integer,
        );

        let err = registry
            .lookup_type(&["CATALOG", "SALES", "ORDER_ID"])
            .unwrap_err();
        assert!(matches!(err, crate::Error::TypeNotFound { .. }));
    }
}
