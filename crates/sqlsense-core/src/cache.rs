//! Metadata cache adapter.
//!
//! The completion driver resolves object names through the read-only
//! [`MetadataCache`] trait. Every operation takes the typed prefix and
//! returns a case-insensitively prefix-matched, sorted, deduplicated name
//! list; an empty prefix returns all names of that kind. Implementations
//! must be idempotent and safe for concurrent readers.
//!
//! [`MemoryCache`] is the bundled implementation, loadable from a serde
//! document and prefilled with the server built-ins a bare connection
//! would report.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::compare_labels;

pub trait MetadataCache {
    fn matching_schemas(&self, prefix: &str) -> Vec<String>;
    fn matching_tables(&self, schema: &str, prefix: &str) -> Vec<String>;
    fn matching_views(&self, schema: &str, prefix: &str) -> Vec<String>;
    fn matching_columns(&self, schema: &str, table: &str, prefix: &str) -> Vec<String>;
    fn matching_procedures(&self, schema: &str, prefix: &str) -> Vec<String>;
    fn matching_functions(&self, schema: &str, prefix: &str) -> Vec<String>;
    /// Triggers of one schema; an empty `table` means all tables.
    fn matching_triggers(&self, schema: &str, table: &str, prefix: &str) -> Vec<String>;
    fn matching_events(&self, schema: &str, prefix: &str) -> Vec<String>;
    fn matching_engines(&self, prefix: &str) -> Vec<String>;
    fn matching_logfile_groups(&self, prefix: &str) -> Vec<String>;
    fn matching_tablespaces(&self, prefix: &str) -> Vec<String>;
    fn matching_charsets(&self, prefix: &str) -> Vec<String>;
    fn matching_collations(&self, prefix: &str) -> Vec<String>;
    fn matching_variables(&self, prefix: &str) -> Vec<String>;
    fn matching_udfs(&self, prefix: &str) -> Vec<String>;
}

/// Serializable cache contents, the shape the CLI loads from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataDocument {
    pub schemas: Vec<SchemaMetadata>,
    pub engines: Vec<String>,
    pub charsets: Vec<String>,
    pub collations: Vec<String>,
    pub variables: Vec<String>,
    pub udfs: Vec<String>,
    pub tablespaces: Vec<String>,
    pub logfile_groups: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaMetadata {
    pub name: String,
    pub tables: Vec<TableMetadata>,
    pub views: Vec<TableMetadata>,
    pub functions: Vec<String>,
    pub procedures: Vec<String>,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<String>,
    pub triggers: Vec<String>,
}

/// In-memory [`MetadataCache`] over a [`MetadataDocument`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    document: MetadataDocument,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: MetadataDocument) -> Self {
        Self { document }
    }

    /// Cache prefilled with the engines, character sets, collations and
    /// system variables a stock server reports.
    pub fn with_defaults() -> Self {
        let mut cache = Self::new();
        cache.document.engines = DEFAULT_ENGINES.iter().map(|s| s.to_string()).collect();
        cache.document.charsets = DEFAULT_CHARSETS.iter().map(|s| s.to_string()).collect();
        cache.document.collations = DEFAULT_COLLATIONS.iter().map(|s| s.to_string()).collect();
        cache.document.variables = DEFAULT_VARIABLES.iter().map(|s| s.to_string()).collect();
        cache
    }

    fn schema(&self, name: &str) -> Option<&SchemaMetadata> {
        self.document
            .schemas
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn schema_mut(&mut self, name: &str) -> &mut SchemaMetadata {
        let position = self
            .document
            .schemas
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name));
        match position {
            Some(index) => &mut self.document.schemas[index],
            None => {
                self.document.schemas.push(SchemaMetadata {
                    name: name.to_string(),
                    ..SchemaMetadata::default()
                });
                self.document.schemas.last_mut().expect("just pushed")
            }
        }
    }

    pub fn add_table<S: Into<String>>(
        &mut self,
        schema: &str,
        table: &str,
        columns: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.schema_mut(schema).tables.push(TableMetadata {
            name: table.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            triggers: Vec::new(),
        });
        self
    }

    pub fn add_view<S: Into<String>>(
        &mut self,
        schema: &str,
        view: &str,
        columns: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.schema_mut(schema).views.push(TableMetadata {
            name: view.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            triggers: Vec::new(),
        });
        self
    }

    pub fn add_trigger(&mut self, schema: &str, table: &str, trigger: &str) -> &mut Self {
        let entry = self.schema_mut(schema);
        if let Some(table) = entry
            .tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(table))
        {
            table.triggers.push(trigger.to_string());
        }
        self
    }

    pub fn add_function(&mut self, schema: &str, name: &str) -> &mut Self {
        self.schema_mut(schema).functions.push(name.to_string());
        self
    }

    pub fn add_procedure(&mut self, schema: &str, name: &str) -> &mut Self {
        self.schema_mut(schema).procedures.push(name.to_string());
        self
    }

    pub fn add_event(&mut self, schema: &str, name: &str) -> &mut Self {
        self.schema_mut(schema).events.push(name.to_string());
        self
    }

    pub fn add_udf(&mut self, name: &str) -> &mut Self {
        self.document.udfs.push(name.to_string());
        self
    }
}

fn filtered(names: impl IntoIterator<Item = String>, prefix: &str) -> Vec<String> {
    let mut result: Vec<String> = names
        .into_iter()
        .filter(|name| {
            name.get(..prefix.len())
                .map(|head| head.eq_ignore_ascii_case(prefix))
                .unwrap_or(false)
        })
        .collect();
    result.sort_by(|a, b| compare_labels(a, b));
    result.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    result
}

impl MetadataCache for MemoryCache {
    fn matching_schemas(&self, prefix: &str) -> Vec<String> {
        filtered(
            self.document.schemas.iter().map(|s| s.name.clone()),
            prefix,
        )
    }

    fn matching_tables(&self, schema: &str, prefix: &str) -> Vec<String> {
        let names = self
            .schema(schema)
            .map(|s| s.tables.iter().map(|t| t.name.clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        filtered(names, prefix)
    }

    fn matching_views(&self, schema: &str, prefix: &str) -> Vec<String> {
        let names = self
            .schema(schema)
            .map(|s| s.views.iter().map(|v| v.name.clone()).collect::<Vec<_>>())
            .unwrap_or_default();
        filtered(names, prefix)
    }

    fn matching_columns(&self, schema: &str, table: &str, prefix: &str) -> Vec<String> {
        let names = self
            .schema(schema)
            .map(|s| {
                s.tables
                    .iter()
                    .chain(s.views.iter())
                    .filter(|t| t.name.eq_ignore_ascii_case(table))
                    .flat_map(|t| t.columns.iter().cloned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        filtered(names, prefix)
    }

    fn matching_procedures(&self, schema: &str, prefix: &str) -> Vec<String> {
        filtered(
            self.schema(schema)
                .map(|s| s.procedures.clone())
                .unwrap_or_default(),
            prefix,
        )
    }

    fn matching_functions(&self, schema: &str, prefix: &str) -> Vec<String> {
        filtered(
            self.schema(schema)
                .map(|s| s.functions.clone())
                .unwrap_or_default(),
            prefix,
        )
    }

    fn matching_triggers(&self, schema: &str, table: &str, prefix: &str) -> Vec<String> {
        let names = self
            .schema(schema)
            .map(|s| {
                s.tables
                    .iter()
                    .filter(|t| table.is_empty() || t.name.eq_ignore_ascii_case(table))
                    .flat_map(|t| t.triggers.iter().cloned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        filtered(names, prefix)
    }

    fn matching_events(&self, schema: &str, prefix: &str) -> Vec<String> {
        filtered(
            self.schema(schema)
                .map(|s| s.events.clone())
                .unwrap_or_default(),
            prefix,
        )
    }

    fn matching_engines(&self, prefix: &str) -> Vec<String> {
        filtered(self.document.engines.iter().cloned(), prefix)
    }

    fn matching_logfile_groups(&self, prefix: &str) -> Vec<String> {
        filtered(self.document.logfile_groups.iter().cloned(), prefix)
    }

    fn matching_tablespaces(&self, prefix: &str) -> Vec<String> {
        filtered(self.document.tablespaces.iter().cloned(), prefix)
    }

    fn matching_charsets(&self, prefix: &str) -> Vec<String> {
        filtered(self.document.charsets.iter().cloned(), prefix)
    }

    fn matching_collations(&self, prefix: &str) -> Vec<String> {
        filtered(self.document.collations.iter().cloned(), prefix)
    }

    fn matching_variables(&self, prefix: &str) -> Vec<String> {
        filtered(self.document.variables.iter().cloned(), prefix)
    }

    fn matching_udfs(&self, prefix: &str) -> Vec<String> {
        filtered(self.document.udfs.iter().cloned(), prefix)
    }
}

const DEFAULT_ENGINES: &[&str] = &[
    "ARCHIVE",
    "BLACKHOLE",
    "CSV",
    "FEDERATED",
    "InnoDB",
    "MEMORY",
    "MRG_MYISAM",
    "MyISAM",
    "ndbcluster",
];

const DEFAULT_CHARSETS: &[&str] = &[
    "armscii8", "ascii", "big5", "binary", "cp1250", "cp1251", "cp1256", "cp1257", "cp850",
    "cp852", "cp866", "cp932", "dec8", "eucjpms", "euckr", "gb18030", "gb2312", "gbk", "geostd8",
    "greek", "hebrew", "hp8", "keybcs2", "koi8r", "koi8u", "latin1", "latin2", "latin5", "latin7",
    "macce", "macroman", "sjis", "swe7", "tis620", "ucs2", "ujis", "utf16", "utf16le", "utf32",
    "utf8mb3", "utf8mb4",
];

const DEFAULT_COLLATIONS: &[&str] = &[
    "armscii8_general_ci",
    "ascii_general_ci",
    "big5_chinese_ci",
    "binary",
    "latin1_general_ci",
    "latin1_general_cs",
    "latin1_swedish_ci",
    "utf8mb3_general_ci",
    "utf8mb4_0900_ai_ci",
    "utf8mb4_0900_as_cs",
    "utf8mb4_bin",
    "utf8mb4_general_ci",
    "utf8mb4_unicode_ci",
];

const DEFAULT_VARIABLES: &[&str] = &[
    "autocommit",
    "character_set_client",
    "character_set_connection",
    "character_set_results",
    "collation_connection",
    "default_storage_engine",
    "foreign_key_checks",
    "max_allowed_packet",
    "max_connections",
    "sql_mode",
    "sql_safe_updates",
    "time_zone",
    "transaction_isolation",
    "version",
    "version_comment",
    "wait_timeout",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryCache {
        let mut cache = MemoryCache::new();
        cache
            .add_table("db", "t1", ["a", "b"])
            .add_table("db", "Orders", ["id", "total"])
            .add_view("db", "v1", ["a"])
            .add_function("db", "calc_total")
            .add_udf("levenshtein");
        cache
    }

    #[test]
    fn prefix_matching_is_case_insensitive_and_sorted() {
        let cache = sample();
        assert_eq!(cache.matching_tables("db", ""), vec!["Orders", "t1"]);
        assert_eq!(cache.matching_tables("DB", "or"), vec!["Orders"]);
        assert_eq!(cache.matching_tables("db", "zz"), Vec::<String>::new());
    }

    #[test]
    fn unknown_schema_is_an_empty_result() {
        let cache = sample();
        assert!(cache.matching_tables("missing", "").is_empty());
        assert!(cache.matching_columns("missing", "t1", "").is_empty());
    }

    #[test]
    fn columns_cover_tables_and_views() {
        let cache = sample();
        assert_eq!(cache.matching_columns("db", "t1", ""), vec!["a", "b"]);
        assert_eq!(cache.matching_columns("db", "v1", ""), vec!["a"]);
    }

    #[test]
    fn defaults_answer_flat_queries() {
        let cache = MemoryCache::with_defaults();
        assert!(cache.matching_engines("").contains(&"InnoDB".to_string()));
        assert!(cache
            .matching_charsets("utf8")
            .contains(&"utf8mb4".to_string()));
        assert!(cache
            .matching_variables("sql_")
            .contains(&"sql_mode".to_string()));
    }

    #[test]
    fn document_round_trips_through_serde() {
        let cache = sample();
        let json = serde_json::to_string(&cache.document).unwrap();
        let document: MetadataDocument = serde_json::from_str(&json).unwrap();
        let restored = MemoryCache::from_document(document);
        assert_eq!(restored.matching_tables("db", ""), vec!["Orders", "t1"]);
    }
}
