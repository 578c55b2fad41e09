//! Table reference bindings harvested from FROM clauses.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One `FROM`-clause binding. Any field may be empty; an empty alias means
/// the reference is addressed by its table name. Derived tables carry only
/// an alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub schema: String,
    pub table: String,
    pub alias: String,
}

impl TableReference {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            alias: alias.into(),
        }
    }
}
