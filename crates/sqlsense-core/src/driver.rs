//! Completion driver.
//!
//! Orchestrates one completion request: run the candidate collector with
//! the fixed configuration, resolve qualifiers and table references for
//! every reported rule, query the metadata cache, and emit the proposal
//! groups in their fixed order.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::cache::MetadataCache;
use crate::grammar::{CandidateCollector, CollectorConfig, MySqlCandidateCollector, RuleId};
use crate::qualifier::{schema_table_qualifier, simple_qualifier, ObjectFlags};
use crate::references::ReferenceCollector;
use crate::scanner::TokenScanner;
use crate::session::{ParserSession, QueryType};
use crate::types::{
    unquote, CompletionSet, Keyword, ProposalEntry, ProposalKind, TableReference, TokenKind,
};

/// Computes the ordered proposal list for a caret position.
///
/// `caret_line` and `caret_column` are 0-based; `function_names` is the
/// whitespace-delimited list of built-in runtime functions. Malformed
/// input and cache misses degrade to fewer proposals; the call itself
/// cannot fail.
#[allow(clippy::too_many_arguments)]
pub fn get_code_completion_list(
    caret_line: usize,
    caret_column: usize,
    default_schema: &str,
    uppercase_keywords: bool,
    session: &ParserSession,
    function_names: &str,
    cache: &dyn MetadataCache,
) -> Vec<ProposalEntry> {
    get_code_completion_list_with(
        &MySqlCandidateCollector,
        caret_line,
        caret_column,
        default_schema,
        uppercase_keywords,
        session,
        function_names,
        cache,
    )
}

/// Variant taking an explicit collection engine.
#[allow(clippy::too_many_arguments)]
pub fn get_code_completion_list_with(
    collector: &dyn CandidateCollector,
    caret_line: usize,
    caret_column: usize,
    default_schema: &str,
    uppercase_keywords: bool,
    session: &ParserSession,
    function_names: &str,
    cache: &dyn MetadataCache,
) -> Vec<ProposalEntry> {
    debug!(caret_line, caret_column, "invoking code completion");

    let line = caret_line as u32 + 1;
    let column = caret_column as u32;
    let tokens = session.tokens();
    let config = CollectorConfig::mysql_defaults();

    let mut candidates = collector.collect_candidates(tokens, line, column, config);

    // NOT2 is a NOT with special meaning in the operator precedence chain.
    // For code completion it is the same as NOT.
    candidates.remap_token(TokenKind::Not2, TokenKind::Keyword(Keyword::NOT));

    let query_type = session.query_type_at(line, column);

    // A required column reference means the rest of the query must be
    // scanned for table references before mapping starts.
    let mut reference_collector = ReferenceCollector::default();
    if candidates.has_rule(RuleId::ColumnRef) {
        reference_collector.collect(tokens, line, column, query_type);
        reference_collector.take_snapshot();
    }
    let references: &[TableReference] = reference_collector.references();

    // One sorted set per object type; groups concatenate in fixed order at
    // the end.
    let mut keyword_entries = CompletionSet::new();
    let mut column_entries = CompletionSet::new();
    let mut table_entries = CompletionSet::new();
    let mut view_entries = CompletionSet::new();
    let mut schema_entries = CompletionSet::new();
    let mut function_entries = CompletionSet::new();
    let mut procedure_entries = CompletionSet::new();
    let mut trigger_entries = CompletionSet::new();
    let mut event_entries = CompletionSet::new();
    let mut engine_entries = CompletionSet::new();
    let mut logfile_group_entries = CompletionSet::new();
    let mut tablespace_entries = CompletionSet::new();
    let mut charset_entries = CompletionSet::new();
    let mut collation_entries = CompletionSet::new();
    let mut user_var_entries = CompletionSet::new();
    let mut runtime_function_entries = CompletionSet::new();
    let mut system_var_entries = CompletionSet::new();
    // Not yet backed by cache data; their slots in the group order stay.
    let index_entries = CompletionSet::new();
    let user_entries = CompletionSet::new();
    let plugin_entries = CompletionSet::new();

    let mut scanner = TokenScanner::new(tokens);
    scanner.advance_to_position(line, column);

    for candidate in &candidates.tokens {
        let entry = display_label(candidate.kind);

        // A follow sequence opening with a parenthesis marks a runtime
        // function spelled as a keyword.
        if candidate.follow.first() == Some(&TokenKind::OpenParen) {
            runtime_function_entries.insert(
                ProposalKind::Function,
                format!("{}()", entry.to_lowercase()),
            );
            continue;
        }

        let mut label = entry;
        for &kind in &candidate.follow {
            label.push(' ');
            label.push_str(&display_label(kind));
        }
        if !uppercase_keywords {
            label = label.to_lowercase();
        }
        keyword_entries.insert(ProposalKind::Keyword, label);
    }

    for candidate in &candidates.rules {
        // Each rule resolves from the caret position; the save-point
        // restores it no matter where a resolver walked.
        scanner.scoped(|scanner| match candidate.rule {
            RuleId::RuntimeFunctionCall => {
                trace!("adding runtime function names");
                for name in function_names.split_whitespace() {
                    runtime_function_entries
                        .insert(ProposalKind::Function, format!("{name}()"));
                }
            }

            RuleId::FunctionRef | RuleId::FunctionCall => {
                let (flags, qualifier) = simple_qualifier(scanner);

                if qualifier.is_empty() {
                    trace!("adding user defined function names from cache");
                    for udf in cache.matching_udfs("") {
                        runtime_function_entries
                            .insert(ProposalKind::Function, format!("{udf}()"));
                    }
                }

                trace!("adding function names from cache");
                if flags.contains(ObjectFlags::SHOW_FIRST) {
                    insert_schemas(cache, &mut schema_entries, "");
                }
                if flags.contains(ObjectFlags::SHOW_SECOND) {
                    let schema = or_default(&qualifier, default_schema);
                    for name in cache.matching_functions(schema, "") {
                        function_entries.insert(ProposalKind::Routine, name);
                    }
                }
            }

            RuleId::EngineRef => {
                trace!("adding engine names");
                for name in cache.matching_engines("") {
                    engine_entries.insert(ProposalKind::Engine, name);
                }
            }

            RuleId::SchemaRef => {
                trace!("adding schema names from cache");
                insert_schemas(cache, &mut schema_entries, "");
            }

            RuleId::ProcedureRef => {
                trace!("adding procedure names from cache");
                let (flags, qualifier) = simple_qualifier(scanner);

                if flags.contains(ObjectFlags::SHOW_FIRST) {
                    insert_schemas(cache, &mut schema_entries, "");
                }
                if flags.contains(ObjectFlags::SHOW_SECOND) {
                    let schema = or_default(&qualifier, default_schema);
                    for name in cache.matching_procedures(schema, "") {
                        procedure_entries.insert(ProposalKind::Routine, name);
                    }
                }
            }

            RuleId::TableRefWithWildcard => {
                // A special form of table references (id.id.*) used only in
                // multi-table delete. Handled like column references, with
                // table and view objects in place of columns.
                trace!("adding table + view names from cache");
                let (flags, schema, _table) = schema_table_qualifier(scanner);
                if flags.contains(ObjectFlags::SHOW_SCHEMAS) {
                    insert_schemas(cache, &mut schema_entries, "");
                }

                let mut schemas = BTreeSet::new();
                schemas.insert(or_default(&schema, default_schema).to_string());
                if flags.contains(ObjectFlags::SHOW_TABLES) {
                    insert_tables(cache, &mut table_entries, &schemas, "");
                    insert_views(cache, &mut view_entries, &schemas, "");
                }
            }

            RuleId::TableRef | RuleId::FilterTableRef | RuleId::TableRefNoDb => {
                trace!("adding table + view names from cache");
                let (flags, qualifier) = simple_qualifier(scanner);

                if flags.contains(ObjectFlags::SHOW_FIRST) {
                    insert_schemas(cache, &mut schema_entries, "");
                }
                if flags.contains(ObjectFlags::SHOW_SECOND) {
                    let mut schemas = BTreeSet::new();
                    schemas.insert(or_default(&qualifier, default_schema).to_string());
                    insert_tables(cache, &mut table_entries, &schemas, "");
                    insert_views(cache, &mut view_entries, &schemas, "");
                }
            }

            RuleId::TableWild | RuleId::ColumnRef | RuleId::ColumnInternalRef => {
                trace!("adding column names from cache");
                insert_column_proposals(ColumnProposalInput {
                    rule: candidate.rule,
                    scanner,
                    cache,
                    default_schema,
                    query_type,
                    references,
                    schema_entries: &mut schema_entries,
                    table_entries: &mut table_entries,
                    view_entries: &mut view_entries,
                    column_entries: &mut column_entries,
                });
            }

            RuleId::TriggerRef => {
                // Trigger references are table-scoped and limited to the
                // current schema.
                trace!("adding trigger names from cache");
                let (flags, qualifier) = simple_qualifier(scanner);

                let mut schemas = BTreeSet::new();
                schemas.insert(default_schema.to_string());

                if flags.contains(ObjectFlags::SHOW_FIRST) {
                    insert_tables(cache, &mut schema_entries, &schemas, "");
                }
                if flags.contains(ObjectFlags::SHOW_SECOND) {
                    for name in cache.matching_triggers(default_schema, &qualifier, "") {
                        trigger_entries.insert(ProposalKind::Trigger, name);
                    }
                }
            }

            RuleId::ViewRef => {
                // View refs only, as in DROP VIEW; no table references.
                trace!("adding view names from cache");
                let (flags, qualifier) = simple_qualifier(scanner);

                if flags.contains(ObjectFlags::SHOW_FIRST) {
                    insert_schemas(cache, &mut schema_entries, "");
                }
                if flags.contains(ObjectFlags::SHOW_SECOND) {
                    let mut schemas = BTreeSet::new();
                    schemas.insert(or_default(&qualifier, default_schema).to_string());
                    insert_views(cache, &mut view_entries, &schemas, "");
                }
            }

            RuleId::LogfileGroupRef => {
                trace!("adding logfile group names from cache");
                for name in cache.matching_logfile_groups("") {
                    logfile_group_entries.insert(ProposalKind::LogfileGroup, name);
                }
            }

            RuleId::TablespaceRef => {
                trace!("adding tablespace names from cache");
                for name in cache.matching_tablespaces("") {
                    tablespace_entries.insert(ProposalKind::Tablespace, name);
                }
            }

            RuleId::UserVariable => {
                trace!("adding user variables");
                user_var_entries.insert(ProposalKind::UserVar, "<user variable>");
            }

            RuleId::LabelRef => {
                trace!("adding label references");
                user_var_entries.insert(ProposalKind::UserVar, "<block labels>");
            }

            RuleId::SystemVariable => {
                trace!("adding system variables");
                for name in cache.matching_variables("") {
                    system_var_entries.insert(ProposalKind::SystemVar, name);
                }
            }

            RuleId::CharsetName => {
                trace!("adding charsets");
                for name in cache.matching_charsets("") {
                    charset_entries.insert(ProposalKind::Charset, name);
                }
            }

            RuleId::CollationName => {
                trace!("adding collations");
                for name in cache.matching_collations("") {
                    collation_entries.insert(ProposalKind::Collation, name);
                }
            }

            RuleId::EventRef => {
                trace!("adding events");
                let (flags, qualifier) = simple_qualifier(scanner);

                if flags.contains(ObjectFlags::SHOW_FIRST) {
                    insert_schemas(cache, &mut schema_entries, "");
                }
                if flags.contains(ObjectFlags::SHOW_SECOND) {
                    let schema = or_default(&qualifier, default_schema);
                    for name in cache.matching_events(schema, "") {
                        event_entries.insert(ProposalKind::Event, name);
                    }
                }
            }

            // Helper rules and server references carry no proposals.
            RuleId::ServerRef
            | RuleId::ParameterName
            | RuleId::ProcedureName
            | RuleId::Identifier
            | RuleId::LabelIdentifier => {}
        });
    }

    // Insert the groups "inside out": most likely ones first, most inner
    // first (columns before tables and so on).
    let mut result = Vec::new();
    keyword_entries.drain_into(&mut result);
    column_entries.drain_into(&mut result);
    table_entries.drain_into(&mut result);
    view_entries.drain_into(&mut result);
    schema_entries.drain_into(&mut result);

    // Everything else is significantly less used.
    function_entries.drain_into(&mut result);
    procedure_entries.drain_into(&mut result);
    trigger_entries.drain_into(&mut result);
    index_entries.drain_into(&mut result);
    event_entries.drain_into(&mut result);
    user_entries.drain_into(&mut result);
    engine_entries.drain_into(&mut result);
    plugin_entries.drain_into(&mut result);
    logfile_group_entries.drain_into(&mut result);
    tablespace_entries.drain_into(&mut result);
    charset_entries.drain_into(&mut result);
    collation_entries.drain_into(&mut result);
    user_var_entries.drain_into(&mut result);
    runtime_function_entries.drain_into(&mut result);
    system_var_entries.drain_into(&mut result);

    result
}

/// Renders a token kind for display: grammar symbols lose their `_SYMBOL`
/// suffix, quoted punctuation loses its quotes.
fn display_label(kind: TokenKind) -> String {
    let name = kind.display_name();
    match name.strip_suffix("_SYMBOL") {
        Some(stripped) => stripped.to_string(),
        None => unquote(&name),
    }
}

fn or_default<'a>(qualifier: &'a str, default_schema: &'a str) -> &'a str {
    if qualifier.is_empty() {
        default_schema
    } else {
        qualifier
    }
}

fn insert_schemas(cache: &dyn MetadataCache, set: &mut CompletionSet, typed_part: &str) {
    for schema in cache.matching_schemas(typed_part) {
        set.insert(ProposalKind::Schema, schema);
    }
}

fn insert_tables(
    cache: &dyn MetadataCache,
    set: &mut CompletionSet,
    schemas: &BTreeSet<String>,
    typed_part: &str,
) {
    for schema in schemas {
        for table in cache.matching_tables(schema, typed_part) {
            set.insert(ProposalKind::Table, table);
        }
    }
}

fn insert_views(
    cache: &dyn MetadataCache,
    set: &mut CompletionSet,
    schemas: &BTreeSet<String>,
    typed_part: &str,
) {
    for schema in schemas {
        for view in cache.matching_views(schema, typed_part) {
            set.insert(ProposalKind::View, view);
        }
    }
}

fn insert_columns(
    cache: &dyn MetadataCache,
    set: &mut CompletionSet,
    schemas: &BTreeSet<String>,
    tables: &BTreeSet<String>,
    typed_part: &str,
) {
    for schema in schemas {
        for table in tables {
            for column in cache.matching_columns(schema, table, typed_part) {
                set.insert(ProposalKind::Column, column);
            }
        }
    }
}

struct ColumnProposalInput<'a, 'b> {
    rule: RuleId,
    scanner: &'a mut TokenScanner<'b>,
    cache: &'a dyn MetadataCache,
    default_schema: &'a str,
    query_type: QueryType,
    references: &'a [TableReference],
    schema_entries: &'a mut CompletionSet,
    table_entries: &'a mut CompletionSet,
    view_entries: &'a mut CompletionSet,
    column_entries: &'a mut CompletionSet,
}

/// The column sub-policy: restrict proposals to the smallest sensible set.
/// With table references in scope only their columns are shown; the
/// default schema serves as fallback when nothing narrows the search.
fn insert_column_proposals(input: ColumnProposalInput<'_, '_>) {
    let ColumnProposalInput {
        rule,
        scanner,
        cache,
        default_schema,
        query_type,
        references,
        schema_entries,
        table_entries,
        view_entries,
        column_entries,
    } = input;

    let (flags, schema, table) = schema_table_qualifier(scanner);
    if flags.contains(ObjectFlags::SHOW_SCHEMAS) {
        insert_schemas(cache, schema_entries, "");
    }

    // With an explicit schema, list only its tables and columns. Without
    // one, take the schemas off the table references; the default schema
    // is the last resort.
    let mut schemas = BTreeSet::new();
    if !schema.is_empty() {
        schemas.insert(schema.clone());
    } else {
        for reference in references {
            if !reference.schema.is_empty() {
                schemas.insert(reference.schema.clone());
            }
        }
    }
    if schemas.is_empty() {
        schemas.insert(default_schema.to_string());
    }

    if flags.contains(ObjectFlags::SHOW_TABLES) {
        insert_tables(cache, table_entries, &schemas, "");
        if rule == RuleId::ColumnRef {
            insert_views(cache, view_entries, &schemas, "");

            // Table references also appear as table proposals, preferring
            // the alias. Without a typed schema, schemaless references are
            // admitted; otherwise the reference schema must match.
            for reference in references {
                let admitted = (schema.is_empty() && reference.schema.is_empty())
                    || schemas.contains(&reference.schema);
                if admitted {
                    let label = if reference.alias.is_empty() {
                        &reference.table
                    } else {
                        &reference.alias
                    };
                    if !label.is_empty() {
                        table_entries.insert(ProposalKind::Table, label.clone());
                    }
                }
            }
        }
    }

    if flags.contains(ObjectFlags::SHOW_COLUMNS) {
        // Equal schema and table mean the qualifier kind is still unknown;
        // the default schema stays in play.
        if schema == table {
            schemas.insert(default_schema.to_string());
        }

        // Same approach as for the schemas: a typed table wins, otherwise
        // the references decide, otherwise no columns.
        let mut tables = BTreeSet::new();
        if !table.is_empty() {
            tables.insert(table.clone());

            // Could be an alias.
            for reference in references {
                if reference.alias.eq_ignore_ascii_case(&table) {
                    tables.insert(reference.table.clone());
                    break;
                }
            }
        } else if !references.is_empty() && rule == RuleId::ColumnRef {
            for reference in references {
                if !reference.table.is_empty() {
                    tables.insert(reference.table.clone());
                }
            }
        }

        if !tables.is_empty() {
            insert_columns(cache, column_entries, &schemas, &tables, "");
        }

        // Triggers see the subject table through the NEW and OLD
        // qualifiers; the first reference is the table the trigger
        // belongs to.
        if query_type == QueryType::CreateTrigger
            && !references.is_empty()
            && (table.eq_ignore_ascii_case("old") || table.eq_ignore_ascii_case("new"))
        {
            let mut trigger_tables = BTreeSet::new();
            trigger_tables.insert(references[0].table.clone());
            insert_columns(cache, column_entries, &schemas, &trigger_tables, "");
        }
    }
}
