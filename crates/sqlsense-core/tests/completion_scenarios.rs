//! End-to-end completion scenarios against an in-memory metadata cache.

use sqlsense_core::{
    get_code_completion_list, get_code_completion_list_with, CandidateCollector,
    CandidatesCollection, CollectorConfig, Keyword, MemoryCache, ParserSession, ProposalEntry,
    ProposalKind, RuleId, SqlToken, TokenKind,
};

const FUNCTION_NAMES: &str = "concat substring now coalesce";

fn sample_cache() -> MemoryCache {
    let mut cache = MemoryCache::with_defaults();
    cache
        .add_table("db", "t1", ["a", "b"])
        .add_table("db", "t2", ["c"])
        .add_view("db", "v1", ["a"])
        .add_table("db2", "remote", ["r1"])
        .add_view("db1", "v_orders", ["id"])
        .add_table("db1", "plain", ["p"])
        .add_function("db", "calc_total")
        .add_procedure("db", "cleanup")
        .add_udf("levenshtein");
    cache
}

/// Runs completion with the caret at the `|` marker.
fn complete(sql: &str, uppercase: bool) -> Vec<ProposalEntry> {
    complete_with_cache(sql, uppercase, &sample_cache())
}

fn complete_with_cache(sql: &str, uppercase: bool, cache: &MemoryCache) -> Vec<ProposalEntry> {
    let offset = sql.find('|').expect("sql must contain a caret marker");
    let clean: String = sql.replacen('|', "", 1);
    let before = &clean[..offset];
    let line = before.matches('\n').count();
    let column = before
        .rsplit('\n')
        .next()
        .map(|tail| tail.chars().count())
        .unwrap_or(0);

    let session = ParserSession::new(&clean);
    get_code_completion_list(
        line,
        column,
        "db",
        uppercase,
        &session,
        FUNCTION_NAMES,
        cache,
    )
}

fn labels(proposals: &[ProposalEntry], kind: ProposalKind) -> Vec<String> {
    proposals
        .iter()
        .filter(|p| p.kind == kind)
        .map(|p| p.label.clone())
        .collect()
}

#[test]
fn select_list_offers_keywords_columns_and_tables() {
    let proposals = complete("SELECT | FROM t1", false);

    let keywords = labels(&proposals, ProposalKind::Keyword);
    for expected in ["all", "distinct", "*"] {
        assert!(keywords.contains(&expected.to_string()), "missing {expected}");
    }

    let columns = labels(&proposals, ProposalKind::Column);
    assert_eq!(columns, ["a", "b"]);

    let tables = labels(&proposals, ProposalKind::Table);
    assert!(tables.contains(&"t1".to_string()));
}

#[test]
fn alias_qualifier_resolves_to_the_real_table() {
    let proposals = complete("SELECT a.| FROM t1 AS a", false);

    let columns = labels(&proposals, ProposalKind::Column);
    assert_eq!(columns, ["a", "b"]);
}

#[test]
fn table_position_offers_schemas_and_tables_but_no_columns() {
    let proposals = complete("SELECT x FROM |", false);

    let schemas = labels(&proposals, ProposalKind::Schema);
    assert!(schemas.contains(&"db".to_string()));
    assert!(schemas.contains(&"db2".to_string()));

    let tables = labels(&proposals, ProposalKind::Table);
    assert!(tables.contains(&"t1".to_string()));
    assert!(tables.contains(&"t2".to_string()));

    assert!(labels(&proposals, ProposalKind::Column).is_empty());
}

#[test]
fn trigger_new_qualifier_exposes_subject_table_columns() {
    let proposals = complete(
        "CREATE TRIGGER trg BEFORE INSERT ON t1 FOR EACH ROW SELECT new.|",
        false,
    );

    let columns = labels(&proposals, ProposalKind::Column);
    assert_eq!(columns, ["a", "b"]);
}

#[test]
fn drop_view_offers_only_views_of_the_typed_schema() {
    let proposals = complete("DROP VIEW db1.|", false);

    assert_eq!(labels(&proposals, ProposalKind::View), ["v_orders"]);
    assert!(labels(&proposals, ProposalKind::Table).is_empty());
    assert!(labels(&proposals, ProposalKind::Column).is_empty());
}

#[test]
fn precedence_not_variant_collapses_to_a_single_not() {
    let proposals = complete("SELECT NOT NULL |", true);

    let keywords = labels(&proposals, ProposalKind::Keyword);
    let count = keywords.iter().filter(|label| *label == "NOT").count();
    assert_eq!(count, 1, "keywords were {keywords:?}");
}

#[test]
fn output_is_deterministic() {
    let first = complete("SELECT | FROM t1", false);
    let second = complete("SELECT | FROM t1", false);
    assert_eq!(first, second);
}

#[test]
fn groups_emit_in_fixed_order_sorted_within() {
    fn group_rank(kind: ProposalKind) -> usize {
        match kind {
            ProposalKind::Keyword => 0,
            ProposalKind::Column => 1,
            ProposalKind::Table => 2,
            ProposalKind::View => 3,
            ProposalKind::Schema => 4,
            ProposalKind::Routine => 5,
            ProposalKind::Trigger => 6,
            ProposalKind::Event => 7,
            ProposalKind::Engine => 8,
            ProposalKind::LogfileGroup => 9,
            ProposalKind::Tablespace => 10,
            ProposalKind::Charset => 11,
            ProposalKind::Collation => 12,
            ProposalKind::UserVar => 13,
            ProposalKind::Function => 14,
            ProposalKind::SystemVar => 15,
        }
    }

    let proposals = complete("SELECT | FROM t1", false);
    assert!(!proposals.is_empty());
    for pair in proposals.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let rank_a = group_rank(a.kind);
        let rank_b = group_rank(b.kind);
        assert!(
            rank_a < rank_b
                || (rank_a == rank_b
                    && a.label.to_lowercase() <= b.label.to_lowercase()),
            "misordered: {a:?} before {b:?}"
        );
    }
}

#[test]
fn no_duplicate_labels_within_a_group() {
    let proposals = complete("SELECT | FROM t1", false);
    let mut seen = std::collections::HashSet::new();
    for proposal in &proposals {
        assert!(
            seen.insert((proposal.kind, proposal.label.to_lowercase())),
            "duplicate {proposal:?}"
        );
    }
}

#[test]
fn uppercase_flag_only_affects_keyword_labels() {
    let lower = complete("SELECT | FROM t1", false);
    let upper = complete("SELECT | FROM t1", true);

    let non_keywords =
        |list: &[ProposalEntry]| -> Vec<ProposalEntry> {
            list.iter()
                .filter(|p| p.kind != ProposalKind::Keyword)
                .cloned()
                .collect()
        };
    assert_eq!(non_keywords(&lower), non_keywords(&upper));

    let lower_keywords = labels(&lower, ProposalKind::Keyword);
    let upper_keywords = labels(&upper, ProposalKind::Keyword);
    let raised: Vec<String> = lower_keywords.iter().map(|l| l.to_uppercase()).collect();
    assert_eq!(raised, upper_keywords);
}

#[test]
fn gibberish_after_the_caret_leaves_non_column_proposals_alone() {
    let base = complete("SELECT id, | FROM t1 ORDER BY id", false);
    let mangled = complete("SELECT id, | FROM t1 WHERE zz((qq", false);

    let without_columns = |list: &[ProposalEntry]| -> Vec<ProposalEntry> {
        list.iter()
            .filter(|p| p.kind != ProposalKind::Column)
            .cloned()
            .collect()
    };
    assert_eq!(without_columns(&base), without_columns(&mangled));
}

#[test]
fn empty_buffer_offers_statement_starters() {
    let proposals = complete("|", false);
    let keywords = labels(&proposals, ProposalKind::Keyword);
    for expected in ["select", "insert", "update", "delete", "create"] {
        assert!(keywords.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn caret_past_the_end_clamps_to_statement_end() {
    let sql = "SELECT x FROM t1";
    let session = ParserSession::new(sql);
    let proposals = get_code_completion_list(
        9,
        0,
        "db",
        false,
        &session,
        FUNCTION_NAMES,
        &sample_cache(),
    );
    let keywords = labels(&proposals, ProposalKind::Keyword);
    assert!(keywords.contains(&"where".to_string()));
}

#[test]
fn runtime_functions_come_from_the_function_name_list() {
    let proposals = complete("SELECT | FROM t1", false);
    let functions = labels(&proposals, ProposalKind::Function);
    for expected in ["concat()", "substring()", "now()", "coalesce()"] {
        assert!(
            functions.contains(&expected.to_string()),
            "missing {expected} in {functions:?}"
        );
    }
    // UDFs ride along when no qualifier is typed.
    assert!(functions.contains(&"levenshtein()".to_string()));
}

#[test]
fn use_statement_offers_schemas() {
    let proposals = complete("USE |", false);
    let schemas = labels(&proposals, ProposalKind::Schema);
    assert!(schemas.contains(&"db".to_string()));
    assert!(schemas.contains(&"db1".to_string()));
}

#[test]
fn system_variables_after_set_global() {
    let proposals = complete("SET GLOBAL |", false);
    let variables = labels(&proposals, ProposalKind::SystemVar);
    assert!(variables.contains(&"sql_mode".to_string()));
}

#[test]
fn engines_after_engine_equals() {
    let proposals = complete("ALTER TABLE t1 ENGINE = |", false);
    let engines = labels(&proposals, ProposalKind::Engine);
    assert!(engines.contains(&"InnoDB".to_string()));
}

#[test]
fn multi_table_delete_wildcard_offers_tables_and_views() {
    let proposals = complete("DELETE db.| FROM t1", false);
    let tables = labels(&proposals, ProposalKind::Table);
    assert!(tables.contains(&"t1".to_string()));
    assert!(tables.contains(&"t2".to_string()));
    let views = labels(&proposals, ProposalKind::View);
    assert!(views.contains(&"v1".to_string()));
}

/// Replays a fixed candidates collection, standing in for an external
/// grammar-driven engine.
struct ScriptedCollector(CandidatesCollection);

impl CandidateCollector for ScriptedCollector {
    fn collect_candidates(
        &self,
        _tokens: &[SqlToken],
        _caret_line: u32,
        _caret_column: u32,
        _config: &CollectorConfig,
    ) -> CandidatesCollection {
        self.0.clone()
    }
}

#[test]
fn driver_renders_token_candidates_from_any_collector() {
    let mut collection = CandidatesCollection::default();
    collection.add_token(TokenKind::Keyword(Keyword::SELECT), vec![]);
    collection.add_token(
        TokenKind::Keyword(Keyword::GROUP),
        vec![TokenKind::Keyword(Keyword::BY)],
    );
    // A follow sequence starting with an open parenthesis marks a runtime
    // function.
    collection.add_token(TokenKind::Keyword(Keyword::YEAR), vec![TokenKind::OpenParen]);
    collection.add_token(TokenKind::Not2, vec![]);
    collection.add_rule(RuleId::UserVariable);

    let session = ParserSession::new("SELECT 1");
    let cache = MemoryCache::new();
    let proposals = get_code_completion_list_with(
        &ScriptedCollector(collection),
        0,
        8,
        "db",
        false,
        &session,
        "",
        &cache,
    );

    let keywords = labels(&proposals, ProposalKind::Keyword);
    assert!(keywords.contains(&"select".to_string()));
    assert!(keywords.contains(&"group by".to_string()));
    assert!(keywords.contains(&"not".to_string()));
    assert!(!keywords.iter().any(|k| k.contains("year")));

    let functions = labels(&proposals, ProposalKind::Function);
    assert_eq!(functions, ["year()"]);

    let user_vars = labels(&proposals, ProposalKind::UserVar);
    assert_eq!(user_vars, ["<user variable>"]);
}
