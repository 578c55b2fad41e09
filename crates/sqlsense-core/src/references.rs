//! Table reference harvesting.
//!
//! Column proposals are scoped to the relations visible at the caret. The
//! collector keeps a stack of per-scope reference frames while walking the
//! statement up to the caret, then continues past the caret along the same
//! nesting level, and finally flattens everything into a snapshot.
//!
//! Inner queries may use table references from outer queries, so the
//! forward scan accepts any FROM clause as long as it does not descend
//! into deeper scopes. The query does not have to be error free for this,
//! only the FROM clauses do; with unbalanced parentheses the scan can pick
//! a wrong clause, which is acceptable best-effort behavior.

use tracing::trace;

use crate::scanner::TokenScanner;
use crate::session::{statement_start, word_is, QueryType};
use crate::types::{is_identifier, unquote, SqlToken, TableReference, TokenChannel, TokenKind};

#[derive(Debug)]
pub struct ReferenceCollector {
    /// One frame per live query scope; index 0 is the outermost query.
    stack: Vec<Vec<TableReference>>,
    /// Flattened view produced by [`Self::take_snapshot`].
    references: Vec<TableReference>,
}

impl Default for ReferenceCollector {
    fn default() -> Self {
        Self {
            stack: vec![Vec::new()],
            references: Vec::new(),
        }
    }
}

impl ReferenceCollector {
    /// Harvests every reference lexically visible at the caret: the scopes
    /// enclosing it plus FROM clauses in the remainder of the statement.
    pub fn collect(
        &mut self,
        tokens: &[SqlToken],
        caret_line: u32,
        caret_column: u32,
        query_type: QueryType,
    ) {
        let mut scanner = TokenScanner::new(tokens);
        scanner.advance_to_position(caret_line, caret_column);
        let caret_index = scanner.token_index();

        let start = statement_start(tokens, caret_index);
        let significant: Vec<&SqlToken> = tokens[start..]
            .iter()
            .take_while(|t| t.kind != TokenKind::Semicolon)
            .filter(|t| t.channel == TokenChannel::Default && t.kind != TokenKind::Eof)
            .collect();
        let caret_sig = tokens[start..caret_index.max(start)]
            .iter()
            .filter(|t| {
                t.channel == TokenChannel::Default
                    && t.kind != TokenKind::Eof
                    && t.kind != TokenKind::Semicolon
            })
            .count()
            .min(significant.len());

        self.collect_up_to_caret(&significant, caret_sig, query_type);
        self.collect_remaining(&significant, caret_sig, query_type);
        trace!(frames = self.stack.len(), "collected table references");
    }

    /// Scope-aware walk of the tokens before the caret. Scopes that close
    /// before the caret are skipped wholesale; their references would have
    /// been popped while bubbling up anyway.
    fn collect_up_to_caret(&mut self, sig: &[&SqlToken], caret: usize, query_type: QueryType) {
        let mut scope_depths: Vec<u32> = vec![0];
        let mut depth = 0u32;
        let mut index = 0;

        while index < caret {
            let token = sig[index];
            match token.kind {
                TokenKind::OpenParen => {
                    if let Some(close) = find_matching_paren(sig, index, caret) {
                        // Whole group sits before the caret; nothing in it
                        // stays visible.
                        index = close + 1;
                        continue;
                    }
                    depth += 1;
                    if sig
                        .get(index + 1)
                        .map(|next| word_is(next, "SELECT"))
                        .unwrap_or(false)
                    {
                        self.stack.push(Vec::new());
                        scope_depths.push(depth);
                    }
                }
                TokenKind::CloseParen => {
                    // Unbalanced close before the caret; tolerate it.
                    if scope_depths.len() > 1 && *scope_depths.last().unwrap() == depth {
                        scope_depths.pop();
                        self.stack.pop();
                    }
                    depth = depth.saturating_sub(1);
                }
                _ if is_table_intro(token, query_type) => {
                    let frame = self.stack.last_mut().expect("root frame always present");
                    index = parse_table_list(sig, index + 1, caret, frame);
                    continue;
                }
                _ => {}
            }
            index += 1;
        }
    }

    /// Forward scan from the caret along the caret's nesting level.
    fn collect_remaining(&mut self, sig: &[&SqlToken], caret: usize, query_type: QueryType) {
        let mut index = caret;
        while index < sig.len() {
            let token = sig[index];
            match token.kind {
                TokenKind::OpenParen => {
                    // Never descend; deeper scopes are invisible here.
                    match find_matching_paren(sig, index, sig.len()) {
                        Some(close) => index = close + 1,
                        None => break,
                    }
                    continue;
                }
                TokenKind::CloseParen => {
                    // Stepping out into the enclosing query is fine.
                }
                _ if is_table_intro(token, query_type) => {
                    let frame = self.stack.last_mut().expect("root frame always present");
                    index = parse_table_list(sig, index + 1, sig.len(), frame);
                    continue;
                }
                _ => {}
            }
            index += 1;
        }
    }

    /// Flattens the live frames into the snapshot list. Order is
    /// preserved; duplicates across scopes are allowed.
    pub fn take_snapshot(&mut self) {
        for frame in &self.stack {
            self.references.extend(frame.iter().cloned());
        }
    }

    pub fn references(&self) -> &[TableReference] {
        &self.references
    }
}

/// Keywords that introduce a table reference list.
fn is_table_intro(token: &SqlToken, query_type: QueryType) -> bool {
    word_is(token, "FROM")
        || word_is(token, "JOIN")
        || word_is(token, "INTO")
        || word_is(token, "UPDATE")
        || (word_is(token, "USING") && query_type == QueryType::Delete)
        || (word_is(token, "ON") && query_type == QueryType::CreateTrigger)
}

fn find_matching_paren(sig: &[&SqlToken], open: usize, limit: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in sig.iter().enumerate().take(limit).skip(open) {
        match token.kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses `[schema .] table [[AS] alias]` entries separated by commas and
/// join keywords, appending each to `frame`. Returns the index at which
/// the table list ended.
fn parse_table_list(
    sig: &[&SqlToken],
    start: usize,
    limit: usize,
    frame: &mut Vec<TableReference>,
) -> usize {
    let mut index = start;
    let mut expecting_table = true;

    while index < limit {
        let token = sig[index];
        match token.kind {
            TokenKind::Comma => {
                expecting_table = true;
                index += 1;
            }
            TokenKind::OpenParen => {
                // Derived table or parenthesized join; skip the group and
                // pick up its alias. A group still open at the limit is
                // the caret's own scope and belongs to the caller.
                let Some(close) = find_matching_paren(sig, index, limit) else {
                    return index;
                };
                let (alias, next) = parse_alias(sig, close + 1, limit);
                if let Some(alias) = alias {
                    frame.push(TableReference::new("", "", alias));
                }
                index = next;
                expecting_table = false;
            }
            _ if word_is(token, "JOIN") => {
                expecting_table = true;
                index += 1;
            }
            _ if word_is(token, "INNER")
                || word_is(token, "LEFT")
                || word_is(token, "RIGHT")
                || word_is(token, "CROSS")
                || word_is(token, "OUTER")
                || word_is(token, "NATURAL")
                || word_is(token, "STRAIGHT_JOIN") =>
            {
                index += 1;
            }
            _ if expecting_table && is_identifier(token.kind, &token.text) => {
                let (reference, next) = parse_table_reference(sig, index, limit);
                frame.push(reference);
                index = next;
                expecting_table = false;
            }
            _ => return index,
        }
    }
    index
}

fn parse_table_reference(sig: &[&SqlToken], start: usize, limit: usize) -> (TableReference, usize) {
    let mut index = start;
    let first = unquote(&sig[index].text);
    index += 1;

    let (schema, table) = if index < limit && sig[index].kind == TokenKind::Dot {
        index += 1;
        if index < limit && is_identifier(sig[index].kind, &sig[index].text) {
            let second = unquote(&sig[index].text);
            index += 1;
            (first, second)
        } else {
            // Half-typed qualified name; keep the schema part.
            (first, String::new())
        }
    } else {
        (String::new(), first)
    };

    let (alias, index) = parse_alias(sig, index, limit);
    (
        TableReference {
            schema,
            table,
            alias: alias.unwrap_or_default(),
        },
        index,
    )
}

fn parse_alias(sig: &[&SqlToken], start: usize, limit: usize) -> (Option<String>, usize) {
    let mut index = start;
    if index < limit && word_is(sig[index], "AS") {
        index += 1;
    }
    if index < limit && is_identifier(sig[index].kind, &sig[index].text) {
        return (Some(unquote(&sig[index].text)), index + 1);
    }
    (None, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn collect_at_marker(sql: &str, query_type: QueryType) -> Vec<TableReference> {
        let offset = sql.find('|').expect("marker");
        let clean: String = sql.replacen('|', "", 1);
        let before = &clean[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map(|tail| tail.chars().count() as u32)
            .unwrap_or(0);

        let tokens = tokenize(&clean);
        let mut collector = ReferenceCollector::default();
        collector.collect(&tokens, line, column, query_type);
        collector.take_snapshot();
        collector.references().to_vec()
    }

    #[test]
    fn collects_references_after_the_caret() {
        let refs = collect_at_marker("SELECT | FROM t1, db2.t2 AS x", QueryType::Select);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], TableReference::new("", "t1", ""));
        assert_eq!(refs[1], TableReference::new("db2", "t2", "x"));
    }

    #[test]
    fn collects_joins_and_plain_aliases() {
        let refs = collect_at_marker(
            "SELECT a.| FROM t1 a JOIN t2 AS b ON a.id = b.id",
            QueryType::Select,
        );
        assert_eq!(refs[0], TableReference::new("", "t1", "a"));
        assert_eq!(refs[1], TableReference::new("", "t2", "b"));
    }

    #[test]
    fn sibling_subqueries_are_invisible() {
        let refs = collect_at_marker(
            "SELECT (SELECT c FROM hidden) , | FROM t1",
            QueryType::Select,
        );
        assert_eq!(refs, vec![TableReference::new("", "t1", "")]);
    }

    #[test]
    fn enclosing_scopes_stay_visible() {
        let refs = collect_at_marker(
            "SELECT * FROM outer1 o WHERE EXISTS (SELECT | FROM inner1 i)",
            QueryType::Select,
        );
        assert!(refs.contains(&TableReference::new("", "outer1", "o")));
        assert!(refs.contains(&TableReference::new("", "inner1", "i")));
    }

    #[test]
    fn forward_scan_does_not_descend() {
        let refs = collect_at_marker(
            "SELECT | FROM t1 WHERE id IN (SELECT id FROM deep)",
            QueryType::Select,
        );
        assert_eq!(refs, vec![TableReference::new("", "t1", "")]);
    }

    #[test]
    fn trigger_subject_table_is_first() {
        let refs = collect_at_marker(
            "CREATE TRIGGER trg BEFORE INSERT ON t1 FOR EACH ROW SELECT new.|",
            QueryType::CreateTrigger,
        );
        assert_eq!(refs.first(), Some(&TableReference::new("", "t1", "")));
    }

    #[test]
    fn update_and_insert_targets_are_references() {
        let refs = collect_at_marker("UPDATE t1 SET a = | WHERE b = 2", QueryType::Update);
        assert_eq!(refs[0], TableReference::new("", "t1", ""));

        let refs = collect_at_marker("INSERT INTO db.t2 (a) VALUES (|)", QueryType::Insert);
        assert_eq!(refs[0], TableReference::new("db", "t2", ""));
    }

    #[test]
    fn derived_table_contributes_its_alias() {
        let refs = collect_at_marker(
            "SELECT | FROM (SELECT a FROM base) AS sub",
            QueryType::Select,
        );
        assert!(refs.contains(&TableReference::new("", "", "sub")));
    }

    #[test]
    fn malformed_tail_is_tolerated() {
        let refs = collect_at_marker("SELECT | FROM t1 WHERE ((", QueryType::Select);
        assert_eq!(refs[0], TableReference::new("", "t1", ""));
    }
}
