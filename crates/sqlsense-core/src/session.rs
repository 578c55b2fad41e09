//! Per-buffer parsing state handed to the completion driver.
//!
//! A [`ParserSession`] owns the lexed token stream for one SQL buffer plus
//! the statement classification the driver and collector consult. It is
//! cheap to build and carries no mutable state, so one session can serve
//! any number of completion requests against the same buffer.

use crate::lexer;
use crate::scanner::TokenScanner;
use crate::types::{SqlToken, TokenChannel, TokenKind};

/// Coarse classification of the statement under the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Unknown,
    Select,
    Insert,
    Replace,
    Update,
    Delete,
    Use,
    Call,
    Set,
    Show,
    Truncate,
    Lock,
    CreateDatabase,
    CreateTable,
    CreateTrigger,
    CreateView,
    CreateIndex,
    CreateEvent,
    CreateProcedure,
    CreateFunction,
    CreateTablespace,
    CreateLogfileGroup,
    CreateServer,
    AlterDatabase,
    AlterTable,
    AlterView,
    AlterEvent,
    AlterTablespace,
    AlterLogfileGroup,
    AlterServer,
    AlterProcedure,
    AlterFunction,
    DropDatabase,
    DropTable,
    DropView,
    DropTrigger,
    DropIndex,
    DropEvent,
    DropProcedure,
    DropFunction,
    DropTablespace,
    DropLogfileGroup,
    DropServer,
}

pub struct ParserSession {
    tokens: Vec<SqlToken>,
}

impl ParserSession {
    /// Lexes the buffer. Never fails; unparseable tails degrade to a
    /// shorter token stream.
    pub fn new(sql: &str) -> Self {
        Self {
            tokens: lexer::tokenize(sql),
        }
    }

    pub fn tokens(&self) -> &[SqlToken] {
        &self.tokens
    }

    /// Classifies the statement containing the given caret position.
    pub fn query_type_at(&self, caret_line: u32, caret_column: u32) -> QueryType {
        let mut scanner = TokenScanner::new(&self.tokens);
        scanner.advance_to_position(caret_line, caret_column);
        let start = statement_start(&self.tokens, scanner.token_index());
        determine_query_type(&self.tokens, start)
    }
}

/// Index of the first token after the closest semicolon at or before
/// `index`. Statements do not nest in this dialect view; compound bodies
/// are treated as part of their CREATE statement.
pub(crate) fn statement_start(tokens: &[SqlToken], index: usize) -> usize {
    let upper = index.min(tokens.len());
    tokens[..upper]
        .iter()
        .rposition(|t| t.kind == TokenKind::Semicolon)
        .map(|pos| pos + 1)
        .unwrap_or(0)
}

/// Case-insensitive word check that works whether or not the dialect
/// recognized the word as a keyword.
pub(crate) fn word_is(token: &SqlToken, upper: &str) -> bool {
    matches!(
        token.kind,
        TokenKind::Keyword(_) | TokenKind::Identifier
    ) && token.text.eq_ignore_ascii_case(upper)
}

/// Between CREATE/ALTER/DROP and the object kind the grammar allows
/// clutter (definer clauses, OR REPLACE, uniqueness flags), so the first
/// recognized object keyword within a short window decides.
fn classify_object_kind(tokens: &[&SqlToken], verb: &str) -> QueryType {
    for token in tokens.iter().take(12) {
        let object = token.text.to_ascii_uppercase();
        let classified = match (verb, object.as_str()) {
            ("CREATE", "DATABASE" | "SCHEMA") => QueryType::CreateDatabase,
            ("CREATE", "TABLE") => QueryType::CreateTable,
            ("CREATE", "TRIGGER") => QueryType::CreateTrigger,
            ("CREATE", "VIEW") => QueryType::CreateView,
            ("CREATE", "INDEX") => QueryType::CreateIndex,
            ("CREATE", "EVENT") => QueryType::CreateEvent,
            ("CREATE", "PROCEDURE") => QueryType::CreateProcedure,
            ("CREATE", "FUNCTION") => QueryType::CreateFunction,
            ("CREATE", "TABLESPACE") => QueryType::CreateTablespace,
            ("CREATE", "LOGFILE") => QueryType::CreateLogfileGroup,
            ("CREATE", "SERVER") => QueryType::CreateServer,
            ("ALTER", "DATABASE" | "SCHEMA") => QueryType::AlterDatabase,
            ("ALTER", "TABLE") => QueryType::AlterTable,
            ("ALTER", "VIEW") => QueryType::AlterView,
            ("ALTER", "EVENT") => QueryType::AlterEvent,
            ("ALTER", "TABLESPACE") => QueryType::AlterTablespace,
            ("ALTER", "LOGFILE") => QueryType::AlterLogfileGroup,
            ("ALTER", "SERVER") => QueryType::AlterServer,
            ("ALTER", "PROCEDURE") => QueryType::AlterProcedure,
            ("ALTER", "FUNCTION") => QueryType::AlterFunction,
            ("DROP", "DATABASE" | "SCHEMA") => QueryType::DropDatabase,
            ("DROP", "TABLE" | "TABLES") => QueryType::DropTable,
            ("DROP", "VIEW") => QueryType::DropView,
            ("DROP", "TRIGGER") => QueryType::DropTrigger,
            ("DROP", "INDEX") => QueryType::DropIndex,
            ("DROP", "EVENT") => QueryType::DropEvent,
            ("DROP", "PROCEDURE") => QueryType::DropProcedure,
            ("DROP", "FUNCTION") => QueryType::DropFunction,
            ("DROP", "TABLESPACE") => QueryType::DropTablespace,
            ("DROP", "LOGFILE") => QueryType::DropLogfileGroup,
            ("DROP", "SERVER") => QueryType::DropServer,
            _ => QueryType::Unknown,
        };
        if classified != QueryType::Unknown {
            return classified;
        }
    }
    QueryType::Unknown
}

pub(crate) fn determine_query_type(tokens: &[SqlToken], start: usize) -> QueryType {
    let significant: Vec<&SqlToken> = tokens[start..]
        .iter()
        .filter(|t| t.channel == TokenChannel::Default && t.kind != TokenKind::Eof)
        .collect();

    let Some(first) = significant.first() else {
        return QueryType::Unknown;
    };

    match first.text.to_ascii_uppercase().as_str() {
        "SELECT" | "WITH" | "(" => QueryType::Select,
        "INSERT" => QueryType::Insert,
        "REPLACE" => QueryType::Replace,
        "UPDATE" => QueryType::Update,
        "DELETE" => QueryType::Delete,
        "USE" => QueryType::Use,
        "CALL" => QueryType::Call,
        "SET" => QueryType::Set,
        "SHOW" => QueryType::Show,
        "TRUNCATE" => QueryType::Truncate,
        "LOCK" => QueryType::Lock,
        "CREATE" => classify_object_kind(&significant[1..], "CREATE"),
        "ALTER" => classify_object_kind(&significant[1..], "ALTER"),
        "DROP" => classify_object_kind(&significant[1..], "DROP"),
        // EXPLAIN and DESCRIBE wrap the statement they analyze.
        "EXPLAIN" | "DESCRIBE" | "DESC" | "ANALYZE" => {
            let mut seen_verb = false;
            for (offset, token) in tokens[start..].iter().enumerate() {
                if token.channel == TokenChannel::Default && token.kind != TokenKind::Eof {
                    if seen_verb {
                        return determine_query_type(tokens, start + offset);
                    }
                    seen_verb = true;
                }
            }
            QueryType::Unknown
        }
        _ => QueryType::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_type(sql: &str) -> QueryType {
        let session = ParserSession::new(sql);
        determine_query_type(session.tokens(), 0)
    }

    #[test]
    fn classifies_simple_statements() {
        assert_eq!(query_type("SELECT 1"), QueryType::Select);
        assert_eq!(query_type("insert into t values (1)"), QueryType::Insert);
        assert_eq!(query_type("UPDATE t SET a = 1"), QueryType::Update);
        assert_eq!(query_type("use db"), QueryType::Use);
        assert_eq!(query_type(""), QueryType::Unknown);
    }

    #[test]
    fn classifies_create_variants_past_clutter() {
        assert_eq!(query_type("CREATE TABLE t (a INT)"), QueryType::CreateTable);
        assert_eq!(
            query_type("CREATE DEFINER = admin TRIGGER trg BEFORE INSERT ON t1"),
            QueryType::CreateTrigger
        );
        assert_eq!(query_type("CREATE OR REPLACE VIEW v AS"), QueryType::CreateView);
        assert_eq!(query_type("DROP VIEW db1.v"), QueryType::DropView);
        assert_eq!(
            query_type("CREATE LOGFILE GROUP lg"),
            QueryType::CreateLogfileGroup
        );
    }

    #[test]
    fn query_type_follows_the_caret_statement() {
        let session = ParserSession::new("USE db;\nDROP VIEW v");
        assert_eq!(session.query_type_at(1, 2), QueryType::Use);
        assert_eq!(session.query_type_at(2, 10), QueryType::DropView);
    }
}
