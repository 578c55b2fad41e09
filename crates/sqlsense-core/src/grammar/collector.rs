//! Bundled candidate collection engine.
//!
//! Derives the tokens and preferred rules legal at the caret from a
//! statement and clause analysis of the token stream: find the statement
//! under the caret, classify it, track the innermost query scope, then
//! read the candidates off static tables. Malformed input degrades to
//! fewer candidates, never to an error.

use tracing::trace;

use crate::scanner::TokenScanner;
use crate::session::{determine_query_type, statement_start, word_is, QueryType};
use crate::types::{is_identifier, Keyword, SqlToken, TokenChannel, TokenKind};

use super::keywords::{self, add_keywords, add_sequence};
use super::{CandidateCollector, CandidatesCollection, CollectorConfig, RuleId};

#[derive(Debug, Default)]
pub struct MySqlCandidateCollector;

impl CandidateCollector for MySqlCandidateCollector {
    fn collect_candidates(
        &self,
        tokens: &[SqlToken],
        caret_line: u32,
        caret_column: u32,
        config: &CollectorConfig,
    ) -> CandidatesCollection {
        if tokens.is_empty() {
            return CandidatesCollection::default();
        }

        let context = CaretContext::analyze(tokens, caret_line, caret_column, config);
        trace!(
            query_type = ?context.query_type,
            clause = ?context.clause,
            after_dot = context.after_dot,
            "collecting candidates"
        );

        let mut raw = CandidatesCollection::default();
        context.fill(&mut raw);

        let mut result = CandidatesCollection::default();
        for candidate in raw.tokens {
            if !config.is_ignored(candidate.kind) {
                result.add_token(candidate.kind, candidate.follow);
            }
        }
        for candidate in raw.rules {
            if config.is_preferred(candidate.rule) {
                result.add_rule_with_stack(candidate.rule, candidate.stack);
            }
        }
        result
    }
}

/// Innermost clause the caret sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    None,
    SelectList,
    From,
    Where,
    On,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    SetClause,
    Values,
}

struct Scope {
    clause: Clause,
    entry_depth: u32,
}

struct CaretContext<'a> {
    significant: Vec<&'a SqlToken>,
    query_type: QueryType,
    clause: Clause,
    depth: u32,
    partial: Option<&'a SqlToken>,
    after_dot: bool,
}

fn is_wordlike(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Keyword(_)
            | TokenKind::Not2
            | TokenKind::Identifier
            | TokenKind::QuotedIdentifier
            | TokenKind::UserVariableWord
            | TokenKind::SystemVariableWord
            | TokenKind::Number
            | TokenKind::HexNumber
    )
}

/// Token shapes that complete an expression operand.
fn ends_expression(token: &SqlToken) -> bool {
    match token.kind {
        TokenKind::Identifier
        | TokenKind::QuotedIdentifier
        | TokenKind::Number
        | TokenKind::HexNumber
        | TokenKind::SingleQuotedText
        | TokenKind::DoubleQuotedText
        | TokenKind::NationalText
        | TokenKind::CloseParen
        | TokenKind::Star
        | TokenKind::UserVariableWord
        | TokenKind::SystemVariableWord => true,
        TokenKind::Keyword(_) => {
            word_is(token, "NULL")
                || word_is(token, "TRUE")
                || word_is(token, "FALSE")
                || word_is(token, "END")
                || is_identifier(token.kind, &token.text)
        }
        _ => false,
    }
}

impl<'a> CaretContext<'a> {
    fn analyze(
        tokens: &'a [SqlToken],
        caret_line: u32,
        caret_column: u32,
        _config: &CollectorConfig,
    ) -> Self {
        let mut scanner = TokenScanner::new(tokens);
        scanner.advance_to_position(caret_line, caret_column);
        let caret_index = scanner.token_index();
        let caret_pos = (caret_line, caret_column);

        // A word the caret touches without separation is the word under
        // completion; candidates are computed as if the caret sat at its
        // first character.
        let mut boundary = caret_index;
        let mut partial = None;
        let current = &tokens[caret_index];
        let starts_before = (current.line, current.column) < caret_pos;
        if current.channel == TokenChannel::Default
            && current.kind != TokenKind::Eof
            && starts_before
            && is_wordlike(current.kind)
        {
            partial = Some(current);
        } else if !starts_before && boundary > 0 {
            let previous = &tokens[boundary - 1];
            if previous.channel == TokenChannel::Default
                && is_wordlike(previous.kind)
                && previous.end_position() == caret_pos
            {
                partial = Some(previous);
                boundary -= 1;
            }
        }

        let start = statement_start(tokens, boundary);
        let significant: Vec<&SqlToken> = tokens[start..boundary]
            .iter()
            .filter(|t| t.channel == TokenChannel::Default && t.kind != TokenKind::Eof)
            .collect();

        let query_type = determine_query_type(tokens, start);
        let (clause, depth) = track_scopes(&significant, query_type);

        let after_dot = match significant.last() {
            Some(last) if last.kind == TokenKind::Dot => significant
                .len()
                .checked_sub(2)
                .and_then(|i| significant.get(i))
                .map(|prev| is_identifier(prev.kind, &prev.text))
                .unwrap_or(false),
            _ => false,
        };

        Self {
            significant,
            query_type,
            clause,
            depth,
            partial,
            after_dot,
        }
    }

    fn last(&self, back: usize) -> Option<&'a SqlToken> {
        self.significant
            .len()
            .checked_sub(back + 1)
            .and_then(|i| self.significant.get(i))
            .copied()
    }

    fn last_is(&self, back: usize, upper: &str) -> bool {
        self.last(back).map(|t| word_is(t, upper)).unwrap_or(false)
    }

    fn last_kind(&self, back: usize) -> Option<TokenKind> {
        self.last(back).map(|t| t.kind)
    }

    fn contains_word(&self, upper: &str) -> bool {
        self.significant.iter().any(|t| word_is(t, upper))
    }

    fn fill(&self, out: &mut CandidatesCollection) {
        // A half-typed variable word pins the candidate set.
        if let Some(partial) = self.partial {
            match partial.kind {
                TokenKind::SystemVariableWord => {
                    out.add_rule(RuleId::SystemVariable);
                    return;
                }
                TokenKind::UserVariableWord => {
                    out.add_rule(RuleId::UserVariable);
                    return;
                }
                _ => {}
            }
        }

        if self.significant.is_empty() {
            add_keywords(out, keywords::STATEMENT_START);
            return;
        }

        if self.fill_special_contexts(out) {
            return;
        }

        match self.clause {
            Clause::SelectList
            | Clause::Where
            | Clause::On
            | Clause::GroupBy
            | Clause::Having
            | Clause::OrderBy
            | Clause::Values
            | Clause::Limit => self.fill_expression(out),
            Clause::SetClause => self.fill_set_clause(out),
            Clause::From => self.fill_table_list(out),
            Clause::None => self.fill_statement(out),
        }
    }

    /// Contexts recognizable from the trailing tokens alone, gated on the
    /// statements whose grammar actually reaches them.
    fn fill_special_contexts(&self, out: &mut CandidatesCollection) -> bool {
        use QueryType::*;

        // ENGINE [=]
        let engine_statement = matches!(self.query_type, CreateTable | AlterTable);
        if engine_statement
            && (self.last_is(0, "ENGINE")
                || (self.last_is(1, "ENGINE") && self.last_kind(0) == Some(TokenKind::Equal)))
        {
            out.add_rule(RuleId::EngineRef);
            return true;
        }

        // CHARACTER SET [=] / CHARSET [=] / SET NAMES
        let charset_statement = matches!(
            self.query_type,
            CreateDatabase | AlterDatabase | CreateTable | AlterTable | Set | Show
        );
        let charset_tail = (self.last_is(1, "CHARACTER") && self.last_is(0, "SET"))
            || self.last_is(0, "CHARSET")
            || (self.last_is(1, "CHARSET") && self.last_kind(0) == Some(TokenKind::Equal))
            || (self.last_is(2, "CHARACTER")
                && self.last_is(1, "SET")
                && self.last_kind(0) == Some(TokenKind::Equal))
            || self.last_is(0, "NAMES");
        if charset_statement && charset_tail {
            out.add_rule(RuleId::CharsetName);
            return true;
        }

        // COLLATE [=]
        let collation_statement = matches!(
            self.query_type,
            CreateDatabase | AlterDatabase | CreateTable | AlterTable | Set
        );
        if collation_statement
            && (self.last_is(0, "COLLATE")
                || (self.last_is(1, "COLLATE") && self.last_kind(0) == Some(TokenKind::Equal)))
        {
            out.add_rule(RuleId::CollationName);
            return true;
        }

        // ... USE LOGFILE GROUP | and the ALTER/DROP forms. CREATE LOGFILE
        // GROUP names a new object instead.
        let logfile_statement = matches!(
            self.query_type,
            CreateTablespace | AlterTablespace | DropLogfileGroup | AlterLogfileGroup
        );
        if logfile_statement && self.last_is(1, "LOGFILE") && self.last_is(0, "GROUP") {
            out.add_rule(RuleId::LogfileGroupRef);
            return true;
        }

        // Loop control inside stored program bodies.
        let routine_statement = matches!(
            self.query_type,
            CreateProcedure | CreateFunction | CreateTrigger | CreateEvent
        );
        if routine_statement && (self.last_is(0, "LEAVE") || self.last_is(0, "ITERATE")) {
            out.add_rule(RuleId::LabelRef);
            return true;
        }

        false
    }

    fn fill_expression(&self, out: &mut CandidatesCollection) {
        let select_list = self.clause == Clause::SelectList;

        if self.after_dot {
            out.add_rule(RuleId::ColumnRef);
            out.add_rule(RuleId::FunctionCall);
            if select_list {
                out.add_rule(RuleId::TableWild);
            }
            return;
        }

        if self.clause == Clause::Limit {
            // LIMIT takes literals; after one, OFFSET may follow.
            if self.last(0).map(|t| t.kind == TokenKind::Number).unwrap_or(false) {
                add_keywords(out, &[Keyword::OFFSET, Keyword::UNION]);
            }
            return;
        }

        let continuation = self.last(0).map(ends_expression).unwrap_or(false);
        if continuation {
            add_keywords(out, keywords::EXPRESSION_CONTINUATION);
            out.add_token(TokenKind::Not2, Vec::new());
            match self.clause {
                Clause::SelectList => add_keywords(out, keywords::SELECT_LIST_CONTINUATION),
                Clause::Where => {
                    add_keywords(out, keywords::WHERE_CONTINUATION);
                    add_sequence(out, Keyword::GROUP, &[Keyword::BY]);
                    add_sequence(out, Keyword::ORDER, &[Keyword::BY]);
                }
                Clause::On => {
                    add_keywords(out, keywords::JOIN_CONDITION_CONTINUATION);
                    add_sequence(out, Keyword::GROUP, &[Keyword::BY]);
                    add_sequence(out, Keyword::ORDER, &[Keyword::BY]);
                }
                Clause::GroupBy => {
                    add_keywords(out, keywords::GROUP_BY_CONTINUATION);
                    add_sequence(out, Keyword::ORDER, &[Keyword::BY]);
                }
                Clause::Having => {
                    add_keywords(out, keywords::WHERE_CONTINUATION);
                    add_sequence(out, Keyword::ORDER, &[Keyword::BY]);
                }
                Clause::OrderBy => add_keywords(out, keywords::ORDER_BY_CONTINUATION),
                Clause::Values => add_keywords(out, &[Keyword::ON]),
                _ => {}
            }
            return;
        }

        // Fresh operand position.
        out.add_rule(RuleId::ColumnRef);
        out.add_rule(RuleId::FunctionCall);
        out.add_rule(RuleId::RuntimeFunctionCall);
        out.add_rule(RuleId::UserVariable);
        out.add_rule(RuleId::SystemVariable);
        add_keywords(out, keywords::EXPRESSION_START);

        if select_list {
            out.add_rule(RuleId::TableWild);
            let head = self.last_is(0, "SELECT")
                || self.last_is(0, "ALL")
                || self.last_is(0, "DISTINCT");
            if head {
                out.add_token(TokenKind::Star, Vec::new());
            }
            if self.last_is(0, "SELECT") {
                add_keywords(out, keywords::SELECT_MODIFIERS);
            }
        }
    }

    fn fill_set_clause(&self, out: &mut CandidatesCollection) {
        if self.after_dot {
            out.add_rule(RuleId::ColumnRef);
            return;
        }
        match self.last_kind(0) {
            Some(TokenKind::Comma) => out.add_rule(RuleId::ColumnRef),
            Some(kind) if kind.is_operator() => {
                // Right-hand side of an assignment.
                out.add_rule(RuleId::ColumnRef);
                out.add_rule(RuleId::FunctionCall);
                out.add_rule(RuleId::RuntimeFunctionCall);
                out.add_rule(RuleId::UserVariable);
                out.add_rule(RuleId::SystemVariable);
                add_keywords(out, keywords::EXPRESSION_START);
            }
            _ if self.last_is(0, "SET") => {
                out.add_rule(RuleId::ColumnRef);
                if self.query_type == QueryType::Set {
                    out.add_rule(RuleId::SystemVariable);
                    out.add_rule(RuleId::UserVariable);
                    add_keywords(out, &[Keyword::GLOBAL, Keyword::SESSION, Keyword::NAMES]);
                }
            }
            _ if self.last_is(0, "GLOBAL") || self.last_is(0, "SESSION") => {
                out.add_rule(RuleId::SystemVariable);
            }
            _ => {
                add_keywords(out, keywords::EXPRESSION_CONTINUATION);
                add_keywords(out, &[Keyword::WHERE, Keyword::LIMIT]);
                add_sequence(out, Keyword::ORDER, &[Keyword::BY]);
            }
        }
    }

    fn fill_table_list(&self, out: &mut CandidatesCollection) {
        // SHOW statements reuse FROM for schema qualification.
        if self.query_type == QueryType::Show {
            if self.contains_word("TABLES") || self.contains_word("TRIGGERS") {
                out.add_rule(RuleId::SchemaRef);
            } else {
                out.add_rule(RuleId::TableRef);
            }
            return;
        }

        if self.after_dot {
            out.add_rule(RuleId::TableRef);
            return;
        }

        let fresh = match self.last(0) {
            Some(last) => {
                word_is(last, "FROM")
                    || word_is(last, "JOIN")
                    || word_is(last, "USING")
                    || last.kind == TokenKind::Comma
            }
            None => false,
        };
        if fresh {
            out.add_rule(RuleId::TableRef);
            if self.last_is(0, "FROM") {
                add_keywords(out, &[Keyword::DUAL]);
            }
            return;
        }

        if self.last_kind(0) == Some(TokenKind::OpenParen) {
            // Derived table or parenthesized join.
            out.add_rule(RuleId::TableRef);
            add_keywords(out, &[Keyword::SELECT]);
            return;
        }

        match self.last(0) {
            Some(last) if word_is(last, "LEFT") || word_is(last, "RIGHT") => {
                add_keywords(out, &[Keyword::OUTER, Keyword::JOIN]);
            }
            Some(last) if word_is(last, "INNER") || word_is(last, "CROSS") || word_is(last, "OUTER") => {
                add_keywords(out, &[Keyword::JOIN]);
            }
            Some(last) if word_is(last, "NATURAL") => {
                add_keywords(out, &[Keyword::LEFT, Keyword::RIGHT, Keyword::JOIN]);
            }
            Some(last) if word_is(last, "AS") => {}
            _ => {
                // After a complete table reference.
                add_keywords(out, keywords::TABLE_LIST_CONTINUATION);
                add_sequence(out, Keyword::GROUP, &[Keyword::BY]);
                add_sequence(out, Keyword::ORDER, &[Keyword::BY]);
            }
        }
    }

    fn fill_statement(&self, out: &mut CandidatesCollection) {
        use QueryType::*;

        match self.query_type {
            Select => {
                if self.last_is(0, "UNION") {
                    add_keywords(out, &[Keyword::SELECT, Keyword::ALL, Keyword::DISTINCT]);
                } else if self.last_is(0, "WITH") {
                    add_keywords(out, &[Keyword::RECURSIVE]);
                    out.add_rule(RuleId::Identifier);
                } else {
                    add_keywords(out, &[Keyword::SELECT]);
                }
            }
            Insert | Replace => self.fill_insert(out),
            Update => {
                if self.last_is(0, "UPDATE") {
                    out.add_rule(RuleId::TableRef);
                } else if is_identifier_token(self.last(0)) {
                    add_keywords(out, &[Keyword::SET]);
                }
            }
            Delete => self.fill_delete(out),
            Use => {
                if self.last_is(0, "USE") {
                    out.add_rule(RuleId::SchemaRef);
                }
            }
            Call => {
                if self.last_is(0, "CALL") {
                    out.add_rule(RuleId::ProcedureRef);
                } else if self.after_dot {
                    out.add_rule(RuleId::ProcedureRef);
                }
            }
            // SET always drives the clause tracker into the assignment
            // clause; this arm only fires on degenerate token streams.
            Set => self.fill_set_clause(out),
            Show => self.fill_show(out),
            Truncate => {
                out.add_rule(RuleId::TableRef);
                if self.last_is(0, "TRUNCATE") {
                    add_keywords(out, &[Keyword::TABLE]);
                }
            }
            Lock => {
                if self.last_is(0, "LOCK") {
                    add_keywords(out, &[Keyword::TABLES]);
                } else if self.last_is(0, "TABLES") || self.last_kind(0) == Some(TokenKind::Comma) {
                    out.add_rule(RuleId::TableRef);
                } else {
                    add_keywords(out, &[Keyword::READ, Keyword::WRITE, Keyword::AS]);
                }
            }
            DropDatabase | AlterDatabase => {
                if self.last_is(0, "DATABASE") || self.last_is(0, "SCHEMA") {
                    out.add_rule(RuleId::SchemaRef);
                } else if self.query_type == AlterDatabase {
                    add_keywords(out, &[Keyword::DEFAULT, Keyword::CHARACTER, Keyword::COLLATE]);
                }
            }
            DropTable => {
                out.add_rule(RuleId::TableRef);
                if self.last_is(0, "TABLE") || self.last_is(0, "TABLES") {
                    add_keywords(out, &[Keyword::IF]);
                }
            }
            DropView => {
                out.add_rule(RuleId::ViewRef);
                if self.last_is(0, "VIEW") {
                    add_keywords(out, &[Keyword::IF]);
                }
            }
            DropTrigger => {
                out.add_rule(RuleId::TriggerRef);
                if self.last_is(0, "TRIGGER") {
                    add_keywords(out, &[Keyword::IF]);
                }
            }
            DropProcedure | AlterProcedure => out.add_rule(RuleId::ProcedureRef),
            DropFunction | AlterFunction => out.add_rule(RuleId::FunctionRef),
            DropEvent | AlterEvent => out.add_rule(RuleId::EventRef),
            DropTablespace | AlterTablespace => out.add_rule(RuleId::TablespaceRef),
            DropLogfileGroup | AlterLogfileGroup => {
                // Past "LOGFILE GROUP" the name is expected; the pre-GROUP
                // positions only take the fixed keywords.
                if self.last_is(0, "LOGFILE") {
                    add_keywords(out, &[Keyword::GROUP]);
                }
            }
            DropServer | AlterServer => out.add_rule(RuleId::ServerRef),
            DropIndex => {
                if self.last_is(0, "ON") {
                    out.add_rule(RuleId::TableRef);
                } else if !self.last_is(0, "INDEX") {
                    add_keywords(out, &[Keyword::ON]);
                }
            }
            AlterTable => self.fill_alter_table(out),
            AlterView => {
                if self.last_is(0, "VIEW") {
                    out.add_rule(RuleId::ViewRef);
                } else {
                    add_keywords(out, &[Keyword::AS]);
                }
            }
            CreateDatabase => {
                out.add_rule(RuleId::Identifier);
                add_keywords(out, &[Keyword::IF]);
            }
            CreateTable => self.fill_create_table(out),
            CreateTrigger => self.fill_create_trigger(out),
            CreateView => {
                if self.last_is(0, "AS") {
                    add_keywords(out, &[Keyword::SELECT]);
                } else if !self.last_is(0, "VIEW") {
                    add_keywords(out, &[Keyword::AS]);
                } else {
                    out.add_rule(RuleId::Identifier);
                }
            }
            CreateIndex => {
                if self.last_is(0, "ON") {
                    out.add_rule(RuleId::TableRef);
                } else if self.depth > 0 {
                    out.add_rule(RuleId::ColumnInternalRef);
                } else if !self.last_is(0, "INDEX") {
                    add_keywords(out, &[Keyword::ON]);
                }
            }
            CreateEvent => {
                if self.last_is(0, "EVENT") {
                    out.add_rule(RuleId::Identifier);
                } else {
                    add_keywords(out, &[Keyword::ON]);
                }
            }
            CreateTablespace | CreateLogfileGroup | CreateProcedure | CreateFunction
            | CreateServer => {
                out.add_rule(RuleId::Identifier);
            }
            Unknown => {
                // Statement starters already handled for the empty case;
                // an unrecognized verb yields nothing.
            }
        }
    }

    fn fill_insert(&self, out: &mut CandidatesCollection) {
        if self.last_is(0, "INSERT") || self.last_is(0, "REPLACE") {
            add_keywords(out, &[Keyword::INTO, Keyword::IGNORE]);
            return;
        }
        if self.last_is(0, "INTO") || self.last_is(0, "IGNORE") || self.after_dot {
            out.add_rule(RuleId::TableRef);
            return;
        }
        if self.depth > 0 {
            // Insert column list.
            out.add_rule(RuleId::ColumnRef);
            return;
        }
        if self.last_kind(0) == Some(TokenKind::CloseParen) || is_identifier_token(self.last(0)) {
            add_keywords(out, &[Keyword::VALUES, Keyword::SELECT, Keyword::SET]);
        }
    }

    fn fill_delete(&self, out: &mut CandidatesCollection) {
        if self.last_is(0, "DELETE") {
            add_keywords(out, &[Keyword::FROM, Keyword::IGNORE]);
            out.add_rule(RuleId::TableRefWithWildcard);
            return;
        }
        if self.after_dot {
            // Multi-table delete target list.
            out.add_rule(RuleId::TableRefWithWildcard);
            return;
        }
        if self.last_kind(0) == Some(TokenKind::Comma) {
            out.add_rule(RuleId::TableRefWithWildcard);
            return;
        }
        if self.last_kind(0) == Some(TokenKind::Star) || is_identifier_token(self.last(0)) {
            add_keywords(out, &[Keyword::FROM, Keyword::USING]);
        }
    }

    fn fill_show(&self, out: &mut CandidatesCollection) {
        if self.last_is(0, "SHOW") {
            add_keywords(
                out,
                &[
                    Keyword::DATABASES,
                    Keyword::TABLES,
                    Keyword::COLUMNS,
                    Keyword::CREATE,
                    Keyword::FULL,
                ],
            );
            return;
        }
        if self.last_is(0, "TABLES") {
            add_keywords(out, &[Keyword::FROM, Keyword::IN, Keyword::LIKE]);
            return;
        }
        if self.last_is(0, "COLUMNS") {
            add_keywords(out, &[Keyword::FROM]);
            return;
        }
        if self.last_is(1, "CREATE") {
            if self.last_is(0, "TABLE") {
                out.add_rule(RuleId::TableRef);
            } else if self.last_is(0, "VIEW") {
                out.add_rule(RuleId::ViewRef);
            } else if self.last_is(0, "TRIGGER") {
                out.add_rule(RuleId::TriggerRef);
            } else if self.last_is(0, "PROCEDURE") {
                out.add_rule(RuleId::ProcedureRef);
            } else if self.last_is(0, "FUNCTION") {
                out.add_rule(RuleId::FunctionRef);
            }
            return;
        }
        if self.last_is(0, "CREATE") {
            add_keywords(
                out,
                &[
                    Keyword::TABLE,
                    Keyword::VIEW,
                    Keyword::TRIGGER,
                    Keyword::PROCEDURE,
                    Keyword::FUNCTION,
                ],
            );
        }
    }

    fn fill_alter_table(&self, out: &mut CandidatesCollection) {
        if self.last_is(0, "TABLE") || self.after_dot {
            out.add_rule(RuleId::TableRef);
            return;
        }
        if self.last_is(0, "ADD") {
            add_keywords(
                out,
                &[
                    Keyword::COLUMN,
                    Keyword::UNIQUE,
                    Keyword::INDEX,
                    Keyword::KEY,
                    Keyword::CONSTRAINT,
                    Keyword::FOREIGN,
                ],
            );
            add_sequence(out, Keyword::PRIMARY, &[Keyword::KEY]);
            return;
        }
        if self.last_is(0, "DROP") || self.last_is(0, "MODIFY") || self.last_is(0, "CHANGE") {
            out.add_rule(RuleId::ColumnInternalRef);
            add_keywords(out, &[Keyword::COLUMN, Keyword::INDEX, Keyword::KEY]);
            add_sequence(out, Keyword::PRIMARY, &[Keyword::KEY]);
            return;
        }
        if self.last_is(0, "COLUMN") {
            out.add_rule(RuleId::ColumnInternalRef);
            return;
        }
        if self.last_is(0, "RENAME") {
            add_keywords(out, &[Keyword::TO, Keyword::AS]);
            return;
        }
        if self.last_is(0, "REFERENCES") {
            out.add_rule(RuleId::TableRef);
            return;
        }
        if self.depth > 0 {
            out.add_rule(RuleId::ColumnInternalRef);
            return;
        }
        if is_identifier_token(self.last(0)) && self.last_is(1, "TABLE") {
            add_keywords(out, keywords::ALTER_TABLE_ACTIONS);
        }
    }

    fn fill_create_table(&self, out: &mut CandidatesCollection) {
        if self.last_is(0, "TABLE") {
            out.add_rule(RuleId::Identifier);
            add_keywords(out, &[Keyword::IF]);
            return;
        }
        if self.last_is(0, "LIKE") || self.last_is(0, "REFERENCES") {
            out.add_rule(RuleId::TableRef);
            return;
        }
        if self.last_is(0, "TABLESPACE") {
            out.add_rule(RuleId::TablespaceRef);
            return;
        }
        if self.depth > 0 {
            if self.last_kind(0) == Some(TokenKind::OpenParen)
                && (self.last_is(1, "KEY") || self.last_is(1, "INDEX"))
            {
                out.add_rule(RuleId::ColumnInternalRef);
                return;
            }
            if matches!(
                self.last_kind(0),
                Some(TokenKind::OpenParen) | Some(TokenKind::Comma)
            ) {
                // New column name or a table constraint.
                out.add_rule(RuleId::Identifier);
                add_keywords(
                    out,
                    &[
                        Keyword::UNIQUE,
                        Keyword::KEY,
                        Keyword::INDEX,
                        Keyword::CONSTRAINT,
                        Keyword::FOREIGN,
                    ],
                );
                add_sequence(out, Keyword::PRIMARY, &[Keyword::KEY]);
                return;
            }
            if is_identifier_token(self.last(0)) {
                add_keywords(out, keywords::COLUMN_TYPES);
                return;
            }
            add_keywords(out, keywords::COLUMN_ATTRIBUTES);
            return;
        }
        if self.last_kind(0) == Some(TokenKind::CloseParen) {
            add_keywords(out, &[Keyword::ENGINE, Keyword::DEFAULT, Keyword::COLLATE]);
            add_keywords(out, &[Keyword::AS, Keyword::SELECT]);
        }
    }

    fn fill_create_trigger(&self, out: &mut CandidatesCollection) {
        if self.last_is(0, "TRIGGER") {
            out.add_rule(RuleId::Identifier);
            return;
        }
        if self.last_is(1, "TRIGGER") {
            add_keywords(out, &[Keyword::BEFORE, Keyword::AFTER]);
            return;
        }
        if self.last_is(0, "BEFORE") || self.last_is(0, "AFTER") {
            add_keywords(out, &[Keyword::INSERT, Keyword::UPDATE, Keyword::DELETE]);
            return;
        }
        if self.last_is(0, "INSERT") || self.last_is(0, "UPDATE") || self.last_is(0, "DELETE") {
            add_keywords(out, &[Keyword::ON]);
            return;
        }
        if self.last_is(0, "ON") || self.after_dot {
            out.add_rule(RuleId::TableRefNoDb);
            return;
        }
        if self.last_is(1, "ON") {
            add_sequence(out, Keyword::FOR, &[Keyword::EACH, Keyword::ROW]);
            return;
        }
        if self.last_is(0, "FOR") {
            add_sequence(out, Keyword::EACH, &[Keyword::ROW]);
            return;
        }
        if self.last_is(0, "EACH") {
            add_keywords(out, &[Keyword::ROW]);
            return;
        }
        if self.last_is(0, "ROW") || self.last_is(0, "BEGIN") {
            add_keywords(out, keywords::TRIGGER_BODY_START);
        }
    }
}

fn is_identifier_token(token: Option<&SqlToken>) -> bool {
    token
        .map(|t| is_identifier(t.kind, &t.text))
        .unwrap_or(false)
}

/// Tracks query scopes and the innermost clause up to the caret.
fn track_scopes(significant: &[&SqlToken], query_type: QueryType) -> (Clause, u32) {
    let mut depth = 0u32;
    let mut scopes = vec![Scope {
        clause: Clause::None,
        entry_depth: 0,
    }];

    let mut index = 0;
    while index < significant.len() {
        let token = significant[index];
        match token.kind {
            TokenKind::OpenParen => depth += 1,
            TokenKind::CloseParen => {
                if scopes.len() > 1 && scopes[scopes.len() - 1].entry_depth == depth {
                    scopes.pop();
                }
                depth = depth.saturating_sub(1);
            }
            _ => {
                let top = scopes.last_mut().expect("root scope always present");
                if word_is(token, "SELECT") {
                    if depth > top.entry_depth {
                        scopes.push(Scope {
                            clause: Clause::SelectList,
                            entry_depth: depth,
                        });
                    } else {
                        top.clause = Clause::SelectList;
                    }
                } else if word_is(token, "FROM") {
                    top.clause = Clause::From;
                } else if word_is(token, "WHERE") {
                    top.clause = Clause::Where;
                } else if word_is(token, "ON") && top.clause != Clause::None {
                    top.clause = Clause::On;
                } else if word_is(token, "HAVING") {
                    top.clause = Clause::Having;
                } else if word_is(token, "LIMIT") || word_is(token, "OFFSET") {
                    top.clause = Clause::Limit;
                } else if word_is(token, "VALUES") {
                    top.clause = Clause::Values;
                } else if word_is(token, "SET") && top.clause != Clause::SelectList {
                    top.clause = Clause::SetClause;
                } else if word_is(token, "JOIN") {
                    top.clause = Clause::From;
                } else if word_is(token, "USING") && query_type == QueryType::Delete {
                    top.clause = Clause::From;
                } else if word_is(token, "UNION") {
                    top.clause = Clause::None;
                } else if word_is(token, "GROUP") || word_is(token, "ORDER") {
                    if significant
                        .get(index + 1)
                        .map(|next| word_is(next, "BY"))
                        .unwrap_or(false)
                    {
                        top.clause = if word_is(token, "GROUP") {
                            Clause::GroupBy
                        } else {
                            Clause::OrderBy
                        };
                        index += 1;
                    }
                }
            }
        }
        index += 1;
    }

    let top = scopes.last().expect("root scope always present");
    (top.clause, depth)
}
