//! Candidate collection.
//!
//! The completion driver does not inspect the grammar itself; it configures
//! a [`CandidateCollector`] and interprets the tokens and preferred rules
//! the collector reports for the caret. The bundled [`MySqlCandidateCollector`]
//! derives candidates from a statement and clause analysis of the token
//! stream; an ATN-driven engine can be substituted through the same trait.

mod collector;
mod keywords;

pub use collector::MySqlCandidateCollector;

use std::sync::OnceLock;

use crate::types::{SqlToken, TokenKind};

/// Grammar rules whose entry stands for a domain object rather than a
/// keyword. These are the rules a collector may report; the driver maps
/// them to metadata queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    SchemaRef,
    TableRef,
    TableRefWithWildcard,
    FilterTableRef,
    TableRefNoDb,
    ColumnRef,
    ColumnInternalRef,
    TableWild,
    FunctionRef,
    FunctionCall,
    RuntimeFunctionCall,
    TriggerRef,
    ViewRef,
    ProcedureRef,
    LogfileGroupRef,
    TablespaceRef,
    EngineRef,
    CollationName,
    CharsetName,
    EventRef,
    ServerRef,
    UserVariable,
    SystemVariable,
    LabelRef,
    // Helper rules; reported for completeness, ignored by the driver.
    ParameterName,
    ProcedureName,
    Identifier,
    LabelIdentifier,
}

/// A keyword candidate with the token kinds that must follow it on the
/// only viable grammar path (`GROUP` is always followed by `BY`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCandidate {
    pub kind: TokenKind,
    pub follow: Vec<TokenKind>,
}

/// A preferred-rule candidate with the rule stack that surrounded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleCandidate {
    pub rule: RuleId,
    pub stack: Vec<RuleId>,
}

/// Collector output: the tokens and rules legal at the caret.
///
/// Both collections behave like insertion-ordered maps keyed by kind and
/// rule; the first entry for a key wins. Keeping them as vectors makes the
/// iteration order deterministic, which the output ordering contract
/// depends on.
#[derive(Debug, Default, Clone)]
pub struct CandidatesCollection {
    pub tokens: Vec<TokenCandidate>,
    pub rules: Vec<RuleCandidate>,
}

impl CandidatesCollection {
    pub fn add_token(&mut self, kind: TokenKind, follow: Vec<TokenKind>) {
        if !self.tokens.iter().any(|c| c.kind == kind) {
            self.tokens.push(TokenCandidate { kind, follow });
        }
    }

    pub fn add_rule(&mut self, rule: RuleId) {
        self.add_rule_with_stack(rule, Vec::new());
    }

    pub fn add_rule_with_stack(&mut self, rule: RuleId, stack: Vec<RuleId>) {
        if !self.rules.iter().any(|c| c.rule == rule) {
            self.rules.push(RuleCandidate { rule, stack });
        }
    }

    pub fn has_rule(&self, rule: RuleId) -> bool {
        self.rules.iter().any(|c| c.rule == rule)
    }

    /// Replaces every candidate of `from` with `to`, keeping the follow
    /// sequence. Used for precedence spellings that complete like their
    /// canonical keyword.
    pub fn remap_token(&mut self, from: TokenKind, to: TokenKind) {
        let Some(pos) = self.tokens.iter().position(|c| c.kind == from) else {
            return;
        };
        let follow = self.tokens.remove(pos).follow;
        self.add_token(to, follow);
    }
}

/// The three token and rule sets a collector is configured with.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Token kinds filtered out of the token result. Object names and
    /// literal input come from context-specific logic, not keyword lists.
    pub ignored_tokens: Vec<TokenKind>,
    /// Rules recorded instead of being expanded into tokens.
    pub preferred_rules: Vec<RuleId>,
    /// Token kinds that may directly abut the word being completed.
    pub no_separator_tokens: Vec<TokenKind>,
}

impl CollectorConfig {
    pub fn is_ignored(&self, kind: TokenKind) -> bool {
        self.ignored_tokens.contains(&kind)
    }

    pub fn is_preferred(&self, rule: RuleId) -> bool {
        self.preferred_rules.contains(&rule)
    }

    pub fn no_separator_required(&self, kind: TokenKind) -> bool {
        self.no_separator_tokens.contains(&kind)
    }

    /// The fixed configuration the driver uses. Part of the public
    /// contract: changing these sets changes observable completions.
    pub fn mysql_defaults() -> &'static CollectorConfig {
        static CONFIG: OnceLock<CollectorConfig> = OnceLock::new();
        CONFIG.get_or_init(|| {
            let operators = vec![
                TokenKind::Equal,
                TokenKind::NullSafeEqual,
                TokenKind::GreaterOrEqual,
                TokenKind::Greater,
                TokenKind::LessOrEqual,
                TokenKind::Less,
                TokenKind::NotEqual,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Div,
                TokenKind::Mod,
                TokenKind::LogicalNot,
                TokenKind::BitwiseNot,
                TokenKind::ShiftLeft,
                TokenKind::ShiftRight,
                TokenKind::LogicalAnd,
                TokenKind::BitwiseAnd,
                TokenKind::BitwiseXor,
                TokenKind::LogicalOr,
                TokenKind::BitwiseOr,
                TokenKind::ConcatPipes,
                TokenKind::Dot,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::OpenCurly,
                TokenKind::CloseCurly,
                TokenKind::AtSign,
                TokenKind::ParamMarker,
            ];

            // The select-list wildcard is missing on purpose: it is offered
            // as a keyword-style candidate even though `*` doubles as the
            // multiplication operator.
            let mut ignored_tokens = operators.clone();
            ignored_tokens.extend([
                TokenKind::Eof,
                TokenKind::Identifier,
                TokenKind::QuotedIdentifier,
                TokenKind::UserVariableWord,
                TokenKind::SystemVariableWord,
                TokenKind::SingleQuotedText,
                TokenKind::DoubleQuotedText,
                TokenKind::NationalText,
                TokenKind::Number,
                TokenKind::HexNumber,
                TokenKind::Other,
            ]);

            CollectorConfig {
                ignored_tokens,
                preferred_rules: vec![
                    RuleId::SchemaRef,
                    RuleId::TableRef,
                    RuleId::TableRefWithWildcard,
                    RuleId::FilterTableRef,
                    RuleId::TableRefNoDb,
                    RuleId::ColumnRef,
                    RuleId::ColumnInternalRef,
                    RuleId::TableWild,
                    RuleId::FunctionRef,
                    RuleId::FunctionCall,
                    RuleId::RuntimeFunctionCall,
                    RuleId::TriggerRef,
                    RuleId::ViewRef,
                    RuleId::ProcedureRef,
                    RuleId::LogfileGroupRef,
                    RuleId::TablespaceRef,
                    RuleId::EngineRef,
                    RuleId::CollationName,
                    RuleId::CharsetName,
                    RuleId::EventRef,
                    RuleId::ServerRef,
                    RuleId::UserVariable,
                    RuleId::SystemVariable,
                    RuleId::LabelRef,
                    RuleId::ParameterName,
                    RuleId::ProcedureName,
                    RuleId::Identifier,
                    RuleId::LabelIdentifier,
                ],
                no_separator_tokens: operators,
            }
        })
    }
}

/// Contract between the driver and a candidate collection engine.
///
/// `caret_line` is 1-based, `caret_column` a 0-based character column. The
/// result must be deterministic for a fixed (input, caret, configuration)
/// and must never fail on malformed input.
pub trait CandidateCollector {
    fn collect_candidates(
        &self,
        tokens: &[SqlToken],
        caret_line: u32,
        caret_column: u32,
        config: &CollectorConfig,
    ) -> CandidatesCollection;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_keeps_first_entry_per_key() {
        let mut collection = CandidatesCollection::default();
        collection.add_token(TokenKind::Star, vec![]);
        collection.add_token(TokenKind::Star, vec![TokenKind::Dot]);
        assert_eq!(collection.tokens.len(), 1);
        assert!(collection.tokens[0].follow.is_empty());

        collection.add_rule(RuleId::ColumnRef);
        collection.add_rule(RuleId::ColumnRef);
        assert_eq!(collection.rules.len(), 1);
    }

    #[test]
    fn remap_preserves_follow_sequence() {
        let mut collection = CandidatesCollection::default();
        collection.add_token(TokenKind::Not2, vec![TokenKind::Star]);
        collection.remap_token(TokenKind::Not2, TokenKind::Keyword(crate::types::Keyword::NOT));
        assert_eq!(collection.tokens.len(), 1);
        assert_eq!(
            collection.tokens[0].kind,
            TokenKind::Keyword(crate::types::Keyword::NOT)
        );
        assert_eq!(collection.tokens[0].follow, vec![TokenKind::Star]);
    }

    #[test]
    fn default_config_ignores_operators_but_not_star() {
        let config = CollectorConfig::mysql_defaults();
        assert!(config.is_ignored(TokenKind::Plus));
        assert!(config.is_ignored(TokenKind::Identifier));
        assert!(config.is_ignored(TokenKind::Eof));
        assert!(!config.is_ignored(TokenKind::Star));
        assert!(config.no_separator_required(TokenKind::Dot));
        assert!(config.is_preferred(RuleId::ColumnRef));
    }
}
