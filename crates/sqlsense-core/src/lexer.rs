//! Lexing adapter.
//!
//! Turns SQL text into the crate's token model using sqlparser's tokenizer
//! with the MySQL dialect. Completion runs against half-typed buffers, so
//! tokenization must not fail the request: on error we retry with a small
//! quote fix and finally lex the longest prefix that tokenizes.

use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Token, TokenWithSpan, Tokenizer};
use tracing::debug;

use crate::error::LexError;
use crate::types::{SqlToken, TokenChannel, TokenKind};

/// Lexes `sql` into tokens ending with a synthetic EOF token.
pub fn tokenize(sql: &str) -> Vec<SqlToken> {
    match try_tokenize(sql) {
        Ok(tokens) => tokens,
        Err(err) => {
            debug!(%err, "tokenizer rejected input, applying fixes");
            tokenize_with_fixes(sql, err)
        }
    }
}

fn try_tokenize(sql: &str) -> Result<Vec<SqlToken>, LexError> {
    let dialect = MySqlDialect {};
    let mut tokenizer = Tokenizer::new(&dialect, sql);
    let raw = tokenizer.tokenize_with_location().map_err(|err| {
        let location = err.location;
        LexError::Tokenizer {
            message: err.message,
            line: location.line,
            column: location.column,
        }
    })?;
    map_tokens(sql, &raw)
}

/// The unclosed-literal ladder: an in-progress string or quoted identifier
/// is the usual reason a buffer stops lexing. Closing it keeps every token
/// before the caret intact.
fn tokenize_with_fixes(sql: &str, err: LexError) -> Vec<SqlToken> {
    for quote in ['\'', '"', '`'] {
        let mut fixed = sql.to_string();
        fixed.push(quote);
        if let Ok(tokens) = try_tokenize(&fixed) {
            return tokens;
        }
    }

    // Last resort: drop everything from the error position on.
    if let LexError::Tokenizer { line, column, .. } = err {
        if let Some(offset) = line_col_to_offset(sql, line, column) {
            if offset > 0 {
                if let Ok(tokens) = try_tokenize(&sql[..offset]) {
                    return tokens;
                }
            }
        }
    }

    vec![SqlToken::eof(1, 0)]
}

fn map_tokens(sql: &str, raw: &[TokenWithSpan]) -> Result<Vec<SqlToken>, LexError> {
    let mut tokens = Vec::with_capacity(raw.len() + 1);
    let mut end = (1u32, 0u32);

    for tws in raw {
        if matches!(tws.token, Token::EOF) {
            continue;
        }
        let (kind, channel) = map_token(&tws.token);
        let start = tws.span.start;
        let text = slice_span(sql, tws).ok_or(LexError::PositionOutOfBounds {
            line: start.line,
            column: start.column,
        })?;
        let token = SqlToken {
            kind,
            text,
            line: start.line as u32,
            column: start.column.saturating_sub(1) as u32,
            channel,
        };
        end = token.end_position();
        tokens.push(token);
    }

    tokens.push(SqlToken::eof(end.0, end.1));
    Ok(tokens)
}

/// Recovers the raw token text from the source. Display round-trips are not
/// exact for every token (escapes, comments), slicing the input is.
fn slice_span(sql: &str, tws: &TokenWithSpan) -> Option<String> {
    let start = line_col_to_offset(sql, tws.span.start.line, tws.span.start.column)?;
    let end = line_col_to_offset(sql, tws.span.end.line, tws.span.end.column)?;
    sql.get(start..end).map(str::to_string)
}

/// Maps a 1-based (line, column) pair to a byte offset. Columns count
/// characters, matching the tokenizer's span bookkeeping.
fn line_col_to_offset(sql: &str, line: u64, column: u64) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }
    let mut current_line = 1u64;
    let mut line_start = 0usize;
    if line > 1 {
        let mut found = false;
        for (idx, b) in sql.bytes().enumerate() {
            if b == b'\n' {
                current_line += 1;
                if current_line == line {
                    line_start = idx + 1;
                    found = true;
                    break;
                }
            }
        }
        if !found {
            return None;
        }
    }

    let rest = &sql[line_start..];
    let mut chars_seen = 0u64;
    for (idx, _) in rest.char_indices() {
        chars_seen += 1;
        if chars_seen == column {
            return Some(line_start + idx);
        }
    }
    // One past the final character is a valid end position.
    if chars_seen + 1 == column {
        return Some(sql.len());
    }
    None
}

fn map_token(token: &Token) -> (TokenKind, TokenChannel) {
    let kind = match token {
        Token::Word(word) => {
            if word.quote_style.is_some() {
                TokenKind::QuotedIdentifier
            } else if word.value.starts_with("@@") {
                TokenKind::SystemVariableWord
            } else if word.value.starts_with('@') {
                TokenKind::UserVariableWord
            } else if word.keyword == Keyword::NoKeyword {
                TokenKind::Identifier
            } else {
                TokenKind::Keyword(word.keyword)
            }
        }
        Token::Number(..) => TokenKind::Number,
        Token::HexStringLiteral(_) => TokenKind::HexNumber,
        Token::SingleQuotedString(_) => TokenKind::SingleQuotedText,
        Token::DoubleQuotedString(_) => TokenKind::DoubleQuotedText,
        Token::NationalStringLiteral(_) => TokenKind::NationalText,
        Token::Comma => TokenKind::Comma,
        Token::Period => TokenKind::Dot,
        Token::SemiColon => TokenKind::Semicolon,
        Token::Colon => TokenKind::Colon,
        Token::LParen => TokenKind::OpenParen,
        Token::RParen => TokenKind::CloseParen,
        Token::LBrace => TokenKind::OpenCurly,
        Token::RBrace => TokenKind::CloseCurly,
        Token::Mul => TokenKind::Star,
        Token::Eq => TokenKind::Equal,
        Token::Spaceship => TokenKind::NullSafeEqual,
        Token::Neq => TokenKind::NotEqual,
        Token::Lt => TokenKind::Less,
        Token::Gt => TokenKind::Greater,
        Token::LtEq => TokenKind::LessOrEqual,
        Token::GtEq => TokenKind::GreaterOrEqual,
        Token::Plus => TokenKind::Plus,
        Token::Minus => TokenKind::Minus,
        Token::Div => TokenKind::Div,
        Token::Mod => TokenKind::Mod,
        Token::StringConcat => TokenKind::ConcatPipes,
        Token::Ampersand => TokenKind::BitwiseAnd,
        Token::Pipe => TokenKind::BitwiseOr,
        Token::Caret => TokenKind::BitwiseXor,
        Token::ShiftLeft => TokenKind::ShiftLeft,
        Token::ShiftRight => TokenKind::ShiftRight,
        Token::ExclamationMark => TokenKind::LogicalNot,
        Token::Tilde => TokenKind::BitwiseNot,
        Token::AtSign => TokenKind::AtSign,
        Token::Placeholder(_) => TokenKind::ParamMarker,
        Token::Whitespace(_) => return (TokenKind::Other, TokenChannel::Hidden),
        _ => TokenKind::Other,
    };
    (kind, TokenChannel::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        tokenize(sql)
            .into_iter()
            .filter(|t| t.channel == TokenChannel::Default)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        let kinds = kinds("SELECT a FROM t1");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::SELECT),
                TokenKind::Identifier,
                TokenKind::Keyword(Keyword::FROM),
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn positions_are_one_based_lines_zero_based_columns() {
        let tokens = tokenize("SELECT\n  a");
        let ident = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Identifier)
            .unwrap();
        assert_eq!((ident.line, ident.column), (2, 2));
        assert_eq!(ident.text, "a");
    }

    #[test]
    fn backticks_and_variables() {
        let kinds = kinds("SELECT `my col`, @user, @@global_var");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::SELECT),
                TokenKind::QuotedIdentifier,
                TokenKind::Comma,
                TokenKind::UserVariableWord,
                TokenKind::Comma,
                TokenKind::SystemVariableWord,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn star_is_its_own_kind() {
        let kinds = kinds("SELECT * FROM t");
        assert!(kinds.contains(&TokenKind::Star));
    }

    #[test]
    fn unclosed_string_still_tokenizes() {
        let tokens = tokenize("SELECT 'oops");
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Keyword(Keyword::SELECT)));
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn hidden_channel_carries_whitespace() {
        let tokens = tokenize("SELECT a");
        assert!(tokens.iter().any(|t| t.channel == TokenChannel::Hidden));
    }

    #[test]
    fn eof_token_sits_past_the_input() {
        let tokens = tokenize("USE db");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.line, eof.column), (1, 6));
    }
}
