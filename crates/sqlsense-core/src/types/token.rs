//! Token model shared by the scanner, the candidate collector and the
//! completion driver.
//!
//! The lexing adapter maps every raw `sqlparser` token into one of these
//! kinds. Keyword tokens keep the `sqlparser` keyword id; everything the
//! grammar treats as punctuation gets its own kind so the collector
//! configuration can name it precisely.

pub use sqlparser::keywords::Keyword;

/// Channel a token lives on. Only channel zero participates in matching;
/// whitespace and comments are parked on the hidden channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenChannel {
    Default,
    Hidden,
}

/// Lexical kind of a token.
///
/// `Star` is deliberately separate from the arithmetic operators: the
/// select-list wildcard must survive the operator filter applied to
/// candidate tokens, while `a * b` style multiplication is still ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A reserved or non-reserved word recognized by the MySQL dialect.
    Keyword(Keyword),
    /// Operator-precedence spelling of `NOT`. Remapped to the canonical
    /// keyword during candidate post-processing.
    Not2,
    /// Plain identifier.
    Identifier,
    /// Backtick-quoted identifier.
    QuotedIdentifier,
    /// `@name` user variable word.
    UserVariableWord,
    /// `@@name` system variable word.
    SystemVariableWord,
    SingleQuotedText,
    DoubleQuotedText,
    NationalText,
    HexNumber,
    Number,
    Dot,
    Comma,
    Semicolon,
    Colon,
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    /// `*`, the select-list wildcard.
    Star,
    Equal,
    NullSafeEqual,
    NotEqual,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Plus,
    Minus,
    Div,
    Mod,
    LogicalNot,
    BitwiseNot,
    ShiftLeft,
    ShiftRight,
    LogicalAnd,
    BitwiseAnd,
    BitwiseXor,
    LogicalOr,
    BitwiseOr,
    ConcatPipes,
    AtSign,
    ParamMarker,
    /// Anything the dialect produces that the grammar has no use for.
    Other,
    Eof,
}

impl TokenKind {
    /// Grammar-style display name, as a vocabulary would render it.
    /// Keywords carry the conventional `_SYMBOL` suffix; punctuation is
    /// rendered in single quotes so callers can unquote it.
    pub fn display_name(self) -> String {
        match self {
            TokenKind::Keyword(k) => format!("{k:?}_SYMBOL"),
            TokenKind::Not2 => "NOT2_SYMBOL".to_string(),
            TokenKind::Identifier => "IDENTIFIER".to_string(),
            TokenKind::QuotedIdentifier => "BACK_TICK_QUOTED_ID".to_string(),
            TokenKind::UserVariableWord => "AT_TEXT_SUFFIX".to_string(),
            TokenKind::SystemVariableWord => "AT_AT_SIGN_SYMBOL".to_string(),
            TokenKind::SingleQuotedText => "SINGLE_QUOTED_TEXT".to_string(),
            TokenKind::DoubleQuotedText => "DOUBLE_QUOTED_TEXT".to_string(),
            TokenKind::NationalText => "NCHAR_TEXT".to_string(),
            TokenKind::HexNumber => "HEX_NUMBER".to_string(),
            TokenKind::Number => "INT_NUMBER".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::OpenParen => "'('".to_string(),
            TokenKind::CloseParen => "')'".to_string(),
            TokenKind::OpenCurly => "'{'".to_string(),
            TokenKind::CloseCurly => "'}'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Equal => "'='".to_string(),
            TokenKind::NullSafeEqual => "'<=>'".to_string(),
            TokenKind::NotEqual => "'!='".to_string(),
            TokenKind::Less => "'<'".to_string(),
            TokenKind::Greater => "'>'".to_string(),
            TokenKind::LessOrEqual => "'<='".to_string(),
            TokenKind::GreaterOrEqual => "'>='".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Div => "'/'".to_string(),
            TokenKind::Mod => "'%'".to_string(),
            TokenKind::LogicalNot => "'!'".to_string(),
            TokenKind::BitwiseNot => "'~'".to_string(),
            TokenKind::ShiftLeft => "'<<'".to_string(),
            TokenKind::ShiftRight => "'>>'".to_string(),
            TokenKind::LogicalAnd => "'&&'".to_string(),
            TokenKind::BitwiseAnd => "'&'".to_string(),
            TokenKind::BitwiseXor => "'^'".to_string(),
            TokenKind::LogicalOr => "'||'".to_string(),
            TokenKind::BitwiseOr => "'|'".to_string(),
            TokenKind::ConcatPipes => "CONCAT_PIPES_SYMBOL".to_string(),
            TokenKind::AtSign => "'@'".to_string(),
            TokenKind::ParamMarker => "'?'".to_string(),
            TokenKind::Other => "OTHER".to_string(),
            TokenKind::Eof => "EOF".to_string(),
        }
    }

    /// True for the operator and punctuation kinds. These are both ignored
    /// in candidate output and exempt from the whitespace-separator rule.
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Dot
                | TokenKind::Comma
                | TokenKind::Semicolon
                | TokenKind::Colon
                | TokenKind::OpenParen
                | TokenKind::CloseParen
                | TokenKind::OpenCurly
                | TokenKind::CloseCurly
                | TokenKind::Equal
                | TokenKind::NullSafeEqual
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessOrEqual
                | TokenKind::GreaterOrEqual
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Div
                | TokenKind::Mod
                | TokenKind::LogicalNot
                | TokenKind::BitwiseNot
                | TokenKind::ShiftLeft
                | TokenKind::ShiftRight
                | TokenKind::LogicalAnd
                | TokenKind::BitwiseAnd
                | TokenKind::BitwiseXor
                | TokenKind::LogicalOr
                | TokenKind::BitwiseOr
                | TokenKind::ConcatPipes
                | TokenKind::AtSign
                | TokenKind::ParamMarker
        )
    }
}

/// A single lexed token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlToken {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first character.
    pub line: u32,
    /// 0-based byte column of the first character within its line.
    pub column: u32,
    pub channel: TokenChannel,
}

impl SqlToken {
    pub fn eof(line: u32, column: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            text: String::new(),
            line,
            column,
            channel: TokenChannel::Default,
        }
    }

    /// Position of the first character past this token. Columns count
    /// characters; multi-line tokens (block comments, strings with
    /// embedded newlines) are accounted for.
    pub fn end_position(&self) -> (u32, u32) {
        let mut line = self.line;
        let mut column = self.column;
        for ch in self.text.chars() {
            if ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

/// Strips surrounding backticks or quote characters and collapses doubled
/// quote characters inside the identifier.
pub fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return String::new(),
    };
    if !matches!(first, '`' | '\'' | '"') || !text.ends_with(first) || text.len() < 2 {
        return text.to_string();
    }
    let inner = &text[first.len_utf8()..text.len() - first.len_utf8()];
    let doubled: String = [first, first].iter().collect();
    inner.replace(&doubled, &first.to_string())
}

/// MySQL reserved words. Keywords outside this list may be used as
/// identifiers without quoting, which matters for qualifier resolution
/// (`new.`, `old.`, half-typed names shadowing keywords).
static RESERVED_WORDS: &[&str] = &[
    "ACCESSIBLE", "ADD", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC",
    "ASENSITIVE", "BEFORE", "BETWEEN", "BIGINT", "BINARY", "BLOB", "BOTH",
    "BY", "CALL", "CASCADE", "CASE", "CHANGE", "CHAR", "CHARACTER", "CHECK",
    "COLLATE", "COLUMN", "CONDITION", "CONSTRAINT", "CONTINUE", "CONVERT",
    "CREATE", "CROSS", "CUBE", "CUME_DIST", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR", "DATABASE", "DATABASES",
    "DAY_HOUR", "DAY_MICROSECOND", "DAY_MINUTE", "DAY_SECOND", "DEC",
    "DECIMAL", "DECLARE", "DEFAULT", "DELAYED", "DELETE", "DENSE_RANK",
    "DESC", "DESCRIBE", "DETERMINISTIC", "DISTINCT", "DISTINCTROW", "DIV",
    "DOUBLE", "DROP", "DUAL", "EACH", "ELSE", "ELSEIF", "EMPTY", "ENCLOSED",
    "ESCAPED", "EXCEPT", "EXISTS", "EXIT", "EXPLAIN", "FALSE", "FETCH",
    "FIRST_VALUE", "FLOAT", "FLOAT4", "FLOAT8", "FOR", "FORCE", "FOREIGN",
    "FROM", "FULLTEXT", "FUNCTION", "GENERATED", "GET", "GRANT", "GROUP",
    "GROUPING", "GROUPS", "HAVING", "HIGH_PRIORITY", "HOUR_MICROSECOND",
    "HOUR_MINUTE", "HOUR_SECOND", "IF", "IGNORE", "IN", "INDEX", "INFILE",
    "INNER", "INOUT", "INSENSITIVE", "INSERT", "INT", "INT1", "INT2", "INT3",
    "INT4", "INT8", "INTEGER", "INTERVAL", "INTO", "IO_AFTER_GTIDS",
    "IO_BEFORE_GTIDS", "IS", "ITERATE", "JOIN", "JSON_TABLE", "KEY", "KEYS",
    "KILL", "LAG", "LAST_VALUE", "LATERAL", "LEAD", "LEADING", "LEAVE",
    "LEFT", "LIKE", "LIMIT", "LINEAR", "LINES", "LOAD", "LOCALTIME",
    "LOCALTIMESTAMP", "LOCK", "LONG", "LONGBLOB", "LONGTEXT", "LOOP",
    "LOW_PRIORITY", "MASTER_BIND", "MASTER_SSL_VERIFY_SERVER_CERT", "MATCH",
    "MAXVALUE", "MEDIUMBLOB", "MEDIUMINT", "MEDIUMTEXT", "MIDDLEINT",
    "MINUTE_MICROSECOND", "MINUTE_SECOND", "MOD", "MODIFIES", "NATURAL",
    "NOT", "NO_WRITE_TO_BINLOG", "NTH_VALUE", "NTILE", "NULL", "NUMERIC",
    "OF", "ON", "OPTIMIZE", "OPTIMIZER_COSTS", "OPTION", "OPTIONALLY", "OR",
    "ORDER", "OUT", "OUTER", "OUTFILE", "OVER", "PARTITION", "PERCENT_RANK",
    "PRECISION", "PRIMARY", "PROCEDURE", "PURGE", "RANGE", "RANK", "READ",
    "READS", "READ_WRITE", "REAL", "RECURSIVE", "REFERENCES", "REGEXP",
    "RELEASE", "RENAME", "REPEAT", "REPLACE", "REQUIRE", "RESIGNAL",
    "RESTRICT", "RETURN", "REVOKE", "RIGHT", "RLIKE", "ROW", "ROWS",
    "ROW_NUMBER", "SCHEMA", "SCHEMAS", "SECOND_MICROSECOND", "SELECT",
    "SENSITIVE", "SEPARATOR", "SET", "SHOW", "SIGNAL", "SMALLINT", "SPATIAL",
    "SPECIFIC", "SQL", "SQLEXCEPTION", "SQLSTATE", "SQLWARNING",
    "SQL_BIG_RESULT", "SQL_CALC_FOUND_ROWS", "SQL_SMALL_RESULT", "SSL",
    "STARTING", "STORED", "STRAIGHT_JOIN", "SYSTEM", "TABLE", "TERMINATED",
    "THEN", "TINYBLOB", "TINYINT", "TINYTEXT", "TO", "TRAILING", "TRIGGER",
    "TRUE", "UNDO", "UNION", "UNIQUE", "UNLOCK", "UNSIGNED", "UPDATE",
    "USAGE", "USE", "USING", "UTC_DATE", "UTC_TIME", "UTC_TIMESTAMP",
    "VALUES", "VARBINARY", "VARCHAR", "VARCHARACTER", "VARYING", "VIRTUAL",
    "WHEN", "WHERE", "WHILE", "WINDOW", "WITH", "WRITE", "XOR",
    "YEAR_MONTH", "ZEROFILL",
];

fn is_reserved_word(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    RESERVED_WORDS.binary_search(&upper.as_str()).is_ok()
}

/// True when a token of this kind can serve as (part of) an object name.
/// Quoted identifiers always can; bare words can unless reserved.
pub fn is_identifier(kind: TokenKind, text: &str) -> bool {
    match kind {
        TokenKind::Identifier | TokenKind::QuotedIdentifier => true,
        TokenKind::Keyword(_) => !is_reserved_word(text),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_table_is_sorted() {
        for pair in RESERVED_WORDS.windows(2) {
            assert!(pair[0] < pair[1], "{} >= {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn unquote_strips_backticks() {
        assert_eq!(unquote("`my table`"), "my table");
        assert_eq!(unquote("`a``b`"), "a`b");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("'text'"), "text");
        assert_eq!(unquote("`"), "`");
        assert_eq!(unquote(""), "");
    }

    #[test]
    fn keywords_can_be_identifiers_unless_reserved() {
        assert!(is_identifier(TokenKind::Identifier, "t1"));
        assert!(is_identifier(TokenKind::QuotedIdentifier, "`select`"));
        assert!(is_identifier(TokenKind::Keyword(Keyword::YEAR), "year"));
        assert!(!is_identifier(TokenKind::Keyword(Keyword::FROM), "from"));
        assert!(!is_identifier(TokenKind::Keyword(Keyword::SELECT), "select"));
        assert!(!is_identifier(TokenKind::Dot, "."));
    }

    #[test]
    fn display_names_follow_grammar_convention() {
        assert_eq!(
            TokenKind::Keyword(Keyword::SELECT).display_name(),
            "SELECT_SYMBOL"
        );
        assert_eq!(TokenKind::Star.display_name(), "'*'");
        assert_eq!(TokenKind::Not2.display_name(), "NOT2_SYMBOL");
    }

    #[test]
    fn end_position_tracks_newlines() {
        let token = SqlToken {
            kind: TokenKind::Other,
            text: "/* a\nb */".to_string(),
            line: 3,
            column: 4,
            channel: TokenChannel::Hidden,
        };
        assert_eq!(token.end_position(), (4, 4));
    }
}
