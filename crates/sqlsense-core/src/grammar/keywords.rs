//! Keyword candidate tables.
//!
//! Grouped by the grammar context they are legal in. Follow sequences are
//! attached where the grammar allows only one continuation (`GROUP BY`,
//! `FOR EACH ROW`), which is what turns into multi-word proposals.

use crate::types::{Keyword, TokenKind};

use super::CandidatesCollection;

pub(crate) fn kw(keyword: Keyword) -> TokenKind {
    TokenKind::Keyword(keyword)
}

pub(crate) fn add_keywords(out: &mut CandidatesCollection, keywords: &[Keyword]) {
    for &keyword in keywords {
        out.add_token(kw(keyword), Vec::new());
    }
}

pub(crate) fn add_sequence(out: &mut CandidatesCollection, head: Keyword, follow: &[Keyword]) {
    out.add_token(kw(head), follow.iter().map(|&k| kw(k)).collect());
}

/// Words that may begin a statement.
pub(crate) const STATEMENT_START: &[Keyword] = &[
    Keyword::SELECT,
    Keyword::INSERT,
    Keyword::UPDATE,
    Keyword::DELETE,
    Keyword::REPLACE,
    Keyword::CREATE,
    Keyword::DROP,
    Keyword::ALTER,
    Keyword::SHOW,
    Keyword::USE,
    Keyword::CALL,
    Keyword::SET,
    Keyword::EXPLAIN,
    Keyword::DESCRIBE,
    Keyword::TRUNCATE,
    Keyword::BEGIN,
    Keyword::COMMIT,
    Keyword::ROLLBACK,
    Keyword::LOCK,
    Keyword::UNLOCK,
    Keyword::GRANT,
    Keyword::WITH,
];

/// Legal right after SELECT, before the first select item.
pub(crate) const SELECT_MODIFIERS: &[Keyword] = &[Keyword::ALL, Keyword::DISTINCT];

/// Words that can open an expression.
pub(crate) const EXPRESSION_START: &[Keyword] = &[
    Keyword::CASE,
    Keyword::NOT,
    Keyword::EXISTS,
    Keyword::TRUE,
    Keyword::FALSE,
    Keyword::NULL,
    Keyword::INTERVAL,
    Keyword::BINARY,
];

/// Words that can extend a complete expression.
pub(crate) const EXPRESSION_CONTINUATION: &[Keyword] = &[
    Keyword::AND,
    Keyword::OR,
    Keyword::XOR,
    Keyword::IS,
    Keyword::IN,
    Keyword::LIKE,
    Keyword::REGEXP,
    Keyword::BETWEEN,
];

/// Clause transitions once the select list holds a complete item.
pub(crate) const SELECT_LIST_CONTINUATION: &[Keyword] = &[
    Keyword::FROM,
    Keyword::AS,
    Keyword::LIMIT,
    Keyword::UNION,
];

/// Clause transitions after a complete table reference.
pub(crate) const TABLE_LIST_CONTINUATION: &[Keyword] = &[
    Keyword::WHERE,
    Keyword::HAVING,
    Keyword::LIMIT,
    Keyword::JOIN,
    Keyword::INNER,
    Keyword::LEFT,
    Keyword::RIGHT,
    Keyword::CROSS,
    Keyword::NATURAL,
    Keyword::UNION,
    Keyword::AS,
    Keyword::ON,
    Keyword::USING,
];

pub(crate) const WHERE_CONTINUATION: &[Keyword] =
    &[Keyword::HAVING, Keyword::LIMIT, Keyword::UNION];

pub(crate) const GROUP_BY_CONTINUATION: &[Keyword] =
    &[Keyword::HAVING, Keyword::LIMIT, Keyword::UNION, Keyword::WITH];

pub(crate) const ORDER_BY_CONTINUATION: &[Keyword] = &[
    Keyword::ASC,
    Keyword::DESC,
    Keyword::LIMIT,
    Keyword::UNION,
];

pub(crate) const JOIN_CONDITION_CONTINUATION: &[Keyword] = &[
    Keyword::WHERE,
    Keyword::JOIN,
    Keyword::INNER,
    Keyword::LEFT,
    Keyword::RIGHT,
    Keyword::CROSS,
    Keyword::NATURAL,
    Keyword::LIMIT,
    Keyword::UNION,
];

/// Column data types offered inside a definition list.
pub(crate) const COLUMN_TYPES: &[Keyword] = &[
    Keyword::INT,
    Keyword::INTEGER,
    Keyword::BIGINT,
    Keyword::SMALLINT,
    Keyword::TINYINT,
    Keyword::DECIMAL,
    Keyword::FLOAT,
    Keyword::DOUBLE,
    Keyword::VARCHAR,
    Keyword::CHAR,
    Keyword::TEXT,
    Keyword::BLOB,
    Keyword::DATE,
    Keyword::DATETIME,
    Keyword::TIMESTAMP,
    Keyword::TIME,
    Keyword::JSON,
    Keyword::BOOLEAN,
];

/// Column attributes after a data type.
pub(crate) const COLUMN_ATTRIBUTES: &[Keyword] = &[
    Keyword::NOT,
    Keyword::NULL,
    Keyword::DEFAULT,
    Keyword::PRIMARY,
    Keyword::KEY,
    Keyword::UNIQUE,
    Keyword::REFERENCES,
];

/// Statements allowed as a trigger body.
pub(crate) const TRIGGER_BODY_START: &[Keyword] = &[
    Keyword::BEGIN,
    Keyword::SELECT,
    Keyword::INSERT,
    Keyword::UPDATE,
    Keyword::DELETE,
    Keyword::SET,
    Keyword::IF,
    Keyword::CALL,
];

/// Alterations offered after `ALTER TABLE name`.
pub(crate) const ALTER_TABLE_ACTIONS: &[Keyword] = &[
    Keyword::ADD,
    Keyword::DROP,
    Keyword::MODIFY,
    Keyword::RENAME,
    Keyword::ENGINE,
    Keyword::DEFAULT,
    Keyword::CONVERT,
];
