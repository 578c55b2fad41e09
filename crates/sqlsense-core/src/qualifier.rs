//! Qualifier resolution for partially typed dotted identifiers.
//!
//! Both resolvers look only at what sits before the caret token. The user's
//! intention past the caret is unknown, so the engine never derives context
//! from unconsumed input; proposals must stay consistent with what has
//! already been typed.

use std::ops::{BitOr, BitOrAssign};

use crate::scanner::TokenScanner;
use crate::types::{unquote, TokenChannel, TokenKind};

/// What a resolved qualifier allows the driver to offer.
///
/// `SHOW_FIRST`/`SHOW_SECOND` apply to the generic two-segment form,
/// `SHOW_SCHEMAS`/`SHOW_TABLES`/`SHOW_COLUMNS` to the three-segment column
/// form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectFlags(u8);

impl ObjectFlags {
    pub const SHOW_SCHEMAS: ObjectFlags = ObjectFlags(1 << 0);
    pub const SHOW_TABLES: ObjectFlags = ObjectFlags(1 << 1);
    pub const SHOW_COLUMNS: ObjectFlags = ObjectFlags(1 << 2);
    pub const SHOW_FIRST: ObjectFlags = ObjectFlags(1 << 3);
    pub const SHOW_SECOND: ObjectFlags = ObjectFlags(1 << 4);

    pub fn contains(self, other: ObjectFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ObjectFlags {
    type Output = ObjectFlags;

    fn bitor(self, rhs: ObjectFlags) -> ObjectFlags {
        ObjectFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ObjectFlags {
    fn bitor_assign(&mut self, rhs: ObjectFlags) {
        self.0 |= rhs.0;
    }
}

/// Resolves a qualified identifier with up to two parts (`id` or `id.id`).
///
/// Returns the flags saying which segment the caret is editing and, for
/// `SHOW_SECOND`, the already-typed leading qualifier. The caret can sit in
/// the first id, on the dot, right after the dot, or in the second id; the
/// on-dot position counts as part of the first id.
pub fn simple_qualifier(scanner: &mut TokenScanner<'_>) -> (ObjectFlags, String) {
    let position = scanner.token_index();

    if scanner.token_channel() != TokenChannel::Default {
        scanner.next(true);
    }

    if !scanner.is(TokenKind::Dot) && !scanner.on_identifier() {
        // Past the end of an incomplete identifier; step back so the walk
        // below starts on the written part.
        scanner.previous(true);
    }

    // Go left until something unrelated to an id turns up, crossing at
    // most one dot.
    if position > 0 {
        if scanner.on_identifier() && scanner.look_back() == Some(TokenKind::Dot) {
            scanner.previous(true);
        }
        if scanner.is(TokenKind::Dot) && scanner.look_back_is_identifier() {
            scanner.previous(true);
        }
    }

    // The scanner now sits on the leading identifier, or on the dot when
    // there is none.
    let mut temp = String::new();
    if scanner.on_identifier() {
        temp = unquote(scanner.token_text());
        scanner.next(true);
    }

    // No further id parts, or already past the caret position.
    if !scanner.is(TokenKind::Dot) || position <= scanner.token_index() {
        return (
            ObjectFlags::SHOW_FIRST | ObjectFlags::SHOW_SECOND,
            String::new(),
        );
    }

    (ObjectFlags::SHOW_SECOND, temp)
}

/// Resolves schema and table qualifiers for column references (and the
/// wildcard form used by multi table delete), covering up to three parts.
///
/// One consumed segment cannot be told apart from a table or a schema
/// qualifier yet; the segment is then stored in both `schema` and `table`
/// and the driver also admits the default schema.
pub fn schema_table_qualifier(scanner: &mut TokenScanner<'_>) -> (ObjectFlags, String, String) {
    let position = scanner.token_index();

    if scanner.token_channel() != TokenChannel::Default {
        scanner.next(true);
    }

    if !scanner.is(TokenKind::Dot) && !scanner.on_identifier() {
        scanner.previous(true);
    }

    // Go left across at most two dots.
    if position > 0 {
        if scanner.on_identifier() && scanner.look_back() == Some(TokenKind::Dot) {
            scanner.previous(true);
        }
        if scanner.is(TokenKind::Dot) && scanner.look_back_is_identifier() {
            scanner.previous(true);

            // And once more.
            if scanner.look_back() == Some(TokenKind::Dot) {
                scanner.previous(true);
                if scanner.look_back_is_identifier() {
                    scanner.previous(true);
                }
            }
        }
    }

    let mut temp = String::new();
    if scanner.on_identifier() {
        temp = unquote(scanner.token_text());
        scanner.next(true);
    }

    if !scanner.is(TokenKind::Dot) || position <= scanner.token_index() {
        return (
            ObjectFlags::SHOW_SCHEMAS | ObjectFlags::SHOW_TABLES | ObjectFlags::SHOW_COLUMNS,
            String::new(),
            String::new(),
        );
    }

    scanner.next(true); // Skip the dot.
    let schema = temp.clone();
    let mut table = temp;

    if scanner.on_identifier() {
        temp = unquote(scanner.token_text());
        scanner.next(true);

        if !scanner.is(TokenKind::Dot) || position <= scanner.token_index() {
            // The schema qualifier only holds for tables; columns fall
            // back to the default schema.
            return (
                ObjectFlags::SHOW_TABLES | ObjectFlags::SHOW_COLUMNS,
                schema,
                table,
            );
        }

        table = temp;
        return (ObjectFlags::SHOW_COLUMNS, schema, table);
    }

    (
        ObjectFlags::SHOW_TABLES | ObjectFlags::SHOW_COLUMNS,
        schema,
        table,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    /// Builds a scanner positioned at the `|` marker in `sql`.
    fn scanner_at_marker(sql: &str) -> (Vec<crate::types::SqlToken>, u32, u32) {
        let offset = sql.find('|').expect("marker");
        let clean: String = sql.replacen('|', "", 1);
        let before = &clean[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map(|tail| tail.chars().count() as u32)
            .unwrap_or(0);
        (tokenize(&clean), line, column)
    }

    fn simple(sql: &str) -> (ObjectFlags, String) {
        let (tokens, line, column) = scanner_at_marker(sql);
        let mut scanner = TokenScanner::new(&tokens);
        scanner.advance_to_position(line, column);
        simple_qualifier(&mut scanner)
    }

    fn schema_table(sql: &str) -> (ObjectFlags, String, String) {
        let (tokens, line, column) = scanner_at_marker(sql);
        let mut scanner = TokenScanner::new(&tokens);
        scanner.advance_to_position(line, column);
        schema_table_qualifier(&mut scanner)
    }

    #[test]
    fn simple_nothing_typed() {
        let (flags, qualifier) = simple("SELECT x FROM |");
        assert!(flags.contains(ObjectFlags::SHOW_FIRST));
        assert!(flags.contains(ObjectFlags::SHOW_SECOND));
        assert_eq!(qualifier, "");
    }

    #[test]
    fn simple_caret_in_first_segment() {
        let (flags, qualifier) = simple("SELECT x FROM d|b1");
        assert!(flags.contains(ObjectFlags::SHOW_FIRST));
        assert!(flags.contains(ObjectFlags::SHOW_SECOND));
        assert_eq!(qualifier, "");
    }

    #[test]
    fn simple_after_dot() {
        let (flags, qualifier) = simple("DROP VIEW db1.|");
        assert_eq!(flags, ObjectFlags::SHOW_SECOND);
        assert_eq!(qualifier, "db1");
    }

    #[test]
    fn simple_in_second_segment() {
        let (flags, qualifier) = simple("DROP VIEW db1.v|1");
        assert_eq!(flags, ObjectFlags::SHOW_SECOND);
        assert_eq!(qualifier, "db1");
    }

    #[test]
    fn simple_unquotes_the_qualifier() {
        let (_, qualifier) = simple("DROP VIEW `my db`.|");
        assert_eq!(qualifier, "my db");
    }

    #[test]
    fn schema_table_nothing_typed() {
        let (flags, schema, table) = schema_table("SELECT |");
        assert!(flags.contains(ObjectFlags::SHOW_SCHEMAS));
        assert!(flags.contains(ObjectFlags::SHOW_TABLES));
        assert!(flags.contains(ObjectFlags::SHOW_COLUMNS));
        assert_eq!((schema.as_str(), table.as_str()), ("", ""));
    }

    #[test]
    fn schema_table_one_segment_is_ambiguous() {
        let (flags, schema, table) = schema_table("SELECT a.| FROM t1 AS a");
        assert!(!flags.contains(ObjectFlags::SHOW_SCHEMAS));
        assert!(flags.contains(ObjectFlags::SHOW_TABLES));
        assert!(flags.contains(ObjectFlags::SHOW_COLUMNS));
        assert_eq!(schema, "a");
        assert_eq!(table, "a");
    }

    #[test]
    fn schema_table_two_segments() {
        let (flags, schema, table) = schema_table("SELECT db.t1.| FROM t1");
        assert_eq!(flags, ObjectFlags::SHOW_COLUMNS);
        assert_eq!(schema, "db");
        assert_eq!(table, "t1");
    }

    #[test]
    fn schema_table_caret_inside_second_segment() {
        let (flags, schema, table) = schema_table("SELECT db.t|x FROM t1");
        assert!(flags.contains(ObjectFlags::SHOW_TABLES));
        assert!(flags.contains(ObjectFlags::SHOW_COLUMNS));
        assert!(!flags.contains(ObjectFlags::SHOW_SCHEMAS));
        assert_eq!(schema, "db");
        assert_eq!(table, "db");
    }

    #[test]
    fn resolvers_never_look_past_the_caret() {
        // Identical prefixes with different suffixes resolve identically.
        let a = schema_table("SELECT a.| FROM t1 AS a");
        let b = schema_table("SELECT a.|zzz FROM unrelated");
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
        assert_eq!(a.2, b.2);
    }
}
