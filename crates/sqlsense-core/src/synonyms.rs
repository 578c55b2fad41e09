//! Alternate keyword spellings accepted by the MySQL grammar.
//!
//! The lexer folds each synonym onto its canonical token, so completion
//! emits the canonical spelling only. The table is kept for surface
//! rendering, mirroring the server's accepted spellings; nothing here is
//! auto-added to proposal lists.

/// Synonym spellings for a canonical keyword, empty when there are none.
pub fn keyword_synonyms(canonical: &str) -> &'static [&'static str] {
    match canonical.to_ascii_uppercase().as_str() {
        "CHAR" => &["CHARACTER"],
        "NOW" => &["CURRENT_TIMESTAMP", "LOCALTIME", "LOCALTIMESTAMP"],
        "DAY" => &["DAYOFMONTH", "SQL_TSI_DAY"],
        "DECIMAL" => &["DEC"],
        "DISTINCT" => &["DISTINCTROW"],
        "COLUMNS" => &["FIELDS"],
        "FLOAT" => &["FLOAT4"],
        "DOUBLE" => &["FLOAT8"],
        "INT" => &["INTEGER", "INT4"],
        "RELAY_THREAD" => &["IO_THREAD"],
        "SUBSTRING" => &["MID", "SUBSTR"],
        "MID" => &["MEDIUMINT"],
        "MEDIUMINT" => &["MIDDLEINT", "INT3"],
        "NDBCLUSTER" => &["NDB"],
        "REGEXP" => &["RLIKE"],
        "DATABASE" => &["SCHEMA"],
        "DATABASES" => &["SCHEMAS"],
        "USER" => &["SESSION_USER"],
        "STD" => &["STDDEV"],
        "VARCHAR" => &["VARCHARACTER"],
        "VARIANCE" => &["VAR_POP"],
        "TINYINT" => &["INT1"],
        "SMALLINT" => &["INT2"],
        "BIGINT" => &["INT8"],
        "FRAC_SECOND" => &["SQL_TSI_FRAC_SECOND"],
        "SECOND" => &["SQL_TSI_SECOND"],
        "MINUTE" => &["SQL_TSI_MINUTE"],
        "HOUR" => &["SQL_TSI_HOUR"],
        "WEEK" => &["SQL_TSI_WEEK"],
        "MONTH" => &["SQL_TSI_MONTH"],
        "QUARTER" => &["SQL_TSI_QUARTER"],
        "YEAR" => &["SQL_TSI_YEAR"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_lookup_is_case_insensitive() {
        assert_eq!(
            keyword_synonyms("now"),
            ["CURRENT_TIMESTAMP", "LOCALTIME", "LOCALTIMESTAMP"]
        );
        assert_eq!(keyword_synonyms("Database"), ["SCHEMA"]);
        assert!(keyword_synonyms("SELECT").is_empty());
    }

    #[test]
    fn interval_units_map_to_their_odbc_spellings() {
        for (unit, synonym) in [
            ("SECOND", "SQL_TSI_SECOND"),
            ("MINUTE", "SQL_TSI_MINUTE"),
            ("HOUR", "SQL_TSI_HOUR"),
            ("WEEK", "SQL_TSI_WEEK"),
            ("MONTH", "SQL_TSI_MONTH"),
            ("QUARTER", "SQL_TSI_QUARTER"),
            ("YEAR", "SQL_TSI_YEAR"),
        ] {
            assert!(keyword_synonyms(unit).contains(&synonym));
        }
    }
}
