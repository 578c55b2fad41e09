//! Proposal rendering for the terminal.

use sqlsense_core::{ProposalEntry, ProposalKind};

fn kind_label(kind: ProposalKind) -> &'static str {
    match kind {
        ProposalKind::Keyword => "keyword",
        ProposalKind::Schema => "schema",
        ProposalKind::Table => "table",
        ProposalKind::View => "view",
        ProposalKind::Column => "column",
        ProposalKind::Routine => "routine",
        ProposalKind::Function => "function",
        ProposalKind::Trigger => "trigger",
        ProposalKind::Event => "event",
        ProposalKind::Engine => "engine",
        ProposalKind::LogfileGroup => "logfile group",
        ProposalKind::Tablespace => "tablespace",
        ProposalKind::Charset => "charset",
        ProposalKind::Collation => "collation",
        ProposalKind::SystemVar => "system variable",
        ProposalKind::UserVar => "user variable",
    }
}

/// Two-column listing, kind first, aligned on the widest kind label.
pub fn format_table(proposals: &[ProposalEntry]) -> String {
    let width = proposals
        .iter()
        .map(|p| kind_label(p.kind).len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for proposal in proposals {
        out.push_str(&format!(
            "{:<width$}  {}\n",
            kind_label(proposal.kind),
            proposal.label,
        ));
    }
    out
}

pub fn format_json(proposals: &[ProposalEntry]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(proposals)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_output_aligns_kinds() {
        let proposals = vec![
            ProposalEntry::new(ProposalKind::Keyword, "select"),
            ProposalEntry::new(ProposalKind::SystemVar, "sql_mode"),
        ];
        let rendered = format_table(&proposals);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("keyword"));
        assert!(lines[0].contains("  select"));
        assert!(lines[1].starts_with("system variable  sql_mode"));
    }

    #[test]
    fn json_output_is_a_list_of_entries() {
        let proposals = vec![ProposalEntry::new(ProposalKind::Table, "t1")];
        let rendered = format_json(&proposals).unwrap();
        assert!(rendered.contains("\"table\""));
        assert!(rendered.contains("\"t1\""));
    }
}
