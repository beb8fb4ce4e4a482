use crate::Reactions::summary::ReactionSummary;
use crate::error::ReactionIssue;
use prettytable::{Cell, Row, Table};
use std::collections::BTreeMap;

/// number of exportable reactions per fingerprint
pub fn fingerprint_counts(summaries: &[ReactionSummary]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for summary in summaries.iter().filter(|s| !s.is_skipped()) {
        *counts.entry(summary.fingerprint.to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn fingerprint_table(summaries: &[ReactionSummary]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("fingerprint (o%i%s%a)"),
        Cell::new("reactions"),
    ]));
    for (fingerprint, count) in fingerprint_counts(summaries) {
        table.add_row(Row::new(vec![
            Cell::new(&fingerprint),
            Cell::new(&count.to_string()),
        ]));
    }
    table
}

pub fn issue_table(issues: &[ReactionIssue]) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("severity"),
        Cell::new("reaction"),
        Cell::new("dispense"),
        Cell::new("chemical"),
        Cell::new("problem"),
    ]));
    for issue in issues {
        table.add_row(Row::new(vec![
            Cell::new(issue.severity.as_str()),
            Cell::new(&issue.reaction_id),
            Cell::new(
                &issue
                    .dispense_index
                    .map(|i| i.to_string())
                    .unwrap_or_default(),
            ),
            Cell::new(issue.chemical.as_deref().unwrap_or("")),
            Cell::new(&issue.error.to_string()),
        ]));
    }
    table
}
