//! Output formatting helpers for human-readable and JSON output.

use filefly::{AccountRecord, account::AccountSummary};

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", format_line(headers.to_vec()).trim_end());
    for row in rows {
        let cells = row.iter().take(col_count).map(String::as_str).collect();
        println!("{}", format_line(cells).trim_end());
    }
}

/// Table row for an account: username, identity, role, created, last login.
pub fn account_row(record: &AccountRecord) -> Vec<String> {
    vec![
        record.username.clone(),
        record.identity.to_string(),
        if record.is_administrator { "admin" } else { "user" }.to_string(),
        record.created_at.to_rfc3339(),
        record
            .last_login_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string()),
    ]
}

pub const ACCOUNT_HEADERS: [&str; 5] = ["USERNAME", "IDENTITY", "ROLE", "CREATED", "LAST LOGIN"];

/// JSON rendering of an account, without its password hash.
pub fn account_json(record: &AccountRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(&AccountSummary::from(record))
}
