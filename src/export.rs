use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use thiserror::Error;

use crate::types::GoalEntry;

pub const CSV_HEADERS: [&str; 7] = [
    "Date",
    "Sensei Name",
    "Ninja Name",
    "Current Project",
    "Description",
    "Goal 1",
    "Goal 2",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render entries as CSV: a bare header line, then one row per entry with
/// every field wrapped in double quotes. No trailing newline.
pub fn to_csv(entries: &[GoalEntry], include_koin: bool) -> Result<String, ExportError> {
    let mut out = CSV_HEADERS.join(",");
    if include_koin {
        out.push_str(",Koin");
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for entry in entries {
        let koin = entry.koin.to_string();
        let mut record = vec![
            entry.date.as_str(),
            entry.sensei_name.as_str(),
            entry.ninja_name.as_str(),
            entry.current_project.as_str(),
            entry.description.as_str(),
            entry.goal1.as_str(),
            entry.goal2.as_str(),
        ];
        if include_koin {
            record.push(koin.as_str());
        }
        writer.write_record(record)?;
    }
    let rows = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    let rows = String::from_utf8(rows)?;

    if let Some(rows) = rows.strip_suffix('\n') {
        out.push('\n');
        out.push_str(rows);
    }
    Ok(out)
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("goal-entries-{}.csv", date.format("%Y-%m-%d"))
}

/// One-line summary suitable for pasting into a chat or report.
pub fn summary_line(entry: &GoalEntry) -> String {
    format!(
        "{}, {}, {}, {}, Goal 1: {}, Goal 2: {}",
        entry.date,
        entry.sensei_name,
        entry.ninja_name,
        entry.current_project,
        entry.goal1,
        entry.goal2
    )
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntryStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

impl EntryStats {
    pub fn from_entries(entries: &[GoalEntry]) -> Self {
        let in_progress = entries.iter().filter(|e| e.is_in_progress()).count();
        Self {
            total: entries.len(),
            completed: entries.len() - in_progress,
            in_progress,
        }
    }
}
