//! Text formatting shared by the web views and the CLI.

use crate::classify::Evenness;
use crate::types::{parse_timestamp, HistoryRecord, INTONATION_MAX};

/// Placeholder for a value the service did not provide.
pub const MISSING: &str = "\u{2014}";

/// Stat card value: one decimal place.
pub fn stat_value(value: f64) -> String {
    format!("{value:.1}")
}

/// Slope / r / p in a trend card: three decimals, or a dash when absent.
pub fn trend_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.3}"),
        _ => MISSING.to_string(),
    }
}

pub fn score(score: u8, max: u8) -> String {
    format!("{score}/{max}")
}

/// Short month and day, e.g. "Mar 4". Unparseable dates are shown verbatim.
pub fn short_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(ts) => ts.format("%b %-d").to_string(),
        None => raw.to_string(),
    }
}

/// Display cells of one history row, in column order.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    pub id: u64,
    pub date: String,
    pub scale: String,
    pub intonation: String,
    pub evenness: Option<Evenness>,
    pub tempo: String,
}

impl HistoryRow {
    pub fn from_record(record: &HistoryRecord) -> Self {
        Self {
            id: record.id,
            date: short_date(&record.date),
            scale: match record.known_scale() {
                Some(scale) => scale.name().to_string(),
                None => record.scale.trim().to_string(),
            },
            intonation: record
                .intonation
                .map(|n| score(n, INTONATION_MAX))
                .unwrap_or_else(|| MISSING.to_string()),
            evenness: record.cv_evenness.map(Evenness::from_cv),
            tempo: match record.mean_tempo {
                Some(bpm) if bpm.is_finite() => format!("{bpm:.0} bpm"),
                _ => MISSING.to_string(),
            },
        }
    }

    pub fn evenness_label(&self) -> &'static str {
        self.evenness.map(Evenness::label).unwrap_or(MISSING)
    }

    pub fn evenness_class(&self) -> String {
        match self.evenness {
            Some(e) => format!("history-cv {}", e.css_class()),
            None => "history-cv".to_string(),
        }
    }
}

/// Rows most recent first, leaving the stored order untouched.
pub fn history_rows(records: &[HistoryRecord]) -> Vec<HistoryRow> {
    records.iter().rev().map(HistoryRow::from_record).collect()
}
