use std::fmt::Write;

use tracker_lib::classify::{Evenness, ScoreColor, Significance, TempoTrend, TrendDirection};
use tracker_lib::format::{self, history_rows};
use tracker_lib::{AnalysisResult, HistoryRecord, Scale, TrendSet, INTONATION_MAX};

pub fn scales() -> String {
    let mut out = String::new();
    for scale in Scale::ALL {
        let _ = writeln!(out, "{:10} {}", scale.name(), scale.notes().join(" "));
    }
    out
}

pub fn result(result: &AnalysisResult) -> String {
    let a = &result.analytics;
    let color = ScoreColor::for_intonation(a.intonation);
    let mut out = String::new();
    let _ = writeln!(out, "Session #{}", result.id);
    let _ = writeln!(
        out,
        "  Intonation         {} ({})",
        format::score(a.intonation, INTONATION_MAX),
        color.name()
    );
    let _ = writeln!(
        out,
        "  Evenness           {} cv  {}",
        format::stat_value(a.cv_evenness),
        Evenness::from_cv(a.cv_evenness).description()
    );
    let _ = writeln!(out, "  Mean Tempo         {} bpm", format::stat_value(a.mean_tempo));
    let _ = writeln!(
        out,
        "  Tempo Drift        {} slope  {}",
        format::stat_value(a.tempo_slope),
        TempoTrend::from_slope(a.tempo_slope).description()
    );
    let _ = writeln!(out, "  Tempo Consistency  {} r", format::stat_value(a.tempo_r));
    out
}

/// Most recent first, same cells as the web History view.
pub fn history(records: &[HistoryRecord]) -> String {
    if records.is_empty() {
        return "No recordings yet. Go record a scale!\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:8} {:10} {:10} {:10} {}",
        "#", "Date", "Scale", "Intonation", "Evenness", "Tempo"
    );
    for row in history_rows(records) {
        let _ = writeln!(
            out,
            "{:>5}  {:8} {:10} {:10} {:10} {}",
            row.id,
            row.date,
            row.scale,
            row.intonation,
            row.evenness_label(),
            row.tempo
        );
    }
    out
}

pub fn trends(trends: &TrendSet) -> String {
    match trends {
        TrendSet::Insufficient(message) => format!("{message}\n"),
        TrendSet::Fields(fields) => {
            let mut out = String::new();
            for field in fields {
                let s = &field.stats;
                let arrow = TrendDirection::from_slope(s.slope).map(|d| d.arrow()).unwrap_or(" ");
                let _ = writeln!(
                    out,
                    "{arrow} {:14} slope {:>7}  r {:>7}  p {:>7}  {}",
                    field.display_name(),
                    format::trend_value(s.slope),
                    format::trend_value(s.r),
                    format::trend_value(s.p),
                    Significance::from_p(s.p).label()
                );
            }
            out
        }
    }
}
