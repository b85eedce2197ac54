use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Highest possible intonation score (one point per scale step).
pub const INTONATION_MAX: u8 = 7;

/// A major scale the analysis service knows how to grade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scale {
    #[default]
    #[serde(rename = "C major")]
    C,
    #[serde(rename = "G major")]
    G,
    #[serde(rename = "D major")]
    D,
    #[serde(rename = "A major")]
    A,
    #[serde(rename = "E major")]
    E,
    #[serde(rename = "B major")]
    B,
    #[serde(rename = "F# major")]
    FSharp,
    #[serde(rename = "C# major")]
    CSharp,
    #[serde(rename = "F major")]
    F,
    #[serde(rename = "Bb major")]
    BFlat,
    #[serde(rename = "Eb major")]
    EFlat,
    #[serde(rename = "Ab major")]
    AFlat,
    #[serde(rename = "Db major")]
    DFlat,
    #[serde(rename = "Gb major")]
    GFlat,
    #[serde(rename = "Cb major")]
    CFlat,
}

impl Scale {
    /// All scales in circle-of-fifths order (sharps first, then flats).
    pub const ALL: [Scale; 15] = [
        Scale::C,
        Scale::G,
        Scale::D,
        Scale::A,
        Scale::E,
        Scale::B,
        Scale::FSharp,
        Scale::CSharp,
        Scale::F,
        Scale::BFlat,
        Scale::EFlat,
        Scale::AFlat,
        Scale::DFlat,
        Scale::GFlat,
        Scale::CFlat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scale::C => "C major",
            Scale::G => "G major",
            Scale::D => "D major",
            Scale::A => "A major",
            Scale::E => "E major",
            Scale::B => "B major",
            Scale::FSharp => "F# major",
            Scale::CSharp => "C# major",
            Scale::F => "F major",
            Scale::BFlat => "Bb major",
            Scale::EFlat => "Eb major",
            Scale::AFlat => "Ab major",
            Scale::DFlat => "Db major",
            Scale::GFlat => "Gb major",
            Scale::CFlat => "Cb major",
        }
    }

    pub fn tonic(self) -> &'static str {
        self.notes()[0]
    }

    /// One octave of the scale, tonic to tonic.
    pub fn notes(self) -> [&'static str; 8] {
        match self {
            Scale::C => ["C", "D", "E", "F", "G", "A", "B", "C"],
            Scale::G => ["G", "A", "B", "C", "D", "E", "F#", "G"],
            Scale::D => ["D", "E", "F#", "G", "A", "B", "C#", "D"],
            Scale::A => ["A", "B", "C#", "D", "E", "F#", "G#", "A"],
            Scale::E => ["E", "F#", "G#", "A", "B", "C#", "D#", "E"],
            Scale::B => ["B", "C#", "D#", "E", "F#", "G#", "A#", "B"],
            Scale::FSharp => ["F#", "G#", "A#", "B", "C#", "D#", "E#", "F#"],
            Scale::CSharp => ["C#", "D#", "E#", "F#", "G#", "A#", "B#", "C#"],
            Scale::F => ["F", "G", "A", "Bb", "C", "D", "E", "F"],
            Scale::BFlat => ["Bb", "C", "D", "Eb", "F", "G", "A", "Bb"],
            Scale::EFlat => ["Eb", "F", "G", "Ab", "Bb", "C", "D", "Eb"],
            Scale::AFlat => ["Ab", "Bb", "C", "Db", "Eb", "F", "G", "Ab"],
            Scale::DFlat => ["Db", "Eb", "F", "Gb", "Ab", "Bb", "C", "Db"],
            Scale::GFlat => ["Gb", "Ab", "Bb", "Cb", "Db", "Eb", "F", "Gb"],
            Scale::CFlat => ["Cb", "Db", "Eb", "Fb", "Gb", "Ab", "Bb", "Cb"],
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = String;

    /// Accepts "G major", "g major" or just the tonic ("G", "F#", "bb").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let tonic = s
            .strip_suffix("major")
            .or_else(|| s.strip_suffix("MAJOR"))
            .or_else(|| s.strip_suffix("Major"))
            .map(str::trim_end)
            .unwrap_or(s);

        Scale::ALL
            .into_iter()
            .find(|scale| scale.tonic().eq_ignore_ascii_case(tonic))
            .ok_or_else(|| format!("Unknown scale: {s}"))
    }
}

/// A recording picked by the user, ready to be sent for analysis.
#[derive(Clone, PartialEq)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Metrics computed by the analysis service for one recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    /// Correct notes out of [`INTONATION_MAX`]
    pub intonation: u8,
    /// Coefficient of variation of note spacing, in percent
    pub cv_evenness: f64,
    /// Beats per minute
    pub mean_tempo: f64,
    /// BPM change per block of four notes
    pub tempo_slope: f64,
    /// Correlation of the tempo regression
    pub tempo_r: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: u64,
    pub analytics: Analytics,
}

/// One stored practice session as returned by the history endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u64,
    /// Server timestamp, kept verbatim; see [`HistoryRecord::timestamp`].
    #[serde(default)]
    pub date: String,
    /// Scale name as the service stored it. Usually one of [`Scale::ALL`],
    /// but older rows may hold anything the client sent.
    pub scale: String,
    #[serde(default)]
    pub intonation: Option<u8>,
    #[serde(default)]
    pub cv_evenness: Option<f64>,
    #[serde(default)]
    pub mean_tempo: Option<f64>,
    #[serde(default)]
    pub tempo_slope: Option<f64>,
    #[serde(default)]
    pub tempo_r: Option<f64>,
}

impl HistoryRecord {
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.date)
    }

    /// The stored scale, if it names one we know.
    pub fn known_scale(&self) -> Option<Scale> {
        self.scale.parse().ok()
    }
}

/// Parse the timestamp formats the service has been seen to emit.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Regression summary of one metric across all stored sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    #[serde(default)]
    pub slope: Option<f64>,
    #[serde(default)]
    pub r: Option<f64>,
    #[serde(default)]
    pub p: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrendField {
    pub name: String,
    pub stats: TrendStats,
}

impl TrendField {
    /// "cv_evenness" -> "cv evenness"
    pub fn display_name(&self) -> String {
        self.name.replace('_', " ")
    }
}

/// Body of the trends endpoints.
///
/// The service answers either with a map of metric name to stats, or with
/// `{"error": "..."}` when too few sessions exist to fit a trend.
#[derive(Clone, Debug, PartialEq)]
pub enum TrendSet {
    Fields(Vec<TrendField>),
    Insufficient(String),
}

impl TrendSet {
    pub fn fields(&self) -> &[TrendField] {
        match self {
            TrendSet::Fields(fields) => fields,
            TrendSet::Insufficient(_) => &[],
        }
    }

    pub fn insufficient_message(&self) -> Option<&str> {
        match self {
            TrendSet::Insufficient(msg) => Some(msg),
            TrendSet::Fields(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for TrendSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TrendSetVisitor)
    }
}

struct TrendSetVisitor;

impl<'de> Visitor<'de> for TrendSetVisitor {
    type Value = TrendSet;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of metric trends or an {\"error\": ...} object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TrendSet, A::Error> {
        let mut fields = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            if key == "error" {
                let value: serde_json::Value = map.next_value()?;
                let message = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                // Drain anything else so the deserializer is left consistent.
                while map.next_entry::<serde::de::IgnoredAny, serde::de::IgnoredAny>()?.is_some() {}
                return Ok(TrendSet::Insufficient(message));
            }
            let stats: Option<TrendStats> = map.next_value()?;
            fields.push(TrendField {
                name: key,
                stats: stats.unwrap_or_default(),
            });
        }
        Ok(TrendSet::Fields(fields))
    }
}

impl Serialize for TrendSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match self {
            TrendSet::Insufficient(msg) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", msg)?;
                map.end()
            }
            TrendSet::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for field in fields {
                    map.serialize_entry(&field.name, &field.stats)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_names_round_trip_through_from_str() {
        for scale in Scale::ALL {
            assert_eq!(scale.name().parse::<Scale>(), Ok(scale));
        }
        assert_eq!("f#".parse::<Scale>(), Ok(Scale::FSharp));
        assert_eq!("bb major".parse::<Scale>(), Ok(Scale::BFlat));
        assert!("H major".parse::<Scale>().is_err());
    }

    #[test]
    fn test_scale_serializes_as_display_name() {
        let json = serde_json::to_string(&Scale::CFlat).unwrap();
        assert_eq!(json, "\"Cb major\"");
        let back: Scale = serde_json::from_str("\"Db major\"").unwrap();
        assert_eq!(back, Scale::DFlat);
    }

    #[test]
    fn test_scale_notes_start_and_end_on_tonic() {
        for scale in Scale::ALL {
            let notes = scale.notes();
            assert_eq!(notes[0], notes[7], "{scale}");
            assert!(scale.name().starts_with(notes[0]));
        }
    }

    #[test]
    fn test_analysis_result_parses_service_body() {
        let body = r#"{"id": 12, "analytics": {"intonation": 7, "cv_evenness": 1.2,
            "mean_tempo": 110.4, "tempo_slope": 0.2, "tempo_r": 0.91}}"#;
        let result: AnalysisResult = serde_json::from_str(body).unwrap();
        assert_eq!(result.id, 12);
        assert_eq!(result.analytics.intonation, 7);
        assert_eq!(result.analytics.mean_tempo, 110.4);
    }

    #[test]
    fn test_history_record_tolerates_nulls() {
        let body = r#"[{"id": 1, "date": "2025-03-04 09:15:02.123456", "scale": "G major",
            "intonation": null, "cv_evenness": 2.0, "mean_tempo": 96.0,
            "tempo_slope": null, "tempo_r": 0.5}]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(records[0].intonation, None);
        assert_eq!(records[0].known_scale(), Some(Scale::G));
        let ts = records[0].timestamp().unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2025-03-04 09:15");
    }

    #[test]
    fn test_history_keeps_rows_with_unlisted_scale() {
        let body = r#"[{"id": 1, "date": "2025-03-04T09:00:00", "scale": "G major", "intonation": 6},
            {"id": 2, "date": "2025-03-05T09:00:00", "scale": "g minor", "intonation": 4}]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].scale, "g minor");
        assert_eq!(records[1].known_scale(), None);
        assert_eq!(records[1].intonation, Some(4));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-03-04T09:15:02").is_some());
        assert!(parse_timestamp("2025-03-04T09:15:02.5+01:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_trend_set_preserves_field_order() {
        let body = r#"{"mean_tempo": {"slope": 0.4, "r": 0.7, "p": 0.01},
            "intonation": {"slope": null, "r": null, "p": null},
            "cv_evenness": {"slope": -0.2, "r": -0.3, "p": 0.2}}"#;
        let trends: TrendSet = serde_json::from_str(body).unwrap();
        let names: Vec<_> = trends.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["mean_tempo", "intonation", "cv_evenness"]);
        assert_eq!(trends.fields()[1].stats, TrendStats::default());
        assert_eq!(trends.fields()[0].stats.p, Some(0.01));
    }

    #[test]
    fn test_trend_set_error_body_is_insufficient() {
        let trends: TrendSet = serde_json::from_str(r#"{"error": "not enough sessions"}"#).unwrap();
        assert_eq!(trends.insufficient_message(), Some("not enough sessions"));
        assert!(trends.fields().is_empty());
    }

    #[test]
    fn test_trend_field_display_name() {
        let field = TrendField { name: "cv_evenness".into(), stats: TrendStats::default() };
        assert_eq!(field.display_name(), "cv evenness");
    }
}
