//! Categorical labels for the raw numbers the analysis service returns.
//!
//! Everything here is pure. The single-result panel, the history rows and the
//! CLI all call these functions so a given number always reads the same way.

use crate::types::INTONATION_MAX;

/// Note spacing consistency, bucketed by coefficient of variation (percent).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Evenness {
    VeryEven,
    Even,
    Moderate,
    Uneven,
}

impl Evenness {
    /// Closed-open buckets: [0,3) [3,5) [5,10) [10,inf).
    pub fn from_cv(cv: f64) -> Self {
        if cv < 3.0 {
            Evenness::VeryEven
        } else if cv < 5.0 {
            Evenness::Even
        } else if cv < 10.0 {
            Evenness::Moderate
        } else {
            // NaN lands here too, same as a very uneven run
            Evenness::Uneven
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Evenness::VeryEven => "very even",
            Evenness::Even => "even",
            Evenness::Moderate => "moderate",
            Evenness::Uneven => "uneven",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Evenness::VeryEven => "Very even \u{2014} excellent control",
            Evenness::Even => "Even \u{2014} solid consistency",
            Evenness::Moderate => "Moderate \u{2014} some unevenness",
            Evenness::Uneven => "Uneven \u{2014} focus on steady rhythm",
        }
    }

    /// CSS class for history rows, e.g. `cv-very-even`.
    pub fn css_class(self) -> &'static str {
        match self {
            Evenness::VeryEven => "cv-very-even",
            Evenness::Even => "cv-even",
            Evenness::Moderate => "cv-moderate",
            Evenness::Uneven => "cv-uneven",
        }
    }
}

pub fn evenness_label(cv: f64) -> &'static str {
    Evenness::from_cv(cv).label()
}

/// Tempo drift within a single run of the scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TempoTrend {
    Steady,
    SpeedingUp,
    SlowingDown,
}

impl TempoTrend {
    /// Drift below this many BPM per block counts as steady.
    pub const DEADBAND: f64 = 0.5;

    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() < Self::DEADBAND {
            TempoTrend::Steady
        } else if slope > 0.0 {
            TempoTrend::SpeedingUp
        } else {
            TempoTrend::SlowingDown
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TempoTrend::Steady => "steady",
            TempoTrend::SpeedingUp => "speeding up",
            TempoTrend::SlowingDown => "slowing down",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TempoTrend::Steady => "Steady tempo throughout",
            TempoTrend::SpeedingUp => "Speeding up through the scale",
            TempoTrend::SlowingDown => "Slowing down through the scale",
        }
    }
}

pub fn tempo_trend_description(slope: f64) -> &'static str {
    TempoTrend::from_slope(slope).description()
}

/// Direction of a metric's regression across sessions.
///
/// Uses its own deadband, unrelated to [`TempoTrend::DEADBAND`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrendDirection {
    Improving,
    Declining,
    Flat,
}

impl TrendDirection {
    pub const DEADBAND: f64 = 0.01;

    /// `None` when the service could not fit a slope.
    pub fn from_slope(slope: Option<f64>) -> Option<Self> {
        let slope = slope?;
        Some(if slope > Self::DEADBAND {
            TrendDirection::Improving
        } else if slope < -Self::DEADBAND {
            TrendDirection::Declining
        } else {
            TrendDirection::Flat
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Flat => "flat",
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            TrendDirection::Improving => "\u{2191}",
            TrendDirection::Declining => "\u{2193}",
            TrendDirection::Flat => "\u{2192}",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            TrendDirection::Improving => "trend trend-up",
            TrendDirection::Declining => "trend trend-down",
            TrendDirection::Flat => "trend trend-flat",
        }
    }
}

pub fn trend_direction(slope: Option<f64>) -> Option<TrendDirection> {
    TrendDirection::from_slope(slope)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Significance {
    Significant,
    NotYetSignificant,
}

impl Significance {
    pub const ALPHA: f64 = 0.05;

    pub fn from_p(p: Option<f64>) -> Self {
        match p {
            Some(p) if p < Self::ALPHA => Significance::Significant,
            _ => Significance::NotYetSignificant,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Significance::Significant => "statistically significant",
            Significance::NotYetSignificant => "not yet significant",
        }
    }
}

pub fn significance(p: Option<f64>) -> &'static str {
    Significance::from_p(p).label()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreColor {
    Success,
    Warning,
    Alert,
}

impl ScoreColor {
    /// Lowest non-perfect intonation score still shown as a warning rather
    /// than an alert. Fixed to the 7-point scale; not rescaled with `max`.
    pub const WARNING_FLOOR: u8 = 5;

    pub fn for_score(score: u8, max: u8) -> Self {
        if score == max {
            ScoreColor::Success
        } else if score >= Self::WARNING_FLOOR {
            ScoreColor::Warning
        } else {
            ScoreColor::Alert
        }
    }

    pub fn for_intonation(score: u8) -> Self {
        Self::for_score(score, INTONATION_MAX)
    }

    pub fn hex(self) -> &'static str {
        match self {
            ScoreColor::Success => "#34d399",
            ScoreColor::Warning => "#fbbf24",
            ScoreColor::Alert => "#f87171",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScoreColor::Success => "success",
            ScoreColor::Warning => "warning",
            ScoreColor::Alert => "alert",
        }
    }
}

pub fn score_color(score: u8, max: u8) -> ScoreColor {
    ScoreColor::for_score(score, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evenness_buckets_are_closed_open() {
        for cv in [0.0, 1.2, 2.999] {
            assert_eq!(evenness_label(cv), "very even", "cv={cv}");
        }
        assert_eq!(evenness_label(3.0), "even");
        assert_eq!(evenness_label(4.99), "even");
        assert_eq!(evenness_label(5.0), "moderate");
        assert_eq!(evenness_label(9.99), "moderate");
        assert_eq!(evenness_label(10.0), "uneven");
        assert_eq!(evenness_label(42.0), "uneven");
    }

    #[test]
    fn test_evenness_description_matches_label_bucket() {
        for cv in [0.5, 3.5, 7.0, 12.0] {
            let bucket = Evenness::from_cv(cv);
            let desc = bucket.description().to_lowercase();
            assert!(desc.starts_with(bucket.label()), "{desc} vs {}", bucket.label());
        }
        assert_eq!(Evenness::from_cv(2.0).css_class(), "cv-very-even");
    }

    #[test]
    fn test_tempo_trend_deadband() {
        assert_eq!(TempoTrend::from_slope(0.2), TempoTrend::Steady);
        assert_eq!(TempoTrend::from_slope(-0.49), TempoTrend::Steady);
        assert_eq!(TempoTrend::from_slope(0.5), TempoTrend::SpeedingUp);
        assert_eq!(TempoTrend::from_slope(-0.5), TempoTrend::SlowingDown);
        assert_eq!(tempo_trend_description(0.2), "Steady tempo throughout");
        assert_eq!(tempo_trend_description(3.0), "Speeding up through the scale");
    }

    #[test]
    fn test_trend_direction() {
        assert_eq!(trend_direction(None), None);
        assert_eq!(trend_direction(Some(0.0)), Some(TrendDirection::Flat));
        assert_eq!(trend_direction(Some(0.009)), Some(TrendDirection::Flat));
        assert_eq!(trend_direction(Some(-0.009)), Some(TrendDirection::Flat));
        assert_eq!(trend_direction(Some(0.02)), Some(TrendDirection::Improving));
        assert_eq!(trend_direction(Some(-0.02)), Some(TrendDirection::Declining));
    }

    #[test]
    fn test_trend_and_tempo_deadbands_stay_distinct() {
        // 0.2 is steady for tempo drift but improving as a session trend
        assert_eq!(TempoTrend::from_slope(0.2), TempoTrend::Steady);
        assert_eq!(trend_direction(Some(0.2)), Some(TrendDirection::Improving));
    }

    #[test]
    fn test_significance() {
        assert_eq!(significance(Some(0.049)), "statistically significant");
        assert_eq!(significance(Some(0.05)), "not yet significant");
        assert_eq!(significance(None), "not yet significant");
    }

    #[test]
    fn test_score_color() {
        assert_eq!(ScoreColor::for_intonation(7), ScoreColor::Success);
        assert_eq!(ScoreColor::for_intonation(6), ScoreColor::Warning);
        assert_eq!(ScoreColor::for_intonation(5), ScoreColor::Warning);
        assert_eq!(ScoreColor::for_intonation(4), ScoreColor::Alert);
        assert_eq!(ScoreColor::for_intonation(0), ScoreColor::Alert);
    }

    #[test]
    fn test_score_color_floor_does_not_rescale() {
        assert_eq!(score_color(10, 10), ScoreColor::Success);
        assert_eq!(score_color(5, 10), ScoreColor::Warning);
        assert_eq!(score_color(4, 10), ScoreColor::Alert);
    }
}
