use leptos::prelude::*;
use tracker_lib::classify::{ScoreColor, TrendDirection};
use tracker_lib::format;
use tracker_lib::INTONATION_MAX;

/// Stroke geometry of the score ring: (radius, circumference, dash offset).
pub fn ring_geometry(score: u8, max: u8, size: f64) -> (f64, f64, f64) {
    let radius = (size - 12.0) / 2.0;
    let circumference = 2.0 * std::f64::consts::PI * radius;
    let fraction = if max == 0 { 0.0 } else { (score.min(max) as f64) / max as f64 };
    (radius, circumference, circumference * (1.0 - fraction))
}

#[component]
pub fn ScoreRing(
    score: u8,
    #[prop(default = INTONATION_MAX)] max: u8,
    #[prop(default = 120.0)] size: f64,
) -> impl IntoView {
    let (radius, circumference, offset) = ring_geometry(score, max, size);
    let color = ScoreColor::for_score(score, max);
    let c = size / 2.0;
    let (center, r) = (c.to_string(), radius.to_string());

    view! {
        <svg width={size.to_string()} height={size.to_string()} class={format!("score-ring score-{}", color.name())}>
            <circle
                cx=center.clone()
                cy=center.clone()
                r=r.clone()
                fill="none"
                stroke="rgba(255,255,255,0.06)"
                stroke-width="6"
            />
            <circle
                cx=center.clone()
                cy=center.clone()
                r=r.clone()
                fill="none"
                stroke={color.hex()}
                stroke-width="6"
                stroke-dasharray={circumference.to_string()}
                stroke-dashoffset={offset.to_string()}
                stroke-linecap="round"
                transform={format!("rotate(-90 {c} {c})")}
                class="ring-progress"
            />
            <text x=center.clone() y={(c - 6.0).to_string()} text-anchor="middle" dominant-baseline="central" class="ring-score">
                {format::score(score, max)}
            </text>
            <text x=center.clone() y={(c + 16.0).to_string()} text-anchor="middle" dominant-baseline="central" class="ring-label">
                "intonation"
            </text>
        </svg>
    }
}

#[component]
pub fn StatCard(
    label: &'static str,
    value: f64,
    unit: &'static str,
    #[prop(optional)] description: Option<&'static str>,
) -> impl IntoView {
    view! {
        <div class="stat-card">
            <span class="stat-label">{label}</span>
            <span class="stat-value">
                {format::stat_value(value)}
                <span class="stat-unit">{unit}</span>
            </span>
            {description.map(|d| view! { <span class="stat-desc">{d}</span> })}
        </div>
    }
}

/// Nothing is rendered when the slope is absent.
#[component]
pub fn TrendArrow(slope: Option<f64>) -> impl IntoView {
    TrendDirection::from_slope(slope).map(|dir| view! {
        <span class={dir.css_class()} title={dir.label()}>{dir.arrow()}</span>
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_geometry_full_and_empty() {
        let (radius, circumference, offset) = ring_geometry(7, 7, 120.0);
        assert_eq!(radius, 54.0);
        assert!(offset.abs() < 1e-9);

        let (_, _, empty) = ring_geometry(0, 7, 120.0);
        assert!((empty - circumference).abs() < 1e-9);
    }

    #[test]
    fn test_ring_geometry_clamps_out_of_range_score() {
        let (_, _, offset) = ring_geometry(9, 7, 120.0);
        assert!(offset.abs() < 1e-9);
        let (_, _, zero_max) = ring_geometry(3, 0, 120.0);
        assert!(zero_max > 0.0);
    }
}
