use leptos::prelude::*;
use tracker_lib::classify::Significance;
use tracker_lib::format::trend_value;
use tracker_lib::{TrendField, TrendSet};
use crate::components::app::ErrorBanner;
use crate::components::widgets::TrendArrow;
use crate::state::AppState;

#[component]
pub fn TrendsView() -> impl IntoView {
    let state = expect_context::<AppState>();
    let trends = move || state.tracker.with(|t| t.trends().cloned());

    view! {
        <div class="trends-view fade-in">
            <h2>"Trends"</h2>

            <ErrorBanner />

            {move || match trends() {
                Some(TrendSet::Insufficient(message)) => view! {
                    <div class="empty-state">
                        <span class="empty-icon">{"\u{1F4CA}"}</span>
                        <p>{message}</p>
                    </div>
                }.into_any(),
                Some(TrendSet::Fields(fields)) => view! {
                    <div class="trends-grid">
                        {fields.into_iter().map(|field| view! { <TrendCard field=field /> }).collect::<Vec<_>>()}
                    </div>
                }.into_any(),
                None => view! {
                    <div class="empty-state">
                        <span class="spinner" />
                    </div>
                }.into_any(),
            }}
        </div>
    }
}

#[component]
fn TrendCard(field: TrendField) -> impl IntoView {
    let stats = field.stats;
    let name = field.display_name();

    view! {
        <div class="trend-card">
            <div class="trend-card-header">
                <span class="trend-field">{name}</span>
                <TrendArrow slope=stats.slope />
            </div>
            <div class="trend-stats">
                <TrendStat label="slope" value=stats.slope />
                <TrendStat label="r" value=stats.r />
                <TrendStat label="p" value=stats.p />
            </div>
            <div class="trend-sig">{Significance::from_p(stats.p).label()}</div>
        </div>
    }
}

#[component]
fn TrendStat(label: &'static str, value: Option<f64>) -> impl IntoView {
    view! {
        <div class="trend-stat">
            <span class="trend-stat-label">{label}</span>
            <span class="trend-stat-value">{trend_value(value)}</span>
        </div>
    }
}
