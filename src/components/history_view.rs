use leptos::prelude::*;
use tracker_lib::format::{history_rows, HistoryRow};
use crate::components::app::ErrorBanner;
use crate::state::AppState;

#[component]
pub fn HistoryView() -> impl IntoView {
    let state = expect_context::<AppState>();
    let tracker = state.tracker;

    let rows = move || tracker.with(|t| history_rows(t.history()));
    let has_records = move || tracker.with(|t| !t.history().is_empty());
    let clearing = move || tracker.with(|t| t.is_clearing());

    view! {
        <div class="history-view fade-in">
            <div class="history-header">
                <h2>"Practice History"</h2>
                {move || has_records().then(|| view! {
                    <button
                        class="clear-btn"
                        disabled=clearing
                        on:click=move |_| state.clear_history()
                    >
                        {move || if clearing() { "Clearing\u{2026}" } else { "Clear All" }}
                    </button>
                })}
            </div>

            <ErrorBanner />

            {move || {
                let rows = rows();
                if rows.is_empty() {
                    view! {
                        <div class="empty-state">
                            <span class="empty-icon">{"\u{1D11E}"}</span>
                            <p>"No recordings yet. Go record a scale!"</p>
                        </div>
                    }.into_any()
                } else {
                    view! {
                        <div class="history-list">
                            <div class="history-row history-row-header">
                                <span>"Date"</span>
                                <span>"Scale"</span>
                                <span>"Intonation"</span>
                                <span>"Evenness"</span>
                                <span>"Tempo"</span>
                            </div>
                            {rows.into_iter().map(|row| view! { <HistoryRowView row=row /> }).collect::<Vec<_>>()}
                        </div>
                    }.into_any()
                }
            }}
        </div>
    }
}

#[component]
fn HistoryRowView(row: HistoryRow) -> impl IntoView {
    let cv_class = row.evenness_class();
    let cv_label = row.evenness_label();

    view! {
        <div class="history-row" data-id=row.id.to_string()>
            <span class="history-date">{row.date}</span>
            <span class="history-scale">{row.scale}</span>
            <span class="history-intonation">{row.intonation}</span>
            <span class=cv_class>{cv_label}</span>
            <span class="history-tempo">{row.tempo}</span>
        </div>
    }
}
