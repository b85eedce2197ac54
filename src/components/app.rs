use leptos::prelude::*;
use tracker_lib::View;
use crate::state::AppState;
use crate::components::history_view::HistoryView;
use crate::components::record_view::RecordView;
use crate::components::trends_view::TrendsView;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(state);

    view! {
        <div class="app">
            <div class="grain-overlay" />
            <Header />
            <MainArea />
            <footer class="footer">
                <span>"Scale Tracker \u{2014} practice with intention"</span>
            </footer>
        </div>
    }
}

#[component]
fn Header() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <header class="header">
            <div class="logo">
                <span class="logo-icon">{"\u{2669}"}</span>
                <h1>"Scale Tracker"</h1>
            </div>
            <nav class="nav">
                {View::ALL.into_iter().map(|v| {
                    view! {
                        <button
                            class=move || if state.view() == v { "nav-btn nav-active" } else { "nav-btn" }
                            on:click=move |_| state.set_view(v)
                        >
                            {v.label()}
                        </button>
                    }
                }).collect::<Vec<_>>()}
            </nav>
        </header>
    }
}

#[component]
fn MainArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <main class="main">
            {move || match state.view() {
                View::Record => view! { <RecordView /> }.into_any(),
                View::History => view! { <HistoryView /> }.into_any(),
                View::Trends => view! { <TrendsView /> }.into_any(),
            }}
        </main>
    }
}

/// Shared error banner; shows whatever failed most recently.
#[component]
pub fn ErrorBanner() -> impl IntoView {
    let state = expect_context::<AppState>();

    move || state.error().map(|msg| view! {
        <div class="error-msg">
            <span>{msg}</span>
            <button class="error-dismiss" on:click=move |_| state.dismiss_error()>{"\u{00D7}"}</button>
        </div>
    })
}
