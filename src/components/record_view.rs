use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use tracker_lib::classify::{Evenness, TempoTrend};
use tracker_lib::{AnalysisResult, Scale};
use crate::components::app::ErrorBanner;
use crate::components::widgets::{ScoreRing, StatCard};
use crate::file_input::{first_file, read_upload};
use crate::state::AppState;

#[component]
pub fn RecordView() -> impl IntoView {
    let state = expect_context::<AppState>();
    let tracker = state.tracker;

    let can_submit = move || tracker.with(|t| t.upload().can_submit());
    let submitting = move || tracker.with(|t| t.upload().is_submitting());
    let result = move || tracker.with(|t| t.upload().result().cloned());

    view! {
        <div class="record-view fade-in">
            <div class="upload-section">
                <h2>"Record a scale"</h2>
                <p class="subtitle">
                    "Upload your recording and select the scale to analyze your intonation, evenness, and tempo."
                </p>

                <ScaleSelect />
                <DropZone />

                <button
                    class="analyze-btn"
                    disabled=move || !can_submit()
                    on:click=move |_| state.submit()
                >
                    {move || if submitting() {
                        view! { <span class="spinner" /> }.into_any()
                    } else {
                        view! { "Analyze" }.into_any()
                    }}
                </button>
            </div>

            <ErrorBanner />

            {move || result().map(|r| view! { <ResultsPanel result=r /> })}
        </div>
    }
}

#[component]
fn ScaleSelect() -> impl IntoView {
    let state = expect_context::<AppState>();
    let current = move || state.tracker.with(|t| t.upload().scale());

    view! {
        <div class="scale-select-wrapper">
            <label>"Scale"</label>
            <select
                class="scale-select"
                on:change=move |ev| {
                    match event_target_value(&ev).parse::<Scale>() {
                        Ok(scale) => state.set_scale(scale),
                        Err(e) => log::warn!("{e}"),
                    }
                }
            >
                {Scale::ALL.into_iter().map(|s| view! {
                    <option value=s.name() selected=move || current() == s>{s.name()}</option>
                }).collect::<Vec<_>>()}
            </select>
        </div>
    }
}

/// Drag-or-click file picker. Only the first file of a drop is used.
#[component]
fn DropZone() -> impl IntoView {
    let state = expect_context::<AppState>();
    let drag_active = state.drag_active;
    let file_name = move || state.tracker.with(|t| t.upload().file_name().map(str::to_string));
    let file_input_ref = NodeRef::<leptos::html::Input>::new();

    let load = move |file: web_sys::File| {
        spawn_local(async move {
            match read_upload(file).await {
                Ok(upload) => state.select_file(upload),
                Err(e) => state.reject_file(e),
            }
        });
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        drag_active.set(true);
    };

    let on_dragleave = move |_: DragEvent| {
        drag_active.set(false);
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        drag_active.set(false);
        let Some(dt) = ev.data_transfer() else { return };
        if let Some(file) = first_file(dt.files()) {
            load(file);
        }
    };

    let on_click = move |_: web_sys::MouseEvent| {
        if let Some(input) = file_input_ref.get() {
            let el: &HtmlInputElement = input.as_ref();
            el.click();
        }
    };

    let on_file_input_change = move |ev: web_sys::Event| {
        let Some(target) = ev.target() else { return };
        let input: HtmlInputElement = target.unchecked_into();
        if let Some(file) = first_file(input.files()) {
            load(file);
        }
        // Reset so picking the same file again still fires a change
        input.set_value("");
    };

    let zone_class = move || {
        let mut class = String::from("dropzone");
        if drag_active.get() {
            class.push_str(" dropzone-active");
        }
        if file_name().is_some() {
            class.push_str(" dropzone-has-file");
        }
        class
    };

    view! {
        <div
            class=zone_class
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:drop=on_drop
            on:click=on_click
        >
            <input
                node_ref=file_input_ref
                type="file"
                accept="audio/*"
                style="display:none"
                on:change=on_file_input_change
            />
            {move || match file_name() {
                Some(name) => view! {
                    <div class="dropzone-file">
                        <span class="file-icon">{"\u{266A}"}</span>
                        <span class="file-name">{name}</span>
                        <span class="file-change">"click to change"</span>
                    </div>
                }.into_any(),
                None => view! {
                    <div class="dropzone-empty">
                        <span class="dropzone-icon">{"\u{2397}"}</span>
                        <span>"Drop audio file here or click to browse"</span>
                    </div>
                }.into_any(),
            }}
        </div>
    }
}

#[component]
fn ResultsPanel(result: AnalysisResult) -> impl IntoView {
    let a = result.analytics;
    let evenness = Evenness::from_cv(a.cv_evenness);
    let tempo = TempoTrend::from_slope(a.tempo_slope);

    view! {
        <div class="results fade-in">
            <div class="results-header">
                <h3>"Results"</h3>
                <span class="results-id">{format!("#{}", result.id)}</span>
            </div>

            <div class="results-grid">
                <div class="results-score">
                    <ScoreRing score=a.intonation />
                </div>

                <div class="results-stats">
                    <StatCard
                        label="Evenness"
                        value=a.cv_evenness
                        unit="cv"
                        description=evenness.description()
                    />
                    <StatCard label="Mean Tempo" value=a.mean_tempo unit="bpm" />
                    <StatCard
                        label="Tempo Drift"
                        value=a.tempo_slope
                        unit="slope"
                        description=tempo.description()
                    />
                    <StatCard label="Tempo Consistency" value=a.tempo_r unit="r" />
                </div>
            </div>
        </div>
    }
}
