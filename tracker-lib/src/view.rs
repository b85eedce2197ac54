//! Active view, per-view cached data and the shared error banner.
//!
//! The controller never awaits anything itself. Every action that needs the
//! network is split into a synchronous `begin`/`set_view` step that returns a
//! request, and a synchronous step that applies the response. The web front
//! end keeps the controller in a signal and runs the request in between with
//! `spawn_local`; the `*_with` helpers do the same thing inline for the CLI
//! and tests.

use std::fmt;

use crate::api::AnalysisService;
use crate::error::ApiError;
use crate::types::{AnalysisResult, HistoryRecord, TrendSet};
use crate::upload::{SubmitRequest, UploadWorkflow};

pub const HISTORY_FAILED: &str = "Failed to load history";
pub const TRENDS_FAILED: &str = "Failed to load trends";
pub const CLEAR_FAILED: &str = "Failed to clear history";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Record,
    History,
    Trends,
}

impl View {
    pub const ALL: [View; 3] = [View::Record, View::History, View::Trends];

    pub fn label(self) -> &'static str {
        match self {
            View::Record => "record",
            View::History => "history",
            View::Trends => "trends",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which remote collection a fetch loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    History,
    Trends,
}

/// Handle for one fetch started by a view transition. Responses carrying an
/// older generation than the latest issued for their kind are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: FetchKind,
    generation: u64,
}

impl FetchTicket {
    pub async fn run<S: AnalysisService>(self, service: &S) -> FetchOutcome {
        match self.kind {
            FetchKind::History => FetchOutcome::History(self, service.list_history().await),
            FetchKind::Trends => FetchOutcome::Trends(self, service.get_trends().await),
        }
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    History(FetchTicket, Result<Vec<HistoryRecord>, ApiError>),
    Trends(FetchTicket, Result<TrendSet, ApiError>),
}

#[derive(Clone, Debug, Default)]
pub struct ViewController {
    view: View,
    history: Vec<HistoryRecord>,
    trends: Option<TrendSet>,
    error: Option<String>,
    upload: UploadWorkflow,
    history_generation: u64,
    trends_generation: u64,
    clearing: bool,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Last successfully loaded history, insertion order.
    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    /// `None` until the first trends fetch succeeds.
    pub fn trends(&self) -> Option<&TrendSet> {
        self.trends.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn upload(&self) -> &UploadWorkflow {
        &self.upload
    }

    pub fn upload_mut(&mut self) -> &mut UploadWorkflow {
        &mut self.upload
    }

    pub fn is_clearing(&self) -> bool {
        self.clearing
    }

    /// Whether "Clear All" is offered.
    pub fn can_clear_history(&self) -> bool {
        !self.history.is_empty() && !self.clearing
    }

    /// Switch views and clear the error banner. Entering History or Trends
    /// returns the fetch to run; reselecting the current view does not.
    pub fn set_view(&mut self, view: View) -> Option<FetchTicket> {
        self.error = None;
        if view == self.view {
            return None;
        }
        log::debug!("View {} -> {}", self.view, view);
        self.view = view;
        match view {
            View::Record => None,
            View::History => Some(self.issue(FetchKind::History)),
            View::Trends => Some(self.issue(FetchKind::Trends)),
        }
    }

    fn issue(&mut self, kind: FetchKind) -> FetchTicket {
        let generation = match kind {
            FetchKind::History => {
                self.history_generation += 1;
                self.history_generation
            }
            FetchKind::Trends => {
                self.trends_generation += 1;
                self.trends_generation
            }
        };
        FetchTicket { kind, generation }
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        let latest = match ticket.kind {
            FetchKind::History => self.history_generation,
            FetchKind::Trends => self.trends_generation,
        };
        ticket.generation == latest
    }

    /// Apply a finished fetch. Returns `false` if it was superseded and
    /// dropped. A failure keeps whatever was cached before.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome) -> bool {
        let ticket = match &outcome {
            FetchOutcome::History(t, _) | FetchOutcome::Trends(t, _) => *t,
        };
        if !self.is_current(ticket) {
            log::warn!("Dropping stale {:?} response (generation {})", ticket.kind, ticket.generation);
            return false;
        }
        match outcome {
            FetchOutcome::History(_, Ok(records)) => {
                log::info!("Loaded {} sessions", records.len());
                self.history = records;
            }
            FetchOutcome::History(_, Err(e)) => {
                log::error!("History fetch failed: {e}");
                self.error = Some(HISTORY_FAILED.to_string());
            }
            FetchOutcome::Trends(_, Ok(trends)) => {
                if let Some(msg) = trends.insufficient_message() {
                    log::info!("No trends yet: {msg}");
                }
                self.trends = Some(trends);
            }
            FetchOutcome::Trends(_, Err(e)) => {
                log::error!("Trends fetch failed: {e}");
                self.error = Some(TRENDS_FAILED.to_string());
            }
        }
        true
    }

    /// A picked file could not be read (too large, unreadable). Shows
    /// `message` in the banner and deselects the previous file.
    pub fn reject_file(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("Rejected file: {message}");
        self.upload.reject_file();
        self.error = Some(message);
    }

    /// Start an analysis upload; clears the banner when one actually starts.
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        let request = self.upload.begin_submit()?;
        self.error = None;
        Some(request)
    }

    pub fn finish_submit(&mut self, outcome: Result<AnalysisResult, ApiError>) {
        if let Some(message) = self.upload.finish_submit(outcome) {
            self.error = Some(message);
        }
    }

    /// Mark a clear as outstanding. `false` when there is nothing to clear
    /// or a clear is already running.
    pub fn begin_clear_history(&mut self) -> bool {
        if !self.can_clear_history() {
            return false;
        }
        self.clearing = true;
        true
    }

    pub fn finish_clear_history(&mut self, outcome: Result<(), ApiError>) {
        self.clearing = false;
        match outcome {
            Ok(()) => {
                log::info!("Cleared {} sessions", self.history.len());
                self.history.clear();
                // an in-flight list fetch would otherwise bring them back
                self.history_generation += 1;
            }
            Err(e) => {
                log::error!("Clear history failed: {e}");
                self.error = Some(CLEAR_FAILED.to_string());
            }
        }
    }

    pub async fn set_view_with<S: AnalysisService>(&mut self, view: View, service: &S) {
        if let Some(ticket) = self.set_view(view) {
            let outcome = ticket.run(service).await;
            self.apply_fetch(outcome);
        }
    }

    pub async fn submit_with<S: AnalysisService>(&mut self, service: &S) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let outcome = request.run(service).await;
        self.finish_submit(outcome);
        true
    }

    pub async fn clear_history_with<S: AnalysisService>(&mut self, service: &S) -> bool {
        if !self.begin_clear_history() {
            return false;
        }
        let outcome = service.clear_history().await;
        self.finish_clear_history(outcome);
        true
    }
}
