use leptos::prelude::*;
use leptos::task::spawn_local;
use tracker_lib::{AnalysisClient, AnalysisService, ClientConfig, Scale, Upload, View, ViewController};

/// Base URL of the analysis service, fixed at build time.
pub fn api_config() -> ClientConfig {
    ClientConfig::from_optional(option_env!("SCALE_TRACKER_API"))
}

/// Application state shared through context. All mutation goes through the
/// action methods below, one per user-visible action.
#[derive(Clone, Copy)]
pub struct AppState {
    pub tracker: RwSignal<ViewController>,
    pub drag_active: RwSignal<bool>,
    config: StoredValue<ClientConfig>,
}

impl AppState {
    pub fn new() -> Self {
        let config = api_config();
        log::info!("Analysis service at {}", config.base_url);
        Self {
            tracker: RwSignal::new(ViewController::new()),
            drag_active: RwSignal::new(false),
            config: StoredValue::new(config),
        }
    }

    fn client(&self) -> AnalysisClient {
        AnalysisClient::new(self.config.get_value())
    }

    pub fn view(&self) -> View {
        self.tracker.with(|t| t.view())
    }

    pub fn error(&self) -> Option<String> {
        self.tracker.with(|t| t.error().map(str::to_string))
    }

    /// Nav click. Entering History or Trends fetches that view's data once.
    pub fn set_view(&self, view: View) {
        let Some(ticket) = self.tracker.try_update(|t| t.set_view(view)).flatten() else {
            return;
        };
        let client = self.client();
        let tracker = self.tracker;
        spawn_local(async move {
            let outcome = ticket.run(&client).await;
            tracker.update(|t| {
                t.apply_fetch(outcome);
            });
        });
    }

    pub fn set_scale(&self, scale: Scale) {
        self.tracker.update(|t| t.upload_mut().set_scale(scale));
    }

    pub fn select_file(&self, upload: Upload) {
        self.tracker.update(|t| t.upload_mut().select_file(upload));
    }

    /// A dropped or picked file that could not be read.
    pub fn reject_file(&self, message: String) {
        self.tracker.update(|t| t.reject_file(message));
    }

    /// Analyze button. Does nothing while disabled.
    pub fn submit(&self) {
        let Some(request) = self.tracker.try_update(|t| t.begin_submit()).flatten() else {
            return;
        };
        let client = self.client();
        let tracker = self.tracker;
        spawn_local(async move {
            let outcome = request.run(&client).await;
            tracker.update(|t| t.finish_submit(outcome));
        });
    }

    /// "Clear All" in the History view.
    pub fn clear_history(&self) {
        if !self.tracker.try_update(|t| t.begin_clear_history()).unwrap_or(false) {
            return;
        }
        let client = self.client();
        let tracker = self.tracker;
        spawn_local(async move {
            let outcome = client.clear_history().await;
            tracker.update(|t| t.finish_clear_history(outcome));
        });
    }

    pub fn dismiss_error(&self) {
        self.tracker.update(|t| t.dismiss_error());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
