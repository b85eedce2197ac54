//! File pick -> submit -> result lifecycle of the Record view.

use crate::api::AnalysisService;
use crate::error::ApiError;
use crate::types::{AnalysisResult, Scale, Upload};

/// Shown when the service gives no reason of its own.
pub const ANALYSIS_FAILED: &str = "Analysis failed";

#[derive(Clone, Debug, Default, PartialEq)]
pub enum UploadStatus {
    /// Nothing picked yet.
    #[default]
    Idle,
    /// A file is picked and no submission has happened since.
    FileSelected,
    /// A request is in flight; further submits are refused.
    Submitting,
    Succeeded(AnalysisResult),
    Failed(String),
}

/// Everything needed to issue one analysis request, captured at submit time.
///
/// Holds the only copy of the recording outside the workflow; [`run`](Self::run)
/// hands it to the service without copying again.
#[derive(Debug)]
pub struct SubmitRequest {
    pub upload: Upload,
    pub scale: Scale,
}

impl SubmitRequest {
    pub async fn run<S: AnalysisService>(self, service: &S) -> Result<AnalysisResult, ApiError> {
        service.analyze(self.upload, self.scale).await
    }
}

#[derive(Clone, Debug, Default)]
pub struct UploadWorkflow {
    file: Option<Upload>,
    scale: Scale,
    status: UploadStatus,
}

impl UploadWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Takes effect for the next submission; an in-flight one keeps its scale.
    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.status, UploadStatus::Submitting)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.status {
            UploadStatus::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.status {
            UploadStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Whether the analyze action is enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_submitting() && self.file.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Pick or drop a file. Allowed in every state; a shown result or error
    /// stays until the next submission replaces it.
    pub fn select_file(&mut self, upload: Upload) {
        log::debug!("Selected {} ({} bytes)", upload.name, upload.bytes.len());
        self.file = Some(upload);
        if self.status == UploadStatus::Idle {
            self.status = UploadStatus::FileSelected;
        }
    }

    /// A pick that could not be read. Drops the previous file so it cannot be
    /// submitted by mistake; a shown result stays.
    pub fn reject_file(&mut self) {
        self.file = None;
        if self.status == UploadStatus::FileSelected {
            self.status = UploadStatus::Idle;
        }
    }

    /// Enter `Submitting` and hand back the request to send, or `None` when
    /// submission is disabled (no file, or already submitting).
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        if !self.can_submit() {
            return None;
        }
        let upload = self.file.clone()?;
        self.status = UploadStatus::Submitting;
        Some(SubmitRequest { upload, scale: self.scale })
    }

    /// Record the outcome of the request from [`begin_submit`](Self::begin_submit).
    ///
    /// Returns the message to show the user on failure. The selected file is
    /// kept either way so a failed upload can be retried as is.
    pub fn finish_submit(&mut self, outcome: Result<AnalysisResult, ApiError>) -> Option<String> {
        if !self.is_submitting() {
            log::warn!("Ignoring analysis response with no submission outstanding");
            return None;
        }
        match outcome {
            Ok(result) => {
                log::info!(
                    "Session #{} analyzed: intonation {}/7, cv {:.1}",
                    result.id,
                    result.analytics.intonation,
                    result.analytics.cv_evenness
                );
                self.status = UploadStatus::Succeeded(result);
                None
            }
            Err(e) => {
                log::error!("Analysis failed: {e}");
                let message = e.detail().unwrap_or(ANALYSIS_FAILED).to_string();
                self.status = UploadStatus::Failed(message.clone());
                Some(message)
            }
        }
    }

    /// Submit and wait for the response. Returns `false` without touching
    /// the network when submission is disabled.
    pub async fn submit<S: AnalysisService>(&mut self, service: &S) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let outcome = request.run(service).await;
        self.finish_submit(outcome);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_result, FakeService};

    fn wav() -> Upload {
        Upload::new("g-major.wav", vec![1, 2, 3, 4])
    }

    #[test]
    fn test_select_file_moves_idle_to_file_selected() {
        let mut wf = UploadWorkflow::new();
        assert_eq!(wf.status(), &UploadStatus::Idle);
        assert!(!wf.can_submit());

        wf.select_file(wav());
        assert_eq!(wf.status(), &UploadStatus::FileSelected);
        assert_eq!(wf.file_name(), Some("g-major.wav"));
        assert!(wf.can_submit());
    }

    #[test]
    fn test_begin_submit_without_file_is_refused() {
        let mut wf = UploadWorkflow::new();
        assert!(wf.begin_submit().is_none());
        assert_eq!(wf.status(), &UploadStatus::Idle);
    }

    #[test]
    fn test_empty_file_cannot_be_submitted() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(Upload::new("empty.wav", Vec::new()));
        assert!(!wf.can_submit());
        assert!(wf.begin_submit().is_none());
    }

    #[test]
    fn test_second_submit_refused_while_submitting() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.set_scale(Scale::G);
        let request = wf.begin_submit().unwrap();
        assert_eq!(request.scale, Scale::G);
        assert!(wf.is_submitting());
        assert!(!wf.can_submit());
        assert!(wf.begin_submit().is_none());
    }

    #[test]
    fn test_scale_change_during_submit_does_not_touch_request() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.set_scale(Scale::D);
        let request = wf.begin_submit().unwrap();
        wf.set_scale(Scale::EFlat);
        assert_eq!(request.scale, Scale::D);
        assert_eq!(wf.scale(), Scale::EFlat);
    }

    #[test]
    fn test_failure_uses_server_detail() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.begin_submit().unwrap();
        let msg = wf.finish_submit(Err(ApiError::rejected(400, r#"{"detail": "Unsupported format"}"#)));
        assert_eq!(msg.as_deref(), Some("Unsupported format"));
        assert_eq!(wf.failure(), Some("Unsupported format"));
        // the file survives for a retry
        assert_eq!(wf.file_name(), Some("g-major.wav"));
        assert!(wf.can_submit());
    }

    #[test]
    fn test_failure_without_detail_uses_generic_message() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.begin_submit().unwrap();
        let msg = wf.finish_submit(Err(ApiError::Decode("eof".into())));
        assert_eq!(msg.as_deref(), Some(ANALYSIS_FAILED));
    }

    #[test]
    fn test_new_pick_keeps_previous_result_until_next_submit() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.begin_submit().unwrap();
        wf.finish_submit(Ok(sample_result()));

        wf.select_file(Upload::new("take-2.wav", vec![9]));
        assert_eq!(wf.result().map(|r| r.id), Some(sample_result().id));

        wf.begin_submit().unwrap();
        assert!(wf.result().is_none());
        assert!(wf.is_submitting());
    }

    #[test]
    fn test_rejected_pick_drops_previous_file() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.reject_file();
        assert_eq!(wf.status(), &UploadStatus::Idle);
        assert_eq!(wf.file_name(), None);
        assert!(!wf.can_submit());
        assert!(wf.begin_submit().is_none());
    }

    #[test]
    fn test_rejected_pick_keeps_shown_result() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.begin_submit().unwrap();
        wf.finish_submit(Ok(sample_result()));

        wf.reject_file();
        assert!(!wf.can_submit());
        assert_eq!(wf.result(), Some(&sample_result()));
    }

    #[test]
    fn test_stray_response_is_ignored() {
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        assert_eq!(wf.finish_submit(Err(ApiError::Decode("x".into()))), None);
        assert_eq!(wf.status(), &UploadStatus::FileSelected);
    }

    #[tokio::test]
    async fn test_submit_without_file_makes_no_call() {
        let service = FakeService::default();
        let mut wf = UploadWorkflow::new();
        assert!(!wf.submit(&service).await);
        assert_eq!(service.calls().analyze, 0);
        assert_eq!(wf.status(), &UploadStatus::Idle);
    }

    #[tokio::test]
    async fn test_submit_sends_file_and_scale() {
        let service = FakeService::default();
        let mut wf = UploadWorkflow::new();
        wf.select_file(wav());
        wf.set_scale(Scale::G);
        assert!(wf.submit(&service).await);

        assert_eq!(service.calls().analyze, 1);
        assert_eq!(service.last_upload(), Some(("g-major.wav".to_string(), Scale::G)));
        assert_eq!(service.last_upload_len(), Some(4));
        assert_eq!(wf.result(), Some(&sample_result()));
        // the workflow keeps its own copy for a retry
        assert!(wf.can_submit());
    }
}
