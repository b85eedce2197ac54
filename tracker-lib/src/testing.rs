//! In-memory stand-in for the analysis service, for unit tests.

use std::cell::{Cell, RefCell};

use crate::api::AnalysisService;
use crate::error::ApiError;
use crate::types::{
    AnalysisResult, Analytics, HistoryRecord, Scale, TrendField, TrendSet, TrendStats, Upload,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Calls {
    pub analyze: usize,
    pub list_history: usize,
    pub get_trends: usize,
    pub clear_history: usize,
}

pub fn sample_result() -> AnalysisResult {
    AnalysisResult {
        id: 41,
        analytics: Analytics {
            intonation: 7,
            cv_evenness: 1.2,
            mean_tempo: 110.4,
            tempo_slope: 0.2,
            tempo_r: 0.91,
        },
    }
}

pub fn sample_record(id: u64) -> HistoryRecord {
    HistoryRecord {
        id,
        date: format!("2025-03-0{}T10:00:00", id.clamp(1, 9)),
        scale: Scale::C.name().to_string(),
        intonation: Some(6),
        cv_evenness: Some(2.0),
        mean_tempo: Some(96.0),
        tempo_slope: Some(0.1),
        tempo_r: Some(0.4),
    }
}

pub fn sample_trends() -> TrendSet {
    TrendSet::Fields(vec![TrendField {
        name: "intonation".into(),
        stats: TrendStats { slope: Some(0.02), r: Some(0.6), p: Some(0.03) },
    }])
}

/// Failures are modelled as HTTP rejections since `reqwest::Error` cannot be
/// built by hand.
#[derive(Default)]
pub struct FakeService {
    calls: Cell<Calls>,
    history: RefCell<Vec<HistoryRecord>>,
    trends: RefCell<Option<TrendSet>>,
    last_upload: RefCell<Option<(String, Scale)>>,
    last_upload_len: Cell<Option<usize>>,
    pub fail_analyze: RefCell<Option<String>>,
    pub fail_history: Cell<bool>,
    pub fail_trends: Cell<bool>,
    pub fail_clear: Cell<bool>,
}

impl FakeService {
    pub fn with_history(records: Vec<HistoryRecord>) -> Self {
        let service = Self::default();
        service.history.replace(records);
        service
    }

    pub fn set_trends(&self, trends: TrendSet) {
        self.trends.replace(Some(trends));
    }

    pub fn calls(&self) -> Calls {
        self.calls.get()
    }

    pub fn last_upload(&self) -> Option<(String, Scale)> {
        self.last_upload.borrow().clone()
    }

    pub fn last_upload_len(&self) -> Option<usize> {
        self.last_upload_len.get()
    }

    fn bump(&self, f: impl FnOnce(&mut Calls)) {
        let mut calls = self.calls.get();
        f(&mut calls);
        self.calls.set(calls);
    }
}

impl AnalysisService for FakeService {
    async fn analyze(&self, upload: Upload, scale: Scale) -> Result<AnalysisResult, ApiError> {
        self.bump(|c| c.analyze += 1);
        self.last_upload_len.set(Some(upload.bytes.len()));
        self.last_upload.replace(Some((upload.name, scale)));
        if let Some(detail) = self.fail_analyze.borrow().as_ref() {
            return Err(ApiError::rejected(400, &serde_json::json!({ "detail": detail }).to_string()));
        }
        Ok(sample_result())
    }

    async fn list_history(&self) -> Result<Vec<HistoryRecord>, ApiError> {
        self.bump(|c| c.list_history += 1);
        if self.fail_history.get() {
            return Err(ApiError::rejected(500, ""));
        }
        Ok(self.history.borrow().clone())
    }

    async fn get_trends(&self) -> Result<TrendSet, ApiError> {
        self.bump(|c| c.get_trends += 1);
        if self.fail_trends.get() {
            return Err(ApiError::rejected(502, ""));
        }
        Ok(self.trends.borrow().clone().unwrap_or_else(sample_trends))
    }

    async fn clear_history(&self) -> Result<(), ApiError> {
        self.bump(|c| c.clear_history += 1);
        if self.fail_clear.get() {
            return Err(ApiError::rejected(500, ""));
        }
        self.history.borrow_mut().clear();
        Ok(())
    }
}
