pub mod api;
pub mod classify;
pub mod error;
pub mod format;
pub mod types;
pub mod upload;
pub mod view;

#[cfg(test)]
mod testing;

pub use api::{AnalysisClient, AnalysisService, ClientConfig, DEFAULT_API_BASE};
pub use error::ApiError;
pub use types::*;
pub use upload::{SubmitRequest, UploadStatus, UploadWorkflow};
pub use view::{FetchKind, FetchOutcome, FetchTicket, View, ViewController};
