//! Backend extraction and translation
//!
//! The backend is an external HTTP service with two endpoints. Everything
//! here talks to it through [`BackendApi`], so the pipeline can run against
//! the real server ([`HttpBackend`]) or a fake in tests.

mod extraction;
mod http;
mod request;
mod service;
mod translation;
mod worker;

pub use extraction::{EXTRACT_PATH, ExtractResponse, PDF_FIELD, extract};
pub use http::{DEFAULT_BASE_URL, HttpBackend};
pub use request::{BackendRequest, BackendResponse};
pub use service::BackendService;
pub use translation::{
    DEFAULT_MODEL, DEFAULT_TARGET_LANGUAGE, FragmentOutcome, TRANSLATE_PATH, TranslationOptions,
    TranslationRequest, TranslationResponse, TranslationSummary, Translator,
};

use crate::model::ResultSet;
use crate::session::LoadedFile;

/// Transport-level failures talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// The two backend endpoints
pub trait BackendApi: Send + 'static {
    /// `POST /extract_text` with the file as multipart field `pdf`
    fn extract_text(&self, file: &LoadedFile) -> Result<ResultSet, BackendError>;

    /// `POST /translate`; returns the translated text
    fn translate(&self, request: &TranslationRequest) -> Result<String, BackendError>;
}
