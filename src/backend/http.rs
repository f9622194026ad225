//! reqwest-backed client for the backend HTTP endpoints

use std::time::Duration;

use log::{debug, error, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};

use super::extraction::{EXTRACT_PATH, ExtractResponse, PDF_FIELD};
use super::translation::{TRANSLATE_PATH, TranslationRequest, TranslationResponse};
use super::{BackendApi, BackendError};
use crate::model::ResultSet;
use crate::session::{LoadedFile, PDF_CONTENT_TYPE};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Characters of an error body kept for the user; the rest goes to the log
const MAX_ERROR_BODY: usize = 200;

/// Blocking HTTP client. Lives on the backend worker thread.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl BackendApi for HttpBackend {
    fn extract_text(&self, file: &LoadedFile) -> Result<ResultSet, BackendError> {
        info!(
            "Uploading {} ({} bytes) for extraction",
            file.file.name,
            file.bytes.len()
        );
        let part = Part::bytes(file.bytes.as_ref().clone())
            .file_name(file.file.name.clone())
            .mime_str(PDF_CONTENT_TYPE)?;
        let form = Form::new().part(PDF_FIELD, part);

        let response = self
            .client
            .post(self.url(EXTRACT_PATH))
            .multipart(form)
            .send()?;
        let body = success_body(response)?;
        let parsed: ExtractResponse = serde_json::from_str(&body)?;
        debug!("Extraction returned {} pages", parsed.pages.len());
        Ok(ResultSet::new(parsed.pages))
    }

    fn translate(&self, request: &TranslationRequest) -> Result<String, BackendError> {
        let response = self
            .client
            .post(self.url(TRANSLATE_PATH))
            .json(request)
            .send()?;
        let body = success_body(response)?;
        let parsed: TranslationResponse = serde_json::from_str(&body)?;
        Ok(parsed.translated_text)
    }
}

fn success_body(response: Response) -> Result<String, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        error!("Backend returned {status}: {body}");
        return Err(BackendError::Status {
            status: status.as_u16(),
            body: truncate_chars(&body, MAX_ERROR_BODY),
        });
    }
    Ok(response.text()?)
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", &text[..end]),
        None => text.to_string(),
    }
}
