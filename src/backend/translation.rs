//! Translation endpoint contract and the sequential translation pipeline

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{BackendApi, BackendError};
use crate::error::ViewerError;
use crate::model::{FragmentId, ResultSet};

pub const TRANSLATE_PATH: &str = "/translate";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TARGET_LANGUAGE: &str = "chinese";

/// `POST /translate` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub model: String,
    pub target_language: String,
}

/// `POST /translate` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOptions {
    pub model: String,
    pub target_language: String,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

/// Result of translating one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    Translated { id: FragmentId, text: String },
    /// The original text stays in place
    Failed { id: FragmentId },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    pub translated: usize,
    pub failed: usize,
}

impl TranslationSummary {
    pub fn total(&self) -> usize {
        self.translated + self.failed
    }
}

/// Sends fragments to the backend one at a time
pub struct Translator<'a, A: BackendApi + ?Sized> {
    api: &'a A,
    options: &'a TranslationOptions,
}

impl<'a, A: BackendApi + ?Sized> Translator<'a, A> {
    pub fn new(api: &'a A, options: &'a TranslationOptions) -> Self {
        Self { api, options }
    }

    pub fn try_translate(&self, text: &str) -> Result<String, BackendError> {
        self.api.translate(&TranslationRequest {
            text: text.to_string(),
            model: self.options.model.clone(),
            target_language: self.options.target_language.clone(),
        })
    }

    /// Translate `text`, falling back to the original on any failure
    pub fn translate(&self, text: &str) -> String {
        self.translate_or_keep(text).unwrap_or_else(|| text.to_string())
    }

    /// `None` means the request failed and the original text stays
    fn translate_or_keep(&self, text: &str) -> Option<String> {
        match self.try_translate(text) {
            Ok(translated) => Some(translated),
            Err(e) => {
                let err = ViewerError::TranslationFailure {
                    detail: e.to_string(),
                };
                warn!("{err}, keeping original text");
                None
            }
        }
    }

    /// Translate every fragment of `results` in pipeline order, reporting
    /// each outcome as soon as it is known
    pub fn translate_each(
        &self,
        results: &ResultSet,
        mut on_fragment: impl FnMut(FragmentOutcome),
    ) -> TranslationSummary {
        let mut summary = TranslationSummary::default();
        for (id, text) in results.fragments() {
            match self.translate_or_keep(&text) {
                Some(translated) => {
                    debug!("Translated {id:?}");
                    summary.translated += 1;
                    on_fragment(FragmentOutcome::Translated {
                        id,
                        text: translated,
                    });
                }
                None => {
                    summary.failed += 1;
                    on_fragment(FragmentOutcome::Failed { id });
                }
            }
        }
        summary
    }

    /// Translate `results` in place
    pub fn translate_all(&self, results: &mut ResultSet) -> TranslationSummary {
        let snapshot = results.clone();
        self.translate_each(&snapshot, |outcome| {
            if let FragmentOutcome::Translated { id, text } = outcome {
                results.replace(id, text);
            }
        })
    }
}
