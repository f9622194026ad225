//! User-facing error taxonomy

/// Errors surfaced to the user by the viewer.
///
/// The first four are shown as a blocking alert. `TranslationFailure` is
/// only ever logged: the translation pipeline falls back to the original
/// text and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("Please upload a valid PDF file.")]
    InvalidFileType { name: String },

    #[error("No valid PDF file selected.")]
    NoFileSelected,

    #[error("Error loading PDF: {detail}")]
    ParseFailure { detail: String },

    #[error("Error extracting text: {detail}")]
    NetworkError { detail: String },

    #[error("Translation failed: {detail}")]
    TranslationFailure { detail: String },
}

impl ViewerError {
    pub fn parse(detail: impl Into<String>) -> Self {
        Self::ParseFailure {
            detail: detail.into(),
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::NetworkError {
            detail: detail.into(),
        }
    }

    /// Whether the error interrupts the user with an alert
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::TranslationFailure { .. })
    }
}
