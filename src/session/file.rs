//! Files picked by the user

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file chosen in the picker, not yet read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
    /// Declared type, derived from the extension the way a browser does it
    pub content_type: String,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let content_type = content_type_for(&path).to_string();
        Self {
            name,
            path,
            content_type,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type == PDF_CONTENT_TYPE
    }
}

/// Map a file extension to its declared content type
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_CONTENT_TYPE,
        "txt" | "md" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "epub" => "application/epub+zip",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// The file backing the currently loaded document, with its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub file: SelectedFile,
    pub bytes: Arc<Vec<u8>>,
}
