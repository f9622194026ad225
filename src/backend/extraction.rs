//! Extraction endpoint contract

use log::{error, info};
use serde::{Deserialize, Serialize};

use super::BackendApi;
use crate::error::ViewerError;
use crate::model::{PageResult, ResultSet};
use crate::session::LoadedFile;

pub const EXTRACT_PATH: &str = "/extract_text";

/// Multipart field name carrying the PDF
pub const PDF_FIELD: &str = "pdf";

/// `{ "pages": [ { "pdf_text"?, "image_ocr_text"? } ] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub pages: Vec<PageResult>,
}

/// Run one extraction. No retry: any failure becomes a `NetworkError` and
/// nothing is stored.
pub fn extract<A: BackendApi + ?Sized>(api: &A, file: &LoadedFile) -> Result<ResultSet, ViewerError> {
    match api.extract_text(file) {
        Ok(results) => {
            info!("Extracted text for {} pages", results.len());
            Ok(results)
        }
        Err(e) => {
            let err = ViewerError::network(e.to_string());
            error!("{err}");
            Err(err)
        }
    }
}
