//! PDF worker - owns the parsed document on a dedicated thread

use std::sync::Arc;

use flume::{Receiver, Sender};
use log::{debug, error, info, warn};

use super::engine::{PageSource, PdfEngine};
use super::request::{PdfRequest, PdfResponse};
use super::viewport::render_page;
use crate::session::{LoadedFile, SelectedFile};

/// Main worker function - runs in a dedicated thread
pub fn pdf_worker<E: PdfEngine>(
    engine: E,
    requests: Receiver<PdfRequest>,
    responses: Sender<PdfResponse>,
) {
    let mut doc: Option<Box<dyn PageSource>> = None;
    // Parsed but not yet accepted by the session
    let mut staged: Option<(u64, Box<dyn PageSource>)> = None;

    for request in requests {
        match request {
            PdfRequest::Open { request, file } => {
                let response = match open_document(&engine, file) {
                    Ok((parsed, loaded)) => {
                        let info = parsed.info();
                        info!("Parsed {}: {} pages", loaded.file.name, info.page_count);
                        staged = Some((request, parsed));
                        PdfResponse::Opened {
                            request,
                            info,
                            file: loaded,
                        }
                    }
                    Err(detail) => {
                        error!("Error loading PDF: {detail}");
                        PdfResponse::OpenFailed { request, detail }
                    }
                };
                let _ = responses.send(response);
            }

            PdfRequest::Activate { request } => match staged.take() {
                Some((load, parsed)) if load == request => {
                    debug!("Activated document from load #{request}");
                    doc = Some(parsed);
                }
                other => {
                    warn!("No staged document for load #{request}");
                    staged = other;
                }
            },

            PdfRequest::Render {
                id,
                generation,
                page,
                container,
                overlay,
            } => {
                let response = match doc.as_deref() {
                    Some(d) => match render_page(d, page, container, overlay) {
                        Ok(frame) => PdfResponse::Rendered {
                            id,
                            generation,
                            frame: Arc::new(frame),
                        },
                        Err(e) => {
                            warn!("Failed to render page {page}: {e}");
                            PdfResponse::RenderFailed {
                                id,
                                generation,
                                detail: e.to_string(),
                            }
                        }
                    },
                    None => PdfResponse::RenderFailed {
                        id,
                        generation,
                        detail: "no document loaded".to_string(),
                    },
                };
                let _ = responses.send(response);
            }

            PdfRequest::Close => {
                doc = None;
                staged = None;
            }

            PdfRequest::Shutdown => break,
        }
    }
}

/// Read and parse a file. Documents without pages are refused.
fn open_document<E: PdfEngine>(
    engine: &E,
    file: SelectedFile,
) -> Result<(Box<dyn PageSource>, LoadedFile), String> {
    let bytes = std::fs::read(&file.path)
        .map_err(|e| format!("failed to read {}: {e}", file.path.display()))?;
    let parsed = engine.parse(&bytes).map_err(|e| e.to_string())?;
    if parsed.info().page_count == 0 {
        return Err("document has no pages".to_string());
    }
    Ok((
        parsed,
        LoadedFile {
            file,
            bytes: Arc::new(bytes),
        },
    ))
}
