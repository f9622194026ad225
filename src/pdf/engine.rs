//! PDF parsing collaborator
//!
//! [`PdfEngine`] turns bytes into a [`PageSource`]. The production engine
//! is MuPDF; tests plug in their own. Parsed documents are not `Send`, so
//! they are created, used and dropped on the PDF worker thread.

use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap, TextPageFlags};

use super::types::{DocumentInfo, PageSize, Raster, TextSpan};

/// Errors from the PDF engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("{detail}")]
    Generic { detail: String },
}

impl EngineError {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// A parsed document. Page numbers are 1-based.
pub trait PageSource {
    fn info(&self) -> DocumentInfo;

    fn page_size(&self, page: usize) -> Result<PageSize, EngineError>;

    fn rasterize(&self, page: usize, scale: f32) -> Result<Raster, EngineError>;

    /// Text lines with bounding boxes multiplied by `scale`
    fn text_spans(&self, page: usize, scale: f32) -> Result<Vec<TextSpan>, EngineError>;
}

/// Parses raw bytes into a document
pub trait PdfEngine: Send + 'static {
    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn PageSource>, EngineError>;
}

/// MuPDF-backed engine
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfEngine;

impl PdfEngine for MupdfEngine {
    fn parse(&self, bytes: &[u8]) -> Result<Box<dyn PageSource>, EngineError> {
        let doc = Document::from_bytes(bytes, "application/pdf")?;
        let page_count = doc.page_count()?;
        let page_count = usize::try_from(page_count).unwrap_or(0);
        let title = doc
            .metadata(mupdf::MetadataName::Title)
            .ok()
            .filter(|t| !t.is_empty());

        Ok(Box::new(MupdfDocument {
            doc,
            page_count,
            title,
        }))
    }
}

struct MupdfDocument {
    doc: Document,
    page_count: usize,
    title: Option<String>,
}

impl MupdfDocument {
    fn load(&self, page: usize) -> Result<Page, EngineError> {
        if page == 0 || page > self.page_count {
            return Err(EngineError::PageOutOfRange {
                page,
                count: self.page_count,
            });
        }
        Ok(self.doc.load_page((page - 1) as i32)?)
    }
}

impl PageSource for MupdfDocument {
    fn info(&self) -> DocumentInfo {
        DocumentInfo {
            page_count: self.page_count,
            title: self.title.clone(),
        }
    }

    fn page_size(&self, page: usize) -> Result<PageSize, EngineError> {
        let bounds = self.load(page)?.bounds()?;
        Ok(PageSize::new(bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<Raster, EngineError> {
        let page = self.load(page)?;
        let rgb = Colorspace::device_rgb();
        let pixmap = page.to_pixmap(&Matrix::new_scale(scale, scale), &rgb, false, false)?;
        let pixels = pixmap_to_rgb(&pixmap)?;
        Ok(Raster {
            pixels,
            width: pixmap.width(),
            height: pixmap.height(),
        })
    }

    fn text_spans(&self, page: usize, scale: f32) -> Result<Vec<TextSpan>, EngineError> {
        let page = self.load(page)?;
        let text_page = page.to_text_page(TextPageFlags::empty())?;
        let mut spans = Vec::new();

        for block in text_page.blocks() {
            if block.r#type() != TextBlockType::Text {
                continue;
            }
            for line in block.lines() {
                let text: String = line.chars().filter_map(|ch| ch.char()).collect();
                if text.trim().is_empty() {
                    continue;
                }
                let bbox = line.bounds();
                spans.push(TextSpan {
                    x0: bbox.x0 * scale,
                    y0: bbox.y0 * scale,
                    x1: bbox.x1 * scale,
                    y1: bbox.y1 * scale,
                    text,
                });
            }
        }

        Ok(spans)
    }
}

fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, EngineError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(EngineError::generic(format!(
            "Unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;

    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(EngineError::generic("Pixmap buffer size mismatch"));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}
