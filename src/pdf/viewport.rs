//! Fit-to-container page rendering
//!
//! [`render_page`] runs on the PDF worker and produces a complete frame.
//! [`Viewport`] lives on the UI side and holds at most one frame: every new
//! render replaces the previous raster and overlay wholesale, so repeated
//! renders of the same page (resize, navigation back and forth) never
//! stack stale content.

use std::sync::Arc;

use log::debug;

use super::engine::{EngineError, PageSource};
use super::request::RequestId;
use super::types::{PageSize, PixelSize, RenderedPage};
use crate::session::Generation;

/// Largest scale at which the whole page fits inside the container
#[must_use]
pub fn fit_scale(container: PixelSize, page: PageSize) -> f32 {
    if page.width <= 0.0 || page.height <= 0.0 || container.is_empty() {
        return 0.0;
    }
    let scale_width = container.width as f32 / page.width;
    let scale_height = container.height as f32 / page.height;
    scale_width.min(scale_height)
}

/// Render a 1-based page into a fresh frame sized to fit `container`.
///
/// The raster is produced before the overlay is requested.
pub fn render_page(
    doc: &dyn PageSource,
    page: usize,
    container: PixelSize,
    with_overlay: bool,
) -> Result<RenderedPage, EngineError> {
    let size = doc.page_size(page)?;
    let scale = fit_scale(container, size);
    if !scale.is_finite() || scale <= 0.0 {
        return Err(EngineError::generic(format!(
            "cannot fit {}x{} page into {}x{} viewport",
            size.width, size.height, container.width, container.height
        )));
    }

    let raster = doc.rasterize(page, scale)?;
    let overlay = if with_overlay {
        doc.text_spans(page, scale)?
    } else {
        Vec::new()
    };
    debug!("Page {page} rendered at scale {scale:.3}");

    Ok(RenderedPage {
        page,
        scale,
        container,
        raster,
        overlay,
    })
}

/// The single frame currently on screen
#[derive(Debug, Default)]
pub struct Viewport {
    container: PixelSize,
    frame: Option<Arc<RenderedPage>>,
    pending: Option<RequestId>,
    highlight_overlay: bool,
}

impl Viewport {
    pub fn container(&self) -> PixelSize {
        self.container
    }

    /// Record the container size. Returns true if it changed.
    pub fn set_container(&mut self, container: PixelSize) -> bool {
        if self.container == container {
            return false;
        }
        self.container = container;
        true
    }

    pub fn frame(&self) -> Option<&RenderedPage> {
        self.frame.as_deref()
    }

    pub fn is_rendering(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the frame and forget any in-flight render
    pub fn clear(&mut self) {
        self.frame = None;
        self.pending = None;
    }

    /// A new render was requested; responses to older requests are stale
    pub fn begin(&mut self, id: RequestId) {
        self.pending = Some(id);
    }

    /// Install a finished frame if it answers the latest request under the
    /// current document. Returns false for stale frames.
    pub fn present(
        &mut self,
        id: RequestId,
        generation: Generation,
        current: Generation,
        frame: Arc<RenderedPage>,
    ) -> bool {
        if self.pending != Some(id) || generation != current {
            debug!("Dropping stale frame {id:?} for page {}", frame.page);
            return false;
        }
        self.pending = None;
        self.frame = Some(frame);
        true
    }

    /// A render failed; keep whatever frame is on screen
    pub fn abandon(&mut self, id: RequestId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn highlight_overlay(&self) -> bool {
        self.highlight_overlay
    }

    pub fn toggle_highlight(&mut self) {
        self.highlight_overlay = !self.highlight_overlay;
    }
}
