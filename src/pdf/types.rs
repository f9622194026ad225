//! Core types for PDF rendering

/// Unscaled page dimensions in PDF points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Size of a render target in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel area behind a block of terminal cells drawn with half blocks:
    /// each cell shows two vertically stacked pixels.
    #[must_use]
    pub fn from_cells(area: ratatui::layout::Rect) -> Self {
        Self::new(u32::from(area.width), u32::from(area.height) * 2)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Raw rendered page image (3 bytes per pixel: R, G, B)
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Raster {
    /// Solid raster, mostly useful for tests and placeholders
    #[must_use]
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgb);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// RGB value at (x, y), `None` outside the raster
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels
            .get(idx..idx + 3)
            .map(|px| [px[0], px[1], px[2]])
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// One line of page text positioned in raster pixel coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct TextSpan {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub text: String,
}

/// A fully rendered page: the raster first, then the text overlay
#[derive(Clone, Debug)]
pub struct RenderedPage {
    /// 1-based page number
    pub page: usize,
    pub scale: f32,
    pub container: PixelSize,
    pub raster: Raster,
    /// Empty when the overlay is disabled
    pub overlay: Vec<TextSpan>,
}

impl RenderedPage {
    /// Overlay text in reading order, one span per line
    pub fn overlay_text(&self) -> String {
        self.overlay
            .iter()
            .map(|span| span.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Metadata of a parsed document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub title: Option<String>,
}
