//! Half-block raster widget
//!
//! Each terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Widget, Wrap},
};

use crate::pdf::RenderedPage;
use crate::theme::Base16Palette;

const UPPER_HALF: &str = "▀";

pub struct PageView<'a> {
    frame: Option<&'a RenderedPage>,
    highlight_overlay: bool,
    placeholder: &'a str,
    palette: &'a Base16Palette,
}

impl<'a> PageView<'a> {
    pub fn new(frame: Option<&'a RenderedPage>, palette: &'a Base16Palette) -> Self {
        Self {
            frame,
            highlight_overlay: false,
            placeholder: "",
            palette,
        }
    }

    pub fn highlight_overlay(mut self, highlight: bool) -> Self {
        self.highlight_overlay = highlight;
        self
    }

    /// Text shown when there is no frame
    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame else {
            let y = area.y + area.height / 2;
            let line_area = Rect::new(area.x, y, area.width, 1.min(area.height));
            Paragraph::new(Line::from(self.placeholder).centered())
                .style(Style::default().fg(self.palette.base_03))
                .wrap(Wrap { trim: true })
                .render(line_area, buf);
            return;
        };

        let raster = &frame.raster;
        let cols = (raster.width.min(u32::from(area.width))) as u16;
        let rows = (raster.height.div_ceil(2).min(u32::from(area.height))) as u16;
        let x0 = area.x + (area.width - cols) / 2;
        let y0 = area.y + (area.height - rows) / 2;

        for cy in 0..rows {
            for cx in 0..cols {
                let px = u32::from(cx);
                let top_y = u32::from(cy) * 2;
                let top = raster.pixel(px, top_y).map(to_color);
                let bottom = raster.pixel(px, top_y + 1).map(to_color);

                let mut style = Style::default()
                    .fg(top.unwrap_or(Color::Reset))
                    .bg(bottom.unwrap_or(Color::Reset));
                if self.highlight_overlay && covers(frame, px, top_y) {
                    style = style.add_modifier(Modifier::REVERSED);
                }

                let cell = &mut buf[(x0 + cx, y0 + cy)];
                cell.set_symbol(UPPER_HALF);
                cell.set_style(style);
            }
        }
    }
}

fn to_color([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

/// Whether the cell whose upper pixel is at (x, y) intersects an overlay span
fn covers(frame: &RenderedPage, x: u32, y: u32) -> bool {
    let (x, top, bottom) = (x as f32, y as f32, y as f32 + 2.0);
    frame
        .overlay
        .iter()
        .any(|span| x + 1.0 > span.x0 && x < span.x1 && bottom > span.y0 && top < span.y1)
}
