//! Extracted text for the current page

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::model::OcrText;
use crate::session::{ExtractionState, Session};
use crate::theme::Base16Palette;

pub const NO_TEXT_YET: &str = "No extracted text yet.";
pub const NO_TEXT_FOR_PAGE: &str = "No extracted text for this page.";

/// Lines describing the session's current page entry
pub fn page_text_lines(session: &Session, palette: &Base16Palette) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(palette.base_0d)
        .add_modifier(Modifier::BOLD);
    let body = Style::default().fg(palette.base_05);
    let muted = Style::default().fg(palette.base_03);

    if !session.has_document() || session.results().is_empty() {
        let message = match session.extraction() {
            ExtractionState::Extracting { .. } => "Extracting text…",
            _ => NO_TEXT_YET,
        };
        return vec![Line::from(Span::styled(message, muted))];
    }

    let page = session.current_page();
    let Some(entry) = session.results().page(page) else {
        return vec![Line::from(Span::styled(
            format!("No extracted text for page {page} yet."),
            muted,
        ))];
    };

    let mut lines = vec![Line::from(Span::styled(format!("Page {page}:"), heading))];
    match entry.body_text() {
        Some(text) => lines.extend(text.lines().map(|l| Line::from(Span::styled(l.to_string(), body)))),
        None => lines.push(Line::from(Span::styled(NO_TEXT_FOR_PAGE, muted))),
    }

    let ocr: Vec<String> = match &entry.image_ocr_text {
        OcrText::None => Vec::new(),
        OcrText::Single(text) if text.is_empty() => Vec::new(),
        OcrText::Single(text) => vec![text.clone()],
        OcrText::Many(items) => items
            .iter()
            .enumerate()
            .map(|(idx, text)| format!("[Image {}]: {text}", idx + 1))
            .collect(),
    };
    if !ocr.is_empty() || matches!(entry.image_ocr_text, OcrText::Many(_)) {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("Image OCR Text:", heading)));
        for text in ocr {
            lines.extend(text.lines().map(|l| Line::from(Span::styled(l.to_string(), body))));
        }
    }

    lines
}

/// Scrollable panel around [`page_text_lines`]. Content is rebuilt only on
/// [`TextPanel::refresh`].
#[derive(Debug, Default)]
pub struct TextPanel {
    scroll: u16,
    lines: Vec<Line<'static>>,
}

impl TextPanel {
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// Rebuild the content from the session, keeping the scroll position
    /// within the new content
    pub fn refresh(&mut self, session: &Session, palette: &Base16Palette) {
        self.lines = page_text_lines(session, palette);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Start from the top
    pub fn reset(&mut self) {
        self.scroll = 0;
    }

    fn max_scroll(&self) -> u16 {
        u16::try_from(self.lines.len().saturating_sub(1)).unwrap_or(u16::MAX)
    }

    pub fn render(&self, f: &mut Frame, area: Rect, session: &Session, palette: &Base16Palette) {
        let title = match session.extraction() {
            ExtractionState::Translating { done, total, .. } => {
                format!(" Text (translating {done}/{total}) ")
            }
            _ => " Text ".to_string(),
        };
        let (_, border) = palette.panel_colors(false);

        let paragraph = Paragraph::new(self.lines.clone())
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        f.render_widget(paragraph, area);
    }
}
