//! Blocking error popup
//!
//! While an alert is up it swallows every key; only Enter or Esc dismiss it.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::fixed_centered_rect;
use crate::error::ViewerError;
use crate::theme::Base16Palette;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    error: ViewerError,
}

impl Alert {
    pub fn new(error: ViewerError) -> Self {
        Self { error }
    }

    pub fn error(&self) -> &ViewerError {
        &self.error
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Returns true when the key dismisses the alert
    pub fn handle_key(&self, key: KeyEvent) -> bool {
        matches!(key.code, KeyCode::Enter | KeyCode::Esc)
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let message = self.message();
        let (width, height) = popup_size(&message);
        let popup = fixed_centered_rect(width, height, area);
        f.render_widget(Clear, popup);

        let lines = vec![
            Line::from(Span::styled(message, Style::default().fg(palette.base_07))),
            Line::default(),
            Line::from(Span::styled(
                "[Enter] OK",
                Style::default()
                    .fg(palette.base_0a)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
        ];

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Error ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_08))
                    .style(Style::default().bg(palette.base_00)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, popup);
    }
}

/// Popup size for `message`: up to 70 columns wide, tall enough for the
/// wrapped message plus the button line
fn popup_size(message: &str) -> (u16, u16) {
    let text_width = u16::try_from(message.width()).unwrap_or(u16::MAX);
    let width = text_width.saturating_add(6).clamp(30, 70);
    let inner = usize::from(width - 4);
    let rows = message.width().div_ceil(inner).max(1);
    let height = u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(4);
    (width, height)
}
