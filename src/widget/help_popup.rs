use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::fixed_centered_rect;
use crate::theme::Base16Palette;

pub enum HelpPopupAction {
    Close,
}

const KEYS: &[(&str, &str)] = &[
    ("o", "Open the file picker"),
    ("L", "Load the selected file"),
    ("D", "Delete the loaded document"),
    ("h / Left / p", "Previous page"),
    ("l / Right / n", "Next page"),
    ("x", "Extract text"),
    ("t", "Translate extracted text"),
    ("j / k", "Scroll the text panel"),
    ("v", "Highlight the text overlay"),
    ("y", "Copy the page's overlay text"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

#[derive(Debug, Default)]
pub struct HelpPopup {
    scroll_offset: usize,
}

impl HelpPopup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let height = KEYS.len() as u16 + 2;
        let popup_area = fixed_centered_rect(48, height, area);
        f.render_widget(Clear, popup_area);

        let lines: Vec<Line> = KEYS
            .iter()
            .skip(self.scroll_offset)
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(
                        format!("  {key:<14}"),
                        Style::default()
                            .fg(palette.base_0a)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*action, Style::default().fg(palette.base_05)),
                ])
            })
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help - Press ? or ESC to close ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_0c))
                    .style(Style::default().bg(palette.base_00)),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, popup_area);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<HelpPopupAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.scroll_offset < KEYS.len().saturating_sub(1) {
                    self.scroll_offset += 1;
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => Some(HelpPopupAction::Close),
            _ => None,
        }
    }
}
