//! File picker popup
//!
//! Lists every entry of a directory, directories first. Non-PDF files are
//! listed too: the session decides what it accepts.

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};
use log::error;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use super::centered_rect;
use crate::theme::Base16Palette;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

pub enum PickerAction {
    Select(PathBuf),
    Close,
}

pub struct FilePicker {
    dir: PathBuf,
    entries: Vec<PickerEntry>,
    state: ListState,
}

impl FilePicker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let mut picker = Self {
            dir: PathBuf::new(),
            entries: Vec::new(),
            state: ListState::default(),
        };
        picker.change_dir(dir.into());
        picker
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[PickerEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&PickerEntry> {
        self.state.selected().and_then(|idx| self.entries.get(idx))
    }

    fn change_dir(&mut self, dir: PathBuf) {
        self.entries = list_dir(&dir);
        self.dir = dir;
        self.state
            .select(if self.entries.is_empty() { None } else { Some(0) });
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PickerAction> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_by(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_by(-1);
                None
            }
            KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
                if let Some(parent) = self.dir.parent() {
                    self.change_dir(parent.to_path_buf());
                }
                None
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                let entry = self.selected()?.clone();
                if entry.is_dir {
                    self.change_dir(entry.path);
                    None
                } else {
                    Some(PickerAction::Select(entry.path))
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => Some(PickerAction::Close),
            _ => None,
        }
    }

    fn move_by(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0) as isize;
        let last = self.entries.len() as isize - 1;
        self.state.select(Some((current + delta).clamp(0, last) as usize));
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let popup = centered_rect(60, 70, area);
        f.render_widget(Clear, popup);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let (label, color) = if entry.is_dir {
                    (format!("{}/", entry.name), palette.base_0d)
                } else if entry.name.to_ascii_lowercase().ends_with(".pdf") {
                    (entry.name.clone(), palette.base_07)
                } else {
                    (entry.name.clone(), palette.base_03)
                };
                ListItem::new(Line::from(Span::styled(label, Style::default().fg(color))))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!(" Open: {} ", self.dir.display()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_0c))
                    .style(Style::default().bg(palette.base_00)),
            )
            .highlight_style(
                Style::default()
                    .bg(palette.base_02)
                    .fg(palette.base_06)
                    .add_modifier(Modifier::BOLD),
            );

        f.render_stateful_widget(list, popup, &mut self.state);
    }
}

fn list_dir(dir: &Path) -> Vec<PickerEntry> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            error!("Failed to read directory {}: {e}", dir.display());
            return Vec::new();
        }
    };

    let mut entries: Vec<PickerEntry> = read
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                return None;
            }
            Some(PickerEntry {
                is_dir: entry.path().is_dir(),
                path: entry.path(),
                name,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    entries
}
