//! Controls, page indicator and pipeline progress

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::notification::Notification;
use crate::session::{ExtractionState, Session};
use crate::theme::Base16Palette;
use unicode_width::UnicodeWidthStr;

/// Control labels with the state that enables them
pub fn controls_line(session: &Session, palette: &Base16Palette) -> Line<'static> {
    let controls = session.controls();
    let items = [
        ("o", "Open", true),
        ("L", "Load", controls.load),
        ("D", "Delete", controls.delete),
        ("x", "Extract", controls.extract),
        ("t", "Translate", controls.translate),
        ("←", "Prev", controls.previous),
        ("→", "Next", controls.next),
    ];

    let mut spans = Vec::with_capacity(items.len() * 2);
    for (key, label, enabled) in items {
        spans.push(Span::styled(
            format!("[{key}]{label}"),
            palette.control_style(enabled),
        ));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

/// Page position and pipeline state, e.g. "Page 2/5 · translating 3/8"
pub fn progress_text(session: &Session) -> String {
    let mut parts = Vec::new();
    if session.is_loading() {
        parts.push("loading…".to_string());
    }
    if session.has_document() {
        parts.push(format!(
            "Page {}/{}",
            session.current_page(),
            session.total_pages()
        ));
    }
    match session.extraction() {
        ExtractionState::Idle => {}
        ExtractionState::Extracting { .. } => parts.push("extracting…".to_string()),
        ExtractionState::Translating { done, total, .. } => {
            parts.push(format!("translating {done}/{total}"));
        }
        ExtractionState::Ready => parts.push(format!("{} pages extracted", session.results().len())),
    }
    parts.join(" · ")
}

/// Left side: selected file or latest notification
pub fn message_line(
    session: &Session,
    notification: Option<&Notification>,
    palette: &Base16Palette,
) -> Line<'static> {
    if let Some(n) = notification {
        return Line::from(Span::styled(
            format!(" {} ", n.message),
            palette.notification_style(n.level),
        ));
    }

    let text = match (session.loaded_file(), session.selection()) {
        (Some(loaded), Some(selected)) if loaded.file != *selected => {
            format!("{} (selected: {})", loaded.file.name, selected.name)
        }
        (Some(loaded), _) => loaded.file.name.clone(),
        (None, Some(selected)) => format!("Selected: {} - press L to load", selected.name),
        (None, None) => "No file selected - press o to open".to_string(),
    };
    Line::from(Span::styled(text, Style::default().fg(palette.base_04)))
}

pub fn render(
    f: &mut Frame,
    area: Rect,
    session: &Session,
    notification: Option<&Notification>,
    palette: &Base16Palette,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    f.render_widget(
        Paragraph::new(controls_line(session, palette)).style(Style::default().bg(palette.base_01)),
        rows[0],
    );

    let progress = progress_text(session);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(progress.width() as u16 + 1),
        ])
        .split(rows[1]);
    f.render_widget(Paragraph::new(message_line(session, notification, palette)), cols[0]);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            progress,
            Style::default().fg(palette.base_0c),
        )))
        .right_aligned(),
        cols[1],
    );
}
