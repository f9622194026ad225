use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction as LayoutDirection, Layout, Rect},
    style::Style,
    widgets::{Block, Borders},
};

use crate::backend::{BackendService, HttpBackend};
use crate::event_source::{Event, EventSource};
use crate::notification::NotificationManager;
use crate::pdf::{MupdfEngine, PdfResponse, PdfService, PixelSize, Viewport};
use crate::session::{Command, Direction, Effect, SelectedFile, Session};
use crate::settings::Settings;
use crate::theme::{Base16Palette, OCEANIC_NEXT};
use crate::widget::alert::Alert;
use crate::widget::file_picker::{FilePicker, PickerAction};
use crate::widget::help_popup::{HelpPopup, HelpPopupAction};
use crate::widget::page_view::PageView;
use crate::widget::status_bar;
use crate::widget::text_panel::TextPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// Popup currently covering the main view
pub enum Popup {
    FilePicker(FilePicker),
    Help(HelpPopup),
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Request line geometry with each render
    pub text_overlay: bool,
    pub translate_after_extract: bool,
    /// Where the file picker starts
    pub start_dir: PathBuf,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            text_overlay: true,
            translate_after_extract: true,
            start_dir: PathBuf::from("."),
        }
    }
}

impl AppOptions {
    pub fn from_settings(settings: &Settings, start_dir: PathBuf) -> Self {
        Self {
            text_overlay: settings.text_overlay,
            translate_after_extract: settings.translate_after_extract,
            start_dir,
        }
    }
}

/// Screen regions
struct AppLayout {
    page: Rect,
    text: Rect,
    status: Rect,
}

impl AppLayout {
    fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(area);
        let cols = Layout::default()
            .direction(LayoutDirection::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);
        Self {
            page: cols[0],
            text: cols[1],
            status: rows[1],
        }
    }

    /// Drawable area inside the page panel's border
    fn page_inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.page)
    }
}

pub struct App {
    session: Session,
    pdf: PdfService,
    backend: BackendService,
    viewport: Viewport,
    text_panel: TextPanel,
    pub notifications: NotificationManager,
    alert: Option<Alert>,
    popup: Option<Popup>,
    options: AppOptions,
    /// A render was asked for before the page area was known
    render_deferred: bool,
    palette: &'static Base16Palette,
}

impl App {
    pub fn new(pdf: PdfService, backend: BackendService, options: AppOptions) -> Self {
        let session = Session::new(options.translate_after_extract);
        let mut text_panel = TextPanel::default();
        text_panel.refresh(&session, &OCEANIC_NEXT);
        Self {
            session,
            pdf,
            backend,
            viewport: Viewport::default(),
            text_panel,
            notifications: NotificationManager::new(),
            alert: None,
            popup: None,
            options,
            render_deferred: false,
            palette: &OCEANIC_NEXT,
        }
    }

    /// Production wiring: MuPDF for parsing, HTTP for the backend
    pub fn from_settings(settings: &Settings, start_dir: PathBuf) -> Result<Self> {
        let http = HttpBackend::new(&settings.backend_url, settings.request_timeout())?;
        info!("Using backend at {}", http.base_url());
        Ok(Self::new(
            PdfService::spawn(MupdfEngine),
            BackendService::spawn(http, settings.translation_options()),
            AppOptions::from_settings(settings, start_dir),
        ))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn text_panel(&self) -> &TextPanel {
        &self.text_panel
    }

    /// Select a file as if picked in the file picker
    pub fn select_path(&mut self, path: impl Into<PathBuf>) {
        self.dispatch(Command::SelectFile(SelectedFile::from_path(path)));
    }

    /// Select and load in one step (command-line argument)
    pub fn open_file(&mut self, path: impl Into<PathBuf>) {
        self.select_path(path);
        if self.session.selection().is_some() {
            self.dispatch(Command::Load);
        }
    }

    /// Apply a command to the session and carry out its effects
    pub fn dispatch(&mut self, cmd: Command) {
        let effects = self.session.apply(cmd);
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Alert(err) => {
                    if err.is_blocking() {
                        error!("{err}");
                        self.alert = Some(Alert::new(err));
                    } else {
                        warn!("{err}");
                    }
                }
                Effect::Notify(message) => self.notifications.info(message),
                Effect::OpenDocument { request, file } => {
                    self.notifications.info(format!("Loading {}", file.name));
                    self.pdf.open(request, file);
                }
                Effect::ActivateDocument { request } => self.pdf.activate(request),
                Effect::CloseDocument => self.pdf.close(),
                Effect::ClearViewport => {
                    self.viewport.clear();
                    self.render_deferred = false;
                }
                Effect::RenderCurrentPage => self.request_render(),
                Effect::RefreshText => self.text_panel.refresh(&self.session, self.palette),
                Effect::SubmitExtraction {
                    generation,
                    ticket,
                    file,
                } => {
                    self.notifications.info("Extracting text…");
                    self.backend.extract(generation, ticket, file);
                }
                Effect::StartTranslation {
                    generation,
                    ticket,
                    results,
                } => {
                    self.notifications.info("Translating…");
                    self.backend.translate(generation, ticket, results);
                }
            }
        }
    }

    fn request_render(&mut self) {
        if !self.session.has_document() {
            return;
        }
        let container = self.viewport.container();
        if container.is_empty() {
            self.render_deferred = true;
            return;
        }
        self.render_deferred = false;
        let id = self.pdf.render(
            self.session.generation(),
            self.session.current_page(),
            container,
            self.options.text_overlay,
        );
        self.viewport.begin(id);
    }

    /// Recompute the page container for a screen of `area`. A changed
    /// container re-renders the current page at the new scale.
    pub fn sync_layout(&mut self, area: Rect) {
        let container = PixelSize::from_cells(AppLayout::new(area).page_inner());
        let changed = self.viewport.set_container(container);
        if changed {
            debug!(
                "Page container is now {}x{} px",
                container.width, container.height
            );
        }
        if changed || self.render_deferred {
            self.request_render();
        }
    }

    /// Drain both services. Returns true if anything arrived.
    pub fn poll_services(&mut self) -> bool {
        let mut changed = false;

        for response in self.pdf.poll_responses() {
            changed = true;
            match response.into_command() {
                Ok(cmd) => self.dispatch(cmd),
                Err(PdfResponse::Rendered {
                    id,
                    generation,
                    frame,
                }) => {
                    self.viewport
                        .present(id, generation, self.session.generation(), frame);
                }
                Err(PdfResponse::RenderFailed { id, detail, .. }) => {
                    if self.viewport.abandon(id) {
                        warn!("Render failed: {detail}");
                    }
                }
                Err(other) => debug!("Unhandled PDF response {other:?}"),
            }
        }

        for response in self.backend.poll_responses() {
            changed = true;
            self.dispatch(response.into());
        }

        changed
    }

    /// Poll until both services are idle or `timeout` passes. Returns
    /// false on timeout.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            self.poll_services();
            if self.pdf.is_idle() && self.backend.is_idle() {
                return true;
            }
            if std::time::Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if let Some(alert) = &self.alert {
            if alert.handle_key(key) {
                self.alert = None;
            }
            return None;
        }

        if let Some(popup) = &mut self.popup {
            match popup {
                Popup::FilePicker(picker) => match picker.handle_key(key) {
                    Some(PickerAction::Select(path)) => {
                        self.popup = None;
                        self.select_path(path);
                    }
                    Some(PickerAction::Close) => self.popup = None,
                    None => {}
                },
                Popup::Help(help) => {
                    if let Some(HelpPopupAction::Close) = help.handle_key(key) {
                        self.popup = None;
                    }
                }
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(AppAction::Quit);
            }
            KeyCode::Char('o') => self.open_picker(),
            KeyCode::Char('L') => self.dispatch(Command::Load),
            KeyCode::Char('D') => self.dispatch(Command::Delete),
            KeyCode::Char('x') => self.dispatch(Command::Extract),
            KeyCode::Char('t') => self.dispatch(Command::Translate),
            KeyCode::Char('h') | KeyCode::Char('p') | KeyCode::Left => {
                self.go_to_page(Direction::Previous);
            }
            KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Right => {
                self.go_to_page(Direction::Next);
            }
            KeyCode::Char('j') | KeyCode::Down => self.text_panel.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.text_panel.scroll_up(),
            KeyCode::Char('v') => self.toggle_overlay_highlight(),
            KeyCode::Char('y') => self.copy_overlay_text(),
            KeyCode::Char('?') => self.popup = Some(Popup::Help(HelpPopup::new())),
            KeyCode::Esc => {
                self.notifications.dismiss_current();
            }
            _ => {}
        }
        None
    }

    fn go_to_page(&mut self, direction: Direction) {
        let before = self.session.current_page();
        self.dispatch(Command::GoToPage(direction));
        if self.session.current_page() != before {
            self.text_panel.reset();
        }
    }

    fn open_picker(&mut self) {
        let dir = self
            .session
            .selection()
            .and_then(|file| file.path.parent())
            .filter(|dir| dir.is_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.options.start_dir.clone());
        self.popup = Some(Popup::FilePicker(FilePicker::new(dir)));
    }

    fn toggle_overlay_highlight(&mut self) {
        if !self.options.text_overlay {
            self.notifications.warn("Text overlay is disabled");
            return;
        }
        self.viewport.toggle_highlight();
    }

    fn copy_overlay_text(&mut self) {
        let Some(frame) = self.viewport.frame() else {
            return;
        };
        if frame.overlay.is_empty() {
            self.notifications.warn("No text on this page");
            return;
        }
        let text = frame.overlay_text();
        let lines = frame.overlay.len();
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
            Ok(()) => {
                debug!("Copied {lines} overlay lines to clipboard");
                self.notifications.info(format!("Copied {lines} lines"));
            }
            Err(e) => {
                warn!("Failed to copy text to clipboard: {e}");
                self.notifications
                    .error(format!("Failed to access clipboard: {e}"));
            }
        }
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        self.sync_layout(area);
        let layout = AppLayout::new(area);
        let palette = self.palette;

        let title = match self.session.document() {
            Some(info) => match &info.title {
                Some(title) => format!(
                    " {title} ({}/{}) ",
                    self.session.current_page(),
                    self.session.total_pages()
                ),
                None => format!(
                    " Page {}/{} ",
                    self.session.current_page(),
                    self.session.total_pages()
                ),
            },
            None => " Page ".to_string(),
        };
        let (_, border) = palette.panel_colors(true);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(layout.page);
        f.render_widget(block, layout.page);

        let placeholder = if self.session.is_loading() {
            "Loading…".to_string()
        } else if self.session.has_document() {
            format!("Rendering page {}…", self.session.current_page())
        } else {
            "No document loaded. Press o to pick a PDF.".to_string()
        };
        f.render_widget(
            PageView::new(self.viewport.frame(), palette)
                .highlight_overlay(self.viewport.highlight_overlay())
                .placeholder(&placeholder),
            inner,
        );

        self.text_panel
            .render(f, layout.text, &self.session, palette);
        status_bar::render(
            f,
            layout.status,
            &self.session,
            self.notifications.current(),
            palette,
        );

        match &mut self.popup {
            Some(Popup::FilePicker(picker)) => picker.render(f, area, palette),
            Some(Popup::Help(help)) => help.render(f, area, palette),
            None => {}
        }
        if let Some(alert) = &self.alert {
            alert.render(f, area, palette);
        }
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let size = terminal.size()?;
    app.sync_layout(Rect::new(0, 0, size.width, size.height));
    let mut first_render = true;

    loop {
        let mut events_processed = 0;
        let mut should_quit = false;

        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;

            match event {
                Event::Key(key) => {
                    if app.handle_key(key) == Some(AppAction::Quit) {
                        should_quit = true;
                    }
                }
                Event::Resize(cols, rows) => app.sync_layout(Rect::new(0, 0, cols, rows)),
                _ => {}
            }

            if should_quit {
                break;
            }
        }

        let mut needs_redraw = events_processed > 0 || first_render;
        first_render = false;

        if app.poll_services() {
            needs_redraw = true;
        }
        if app.notifications.update() {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        if should_quit {
            info!("Quitting");
            return Ok(());
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let _ = event_source.poll(tick_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TranslationOptions;
    use crate::error::ViewerError;
    use crate::event_source::SimulatedEventSource;
    use crate::test_utils::fakes::{FakeBackend, FakePdfEngine};

    const WAIT: Duration = Duration::from_secs(5);

    fn app_with(backend: FakeBackend) -> App {
        let mut app = App::new(
            PdfService::spawn(FakePdfEngine),
            BackendService::spawn(backend, TranslationOptions::default()),
            AppOptions {
                translate_after_extract: false,
                ..AppOptions::default()
            },
        );
        app.sync_layout(Rect::new(0, 0, 80, 24));
        app
    }

    fn press(app: &mut App, c: char) -> Option<AppAction> {
        let Event::Key(key) = SimulatedEventSource::char_key(c) else {
            unreachable!()
        };
        app.handle_key(key)
    }

    #[test]
    fn load_without_selection_raises_blocking_alert() {
        let mut app = app_with(FakeBackend::default());
        press(&mut app, 'L');
        assert_eq!(app.alert().map(Alert::error), Some(&ViewerError::NoFileSelected));

        // Swallowed while the alert is up
        assert_eq!(press(&mut app, 'q'), None);
        let Event::Key(enter) = SimulatedEventSource::key_event(KeyCode::Enter, KeyModifiers::empty())
        else {
            unreachable!()
        };
        app.handle_key(enter);
        assert!(app.alert().is_none());
        assert_eq!(press(&mut app, 'q'), Some(AppAction::Quit));
    }

    #[test]
    fn loaded_document_renders_first_page_to_fit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, FakePdfEngine::document(3)).unwrap();

        let mut app = app_with(FakeBackend::default());
        app.open_file(&path);
        assert!(app.settle(WAIT));

        assert_eq!(app.session().total_pages(), 3);
        let frame = app.viewport().frame().expect("page 1 rendered");
        assert_eq!(frame.page, 1);
        let container = app.viewport().container();
        assert!(frame.raster.width <= container.width);
        assert!(frame.raster.height <= container.height);
    }

    #[test]
    fn resize_rerenders_at_new_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, FakePdfEngine::document(1)).unwrap();

        let mut app = app_with(FakeBackend::default());
        app.open_file(&path);
        assert!(app.settle(WAIT));
        let before = app.viewport().frame().unwrap().scale;

        app.sync_layout(Rect::new(0, 0, 160, 60));
        assert!(app.settle(WAIT));
        let after = app.viewport().frame().unwrap().scale;

        assert!(after > before);
    }
}
