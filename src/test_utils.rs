pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, KeyModifiers, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events
                .push(SimulatedEventSource::key_event(code, KeyModifiers::empty()));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        pub fn press_esc(self) -> Self {
            self.press_key(KeyCode::Esc)
        }

        /// Next page (press 'l')
        pub fn next_page(self) -> Self {
            self.press_char('l')
        }

        /// Previous page (press 'h')
        pub fn prev_page(self) -> Self {
            self.press_char('h')
        }

        pub fn resize(mut self, cols: u16, rows: u16) -> Self {
            self.events.push(SimulatedEventSource::resize(cols, rows));
            self
        }

        /// Quit the application (press 'q')
        pub fn quit(self) -> Self {
            self.press_char('q')
        }

        /// Build the simulated event source
        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }

        pub fn events(&self) -> &[Event] {
            &self.events
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            // Trim trailing whitespace from each line
            lines.push(line.trim_end().to_string());
        }

        // Remove trailing empty lines
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

/// In-process stand-ins for the PDF engine and the backend
pub mod fakes {
    use std::sync::{Arc, Mutex, PoisonError};

    use flume::{Receiver, Sender};

    use crate::backend::{BackendApi, BackendError, TranslationRequest};
    use crate::model::{PageResult, ResultSet};
    use crate::pdf::{
        DocumentInfo, EngineError, PageSize, PageSource, PdfEngine, Raster, TextSpan,
    };
    use crate::session::LoadedFile;

    const MAGIC: &str = "FAKEPDF ";

    /// Parses `FAKEPDF <pages>` documents with 100x100 pages
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FakePdfEngine;

    impl FakePdfEngine {
        /// Bytes of a fake document with `pages` pages
        pub fn document(pages: usize) -> Vec<u8> {
            format!("{MAGIC}{pages}\n").into_bytes()
        }
    }

    impl PdfEngine for FakePdfEngine {
        fn parse(&self, bytes: &[u8]) -> Result<Box<dyn PageSource>, EngineError> {
            let page_count = std::str::from_utf8(bytes)
                .ok()
                .and_then(|text| text.strip_prefix(MAGIC))
                .and_then(|rest| rest.trim().parse().ok())
                .ok_or_else(|| EngineError::generic("Invalid PDF structure"))?;
            Ok(Box::new(FakeDocument { page_count }))
        }
    }

    struct FakeDocument {
        page_count: usize,
    }

    impl FakeDocument {
        fn check(&self, page: usize) -> Result<(), EngineError> {
            if page == 0 || page > self.page_count {
                return Err(EngineError::PageOutOfRange {
                    page,
                    count: self.page_count,
                });
            }
            Ok(())
        }
    }

    impl PageSource for FakeDocument {
        fn info(&self) -> DocumentInfo {
            DocumentInfo {
                page_count: self.page_count,
                title: None,
            }
        }

        fn page_size(&self, page: usize) -> Result<PageSize, EngineError> {
            self.check(page)?;
            Ok(PageSize::new(100.0, 100.0))
        }

        fn rasterize(&self, page: usize, scale: f32) -> Result<Raster, EngineError> {
            self.check(page)?;
            let side = ((100.0 * scale).round() as u32).max(1);
            Ok(Raster::filled(side, side, [255, 255, 255]))
        }

        fn text_spans(&self, page: usize, scale: f32) -> Result<Vec<TextSpan>, EngineError> {
            self.check(page)?;
            Ok(vec![TextSpan {
                x0: 10.0 * scale,
                y0: 10.0 * scale,
                x1: 90.0 * scale,
                y1: 20.0 * scale,
                text: format!("Page {page} text"),
            }])
        }
    }

    #[derive(Default)]
    struct FakeBackendState {
        pages: Vec<PageResult>,
        fail_extraction: bool,
        fail_translation: bool,
        gate: Option<Receiver<()>>,
        extract_calls: usize,
        translations: Vec<TranslationRequest>,
    }

    /// Scripted backend. Clones share state, so a test can keep one handle
    /// while the worker thread owns another.
    ///
    /// Translation prefixes the text with the target language in brackets.
    #[derive(Clone, Default)]
    pub struct FakeBackend {
        state: Arc<Mutex<FakeBackendState>>,
    }

    impl FakeBackend {
        pub fn with_pages(pages: Vec<PageResult>) -> Self {
            let backend = Self::default();
            backend.lock().pages = pages;
            backend
        }

        pub fn failing_extraction() -> Self {
            let backend = Self::default();
            backend.lock().fail_extraction = true;
            backend
        }

        pub fn failing_translation(self) -> Self {
            self.lock().fail_translation = true;
            self
        }

        /// Extraction blocks until the returned sender fires once
        pub fn gated(self) -> (Self, Sender<()>) {
            let (tx, rx) = flume::unbounded();
            self.lock().gate = Some(rx);
            (self, tx)
        }

        pub fn extract_calls(&self) -> usize {
            self.lock().extract_calls
        }

        pub fn translation_requests(&self) -> Vec<TranslationRequest> {
            self.lock().translations.clone()
        }

        pub fn translated_texts(&self) -> Vec<String> {
            self.lock()
                .translations
                .iter()
                .map(|r| r.text.clone())
                .collect()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, FakeBackendState> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl BackendApi for FakeBackend {
        fn extract_text(&self, _file: &LoadedFile) -> Result<ResultSet, BackendError> {
            let gate = {
                let mut state = self.lock();
                state.extract_calls += 1;
                state.gate.clone()
            };
            if let Some(gate) = gate {
                let _ = gate.recv();
            }

            let state = self.lock();
            if state.fail_extraction {
                return Err(BackendError::Status {
                    status: 500,
                    body: "extraction failed".to_string(),
                });
            }
            Ok(ResultSet::new(state.pages.clone()))
        }

        fn translate(&self, request: &TranslationRequest) -> Result<String, BackendError> {
            let mut state = self.lock();
            state.translations.push(request.clone());
            if state.fail_translation {
                return Err(BackendError::Other(
                    "translation service unavailable".to_string(),
                ));
            }
            Ok(format!("[{}] {}", request.target_language, request.text))
        }
    }
}
