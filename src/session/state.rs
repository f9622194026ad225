//! Document session state machine
//!
//! The session owns everything the viewer knows about the current file:
//! the pending selection, the parsed document's metadata, the page
//! counters and the extraction results. It performs no I/O. Commands come
//! in (user actions and service responses), effects come out, and the app
//! executes the effects against the PDF and backend services.
//!
//! Every asynchronous response carries the generation (and, for the
//! pipeline, the ticket) it was issued under. Responses from an older
//! document or an older extraction are dropped without touching state.

use log::{debug, info, warn};

use super::file::{LoadedFile, SelectedFile};
use crate::error::ViewerError;
use crate::model::{FragmentId, ResultSet};
use crate::pdf::DocumentInfo;

/// Identity of the loaded document; bumped on every load and delete
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Page navigation direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Progress of the extraction/translation pipeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtractionState {
    #[default]
    Idle,
    Extracting {
        ticket: u64,
    },
    Translating {
        ticket: u64,
        done: usize,
        failed: usize,
        total: usize,
    },
    Ready,
}

impl ExtractionState {
    fn ticket(self) -> Option<u64> {
        match self {
            Self::Extracting { ticket } | Self::Translating { ticket, .. } => Some(ticket),
            Self::Idle | Self::Ready => None,
        }
    }

    pub fn is_busy(self) -> bool {
        self.ticket().is_some()
    }
}

/// Which controls are currently usable
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub load: bool,
    pub delete: bool,
    pub extract: bool,
    pub translate: bool,
    pub previous: bool,
    pub next: bool,
}

/// Inputs to the session
#[derive(Clone, Debug)]
pub enum Command {
    SelectFile(SelectedFile),
    Load,
    DocumentOpened {
        request: u64,
        info: DocumentInfo,
        file: LoadedFile,
    },
    DocumentFailed {
        request: u64,
        detail: String,
    },
    Delete,
    GoToPage(Direction),
    Extract,
    ExtractionFinished {
        generation: Generation,
        ticket: u64,
        results: ResultSet,
    },
    ExtractionFailed {
        generation: Generation,
        ticket: u64,
        detail: String,
    },
    Translate,
    FragmentTranslated {
        generation: Generation,
        ticket: u64,
        id: FragmentId,
        text: String,
    },
    FragmentFailed {
        generation: Generation,
        ticket: u64,
        id: FragmentId,
    },
    TranslationFinished {
        generation: Generation,
        ticket: u64,
    },
}

/// Work the app must carry out after a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Blocking, user-facing error
    Alert(ViewerError),
    /// Transient status message
    Notify(String),
    /// Read and parse the file off the UI thread
    OpenDocument { request: u64, file: SelectedFile },
    /// Render from the parse of load `request` from now on
    ActivateDocument { request: u64 },
    /// Drop the parsed document
    CloseDocument,
    /// Discard the current raster and overlay
    ClearViewport,
    /// Render `current_page` into a fresh frame
    RenderCurrentPage,
    /// Text panel content changed
    RefreshText,
    SubmitExtraction {
        generation: Generation,
        ticket: u64,
        file: LoadedFile,
    },
    StartTranslation {
        generation: Generation,
        ticket: u64,
        results: ResultSet,
    },
}

/// The viewer's document session
#[derive(Debug)]
pub struct Session {
    selection: Option<SelectedFile>,
    pending_load: Option<u64>,
    next_load_request: u64,
    loaded: Option<LoadedFile>,
    document: Option<DocumentInfo>,
    current_page: usize,
    total_pages: usize,
    results: ResultSet,
    generation: Generation,
    extraction: ExtractionState,
    next_ticket: u64,
    translate_after_extract: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Session {
    #[must_use]
    pub fn new(translate_after_extract: bool) -> Self {
        Self {
            selection: None,
            pending_load: None,
            next_load_request: 1,
            loaded: None,
            document: None,
            current_page: 1,
            total_pages: 0,
            results: ResultSet::default(),
            generation: Generation::default(),
            extraction: ExtractionState::Idle,
            next_ticket: 1,
            translate_after_extract,
        }
    }

    pub fn selection(&self) -> Option<&SelectedFile> {
        self.selection.as_ref()
    }

    pub fn loaded_file(&self) -> Option<&LoadedFile> {
        self.loaded.as_ref()
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// 1-based current page
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn extraction(&self) -> ExtractionState {
        self.extraction
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn translate_after_extract(&self) -> bool {
        self.translate_after_extract
    }

    pub fn set_translate_after_extract(&mut self, enabled: bool) {
        self.translate_after_extract = enabled;
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        let has_doc = self.has_document();
        Controls {
            load: self.selection.is_some(),
            delete: has_doc,
            extract: has_doc,
            translate: has_doc && !self.results.is_empty() && !self.extraction.is_busy(),
            previous: has_doc && self.current_page > 1,
            next: has_doc && self.current_page < self.total_pages,
        }
    }

    /// Apply a command and return the resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::SelectFile(file) => self.select_file(file),
            Command::Load => self.load(),
            Command::DocumentOpened {
                request,
                info,
                file,
            } => self.document_opened(request, info, file),
            Command::DocumentFailed { request, detail } => self.document_failed(request, detail),
            Command::Delete => self.delete(),
            Command::GoToPage(direction) => self.go_to_page(direction),
            Command::Extract => self.extract(),
            Command::ExtractionFinished {
                generation,
                ticket,
                results,
            } => self.extraction_finished(generation, ticket, results),
            Command::ExtractionFailed {
                generation,
                ticket,
                detail,
            } => self.extraction_failed(generation, ticket, detail),
            Command::Translate => self.translate(),
            Command::FragmentTranslated {
                generation,
                ticket,
                id,
                text,
            } => self.fragment_translated(generation, ticket, id, text),
            Command::FragmentFailed {
                generation,
                ticket,
                id,
            } => self.fragment_failed(generation, ticket, id),
            Command::TranslationFinished { generation, ticket } => {
                self.translation_finished(generation, ticket)
            }
        }
    }

    fn select_file(&mut self, file: SelectedFile) -> Vec<Effect> {
        if file.is_pdf() {
            debug!("Selected {}", file.path.display());
            self.selection = Some(file);
            vec![]
        } else {
            warn!(
                "Rejected {} with declared type {}",
                file.name, file.content_type
            );
            self.selection = None;
            vec![Effect::Alert(ViewerError::InvalidFileType { name: file.name })]
        }
    }

    fn load(&mut self) -> Vec<Effect> {
        let Some(file) = self.selection.clone() else {
            return vec![Effect::Alert(ViewerError::NoFileSelected)];
        };
        let request = self.next_load_request;
        self.next_load_request += 1;
        self.pending_load = Some(request);
        vec![Effect::OpenDocument { request, file }]
    }

    fn document_opened(&mut self, request: u64, info: DocumentInfo, file: LoadedFile) -> Vec<Effect> {
        if self.pending_load != Some(request) {
            debug!("Dropping stale document response for load #{request}");
            return vec![];
        }
        self.pending_load = None;

        if info.page_count == 0 {
            return vec![Effect::Alert(ViewerError::parse("document has no pages"))];
        }

        info!(
            "PDF loaded: {} ({} pages)",
            file.file.name, info.page_count
        );
        self.generation = self.generation.next();
        self.total_pages = info.page_count;
        self.current_page = 1;
        self.document = Some(info);
        self.loaded = Some(file);
        self.results.clear();
        self.extraction = ExtractionState::Idle;

        vec![
            Effect::ActivateDocument { request },
            Effect::ClearViewport,
            Effect::RenderCurrentPage,
            Effect::RefreshText,
        ]
    }

    fn document_failed(&mut self, request: u64, detail: String) -> Vec<Effect> {
        if self.pending_load != Some(request) {
            return vec![];
        }
        self.pending_load = None;
        vec![Effect::Alert(ViewerError::parse(detail))]
    }

    fn delete(&mut self) -> Vec<Effect> {
        if self.document.is_none() {
            return vec![];
        }
        info!("PDF document removed");
        self.generation = self.generation.next();
        self.document = None;
        self.loaded = None;
        self.selection = None;
        self.pending_load = None;
        self.current_page = 1;
        self.total_pages = 0;
        self.results.clear();
        self.extraction = ExtractionState::Idle;

        vec![
            Effect::CloseDocument,
            Effect::ClearViewport,
            Effect::RefreshText,
        ]
    }

    fn go_to_page(&mut self, direction: Direction) -> Vec<Effect> {
        if self.document.is_none() {
            return vec![];
        }
        let moved = match direction {
            Direction::Previous if self.current_page > 1 => {
                self.current_page -= 1;
                true
            }
            Direction::Next if self.current_page < self.total_pages => {
                self.current_page += 1;
                true
            }
            _ => false,
        };

        if moved {
            vec![Effect::RenderCurrentPage, Effect::RefreshText]
        } else {
            vec![]
        }
    }

    fn extract(&mut self) -> Vec<Effect> {
        let Some(file) = self.loaded.clone() else {
            return vec![Effect::Alert(ViewerError::NoFileSelected)];
        };
        let ticket = self.take_ticket();
        self.extraction = ExtractionState::Extracting { ticket };
        vec![
            Effect::SubmitExtraction {
                generation: self.generation,
                ticket,
                file,
            },
            Effect::RefreshText,
        ]
    }

    fn extraction_finished(
        &mut self,
        generation: Generation,
        ticket: u64,
        results: ResultSet,
    ) -> Vec<Effect> {
        if !self.is_current(generation, ticket) {
            debug!("Dropping stale extraction result (ticket {ticket})");
            return vec![];
        }
        if results.len() != self.total_pages {
            warn!(
                "Extraction returned {} pages for a {}-page document",
                results.len(),
                self.total_pages
            );
        }

        self.results = results;
        let mut effects = vec![Effect::RefreshText];
        if self.translate_after_extract {
            effects.extend(self.start_translation(ticket));
        } else {
            self.extraction = ExtractionState::Ready;
        }
        effects
    }

    fn extraction_failed(&mut self, generation: Generation, ticket: u64, detail: String) -> Vec<Effect> {
        if !self.is_current(generation, ticket) {
            return vec![];
        }
        self.extraction = if self.results.is_empty() {
            ExtractionState::Idle
        } else {
            ExtractionState::Ready
        };
        vec![
            Effect::Alert(ViewerError::network(detail)),
            Effect::RefreshText,
        ]
    }

    fn translate(&mut self) -> Vec<Effect> {
        if self.document.is_none() || self.extraction.is_busy() {
            return vec![];
        }
        if self.results.is_empty() {
            return vec![Effect::Notify("Nothing to translate yet".to_string())];
        }
        let ticket = self.take_ticket();
        self.start_translation(ticket)
    }

    fn start_translation(&mut self, ticket: u64) -> Vec<Effect> {
        let total = self.results.fragments().len();
        if total == 0 {
            self.extraction = ExtractionState::Ready;
            return vec![];
        }
        self.extraction = ExtractionState::Translating {
            ticket,
            done: 0,
            failed: 0,
            total,
        };
        vec![Effect::StartTranslation {
            generation: self.generation,
            ticket,
            results: self.results.clone(),
        }]
    }

    fn fragment_translated(
        &mut self,
        generation: Generation,
        ticket: u64,
        id: FragmentId,
        text: String,
    ) -> Vec<Effect> {
        if !self.is_current(generation, ticket) {
            return vec![];
        }
        if !self.results.replace(id, text) {
            warn!("Translated fragment {id:?} no longer exists");
        }
        if let ExtractionState::Translating { done, .. } = &mut self.extraction {
            *done += 1;
        }
        if id.page + 1 == self.current_page {
            vec![Effect::RefreshText]
        } else {
            vec![]
        }
    }

    fn fragment_failed(&mut self, generation: Generation, ticket: u64, id: FragmentId) -> Vec<Effect> {
        if !self.is_current(generation, ticket) {
            return vec![];
        }
        debug!("Keeping original text for {id:?}");
        if let ExtractionState::Translating { done, failed, .. } = &mut self.extraction {
            *done += 1;
            *failed += 1;
        }
        vec![]
    }

    fn translation_finished(&mut self, generation: Generation, ticket: u64) -> Vec<Effect> {
        if !self.is_current(generation, ticket) {
            return vec![];
        }
        let summary = match self.extraction {
            ExtractionState::Translating { done, failed, .. } if failed > 0 => {
                format!("Translated {} of {done} fragments", done - failed)
            }
            ExtractionState::Translating { done, .. } => format!("Translated {done} fragments"),
            _ => "Translation finished".to_string(),
        };
        self.extraction = ExtractionState::Ready;
        vec![Effect::Notify(summary), Effect::RefreshText]
    }

    fn take_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn is_current(&self, generation: Generation, ticket: u64) -> bool {
        generation == self.generation && self.extraction.ticket() == Some(ticket)
    }
}
