//! PDF service - owns the worker thread and its channels

use std::collections::HashSet;
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};
use log::debug;

use super::engine::PdfEngine;
use super::request::{PdfRequest, PdfResponse, RequestId};
use super::types::PixelSize;
use super::worker::pdf_worker;
use crate::session::{Generation, SelectedFile};

/// Parses and renders PDFs on a dedicated thread.
///
/// A single worker processes requests in order, so a render queued after an
/// open always sees the newly opened document.
pub struct PdfService {
    request_tx: Sender<PdfRequest>,
    response_rx: Receiver<PdfResponse>,
    next_request_id: u64,
    pending_opens: HashSet<u64>,
    pending_renders: HashSet<RequestId>,
}

impl PdfService {
    /// Spawn the worker thread with the given engine
    #[must_use]
    pub fn spawn<E: PdfEngine>(engine: E) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        std::thread::spawn(move || {
            pdf_worker(engine, request_rx, response_tx);
        });

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            pending_opens: HashSet::new(),
            pending_renders: HashSet::new(),
        }
    }

    /// Read and parse `file`; `request` is the session's load number
    pub fn open(&mut self, request: u64, file: SelectedFile) {
        debug!("Opening {} (load #{request})", file.path.display());
        self.pending_opens.insert(request);
        let _ = self.request_tx.send(PdfRequest::Open { request, file });
    }

    /// Switch rendering to the document parsed by load `request`, once the
    /// session has accepted it
    pub fn activate(&self, request: u64) {
        let _ = self.request_tx.send(PdfRequest::Activate { request });
    }

    /// Request a render of a 1-based page of the current document
    pub fn render(
        &mut self,
        generation: Generation,
        page: usize,
        container: PixelSize,
        overlay: bool,
    ) -> RequestId {
        let id = self.next_id();
        self.pending_renders.insert(id);
        let _ = self.request_tx.send(PdfRequest::Render {
            id,
            generation,
            page,
            container,
            overlay,
        });
        id
    }

    pub fn close(&self) {
        let _ = self.request_tx.send(PdfRequest::Close);
    }

    /// Poll for completed responses without blocking
    pub fn poll_responses(&mut self) -> Vec<PdfResponse> {
        let mut responses = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            self.track(&response);
            responses.push(response);
        }
        responses
    }

    /// Block until one response arrives or `timeout` elapses
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<PdfResponse> {
        let deadline = Instant::now() + timeout;
        let response = self.response_rx.recv_deadline(deadline).ok()?;
        self.track(&response);
        Some(response)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending_opens.len() + self.pending_renders.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    pub fn shutdown(&self) {
        let _ = self.request_tx.send(PdfRequest::Shutdown);
    }

    fn track(&mut self, response: &PdfResponse) {
        match response {
            PdfResponse::Opened { request, .. } | PdfResponse::OpenFailed { request, .. } => {
                self.pending_opens.remove(request);
            }
            PdfResponse::Rendered { id, .. } | PdfResponse::RenderFailed { id, .. } => {
                self.pending_renders.remove(id);
            }
        }
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for PdfService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
