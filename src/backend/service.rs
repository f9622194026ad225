//! Backend service - owns the HTTP worker thread and its channels

use std::time::{Duration, Instant};

use flume::{Receiver, Sender};
use log::debug;

use super::BackendApi;
use super::request::{BackendRequest, BackendResponse};
use super::translation::TranslationOptions;
use super::worker::backend_worker;
use crate::model::ResultSet;
use crate::session::{Generation, LoadedFile};

/// Runs extraction and translation off the UI thread.
///
/// Jobs run one after another; translation fragments are sent strictly
/// one at a time.
pub struct BackendService {
    request_tx: Sender<BackendRequest>,
    response_rx: Receiver<BackendResponse>,
    pending_jobs: usize,
}

impl BackendService {
    #[must_use]
    pub fn spawn<A: BackendApi>(api: A, options: TranslationOptions) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        std::thread::spawn(move || {
            backend_worker(api, options, request_rx, response_tx);
        });

        Self {
            request_tx,
            response_rx,
            pending_jobs: 0,
        }
    }

    pub fn extract(&mut self, generation: Generation, ticket: u64, file: LoadedFile) {
        debug!("Submitting extraction ticket {ticket}");
        self.pending_jobs += 1;
        let _ = self.request_tx.send(BackendRequest::Extract {
            generation,
            ticket,
            file,
        });
    }

    pub fn translate(&mut self, generation: Generation, ticket: u64, results: ResultSet) {
        debug!("Submitting translation ticket {ticket}");
        self.pending_jobs += 1;
        let _ = self.request_tx.send(BackendRequest::Translate {
            generation,
            ticket,
            results,
        });
    }

    /// Poll for responses without blocking
    pub fn poll_responses(&mut self) -> Vec<BackendResponse> {
        let mut responses = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            self.track(&response);
            responses.push(response);
        }
        responses
    }

    /// Block until one response arrives or `timeout` elapses
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<BackendResponse> {
        let response = self
            .response_rx
            .recv_deadline(Instant::now() + timeout)
            .ok()?;
        self.track(&response);
        Some(response)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending_jobs == 0
    }

    pub fn shutdown(&self) {
        let _ = self.request_tx.send(BackendRequest::Shutdown);
    }

    fn track(&mut self, response: &BackendResponse) {
        match response {
            BackendResponse::Extracted { .. }
            | BackendResponse::ExtractFailed { .. }
            | BackendResponse::TranslationDone { .. } => {
                self.pending_jobs = self.pending_jobs.saturating_sub(1);
            }
            BackendResponse::Fragment { .. } | BackendResponse::FragmentFailed { .. } => {}
        }
    }
}

impl Drop for BackendService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
