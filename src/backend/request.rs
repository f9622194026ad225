//! Backend worker request and response types

use crate::model::{FragmentId, ResultSet};
use crate::session::{Command, Generation, LoadedFile};

/// Request sent to the backend worker
#[derive(Debug)]
pub enum BackendRequest {
    Extract {
        generation: Generation,
        ticket: u64,
        file: LoadedFile,
    },
    Translate {
        generation: Generation,
        ticket: u64,
        results: ResultSet,
    },
    Shutdown,
}

/// Response from the backend worker. Every response echoes the generation
/// and ticket of its request so the session can drop stale ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResponse {
    Extracted {
        generation: Generation,
        ticket: u64,
        results: ResultSet,
    },
    ExtractFailed {
        generation: Generation,
        ticket: u64,
        detail: String,
    },
    Fragment {
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
    TranslationDone {
        generation: Generation,
        ticket: u64,
    },
}

impl From<BackendResponse> for Command {
    fn from(response: BackendResponse) -> Self {
        match response {
            BackendResponse::Extracted {
                generation,
                ticket,
                results,
            } => Command::ExtractionFinished {
                generation,
                ticket,
                results,
            },
            BackendResponse::ExtractFailed {
                generation,
                ticket,
                detail,
            } => Command::ExtractionFailed {
                generation,
                ticket,
                detail,
            },
            BackendResponse::Fragment {
                generation,
                ticket,
                id,
                text,
            } => Command::FragmentTranslated {
                generation,
                ticket,
                id,
                text,
            },
            BackendResponse::FragmentFailed {
                generation,
                ticket,
                id,
            } => Command::FragmentFailed {
                generation,
                ticket,
                id,
            },
            BackendResponse::TranslationDone { generation, ticket } => {
                Command::TranslationFinished { generation, ticket }
            }
        }
    }
}
