//! Backend worker - performs HTTP calls on a dedicated thread

use flume::{Receiver, Sender};
use log::info;

use super::BackendApi;
use super::extraction::extract;
use super::request::{BackendRequest, BackendResponse};
use super::translation::{FragmentOutcome, TranslationOptions, Translator};
use crate::error::ViewerError;

/// Main worker function - runs in a dedicated thread
pub fn backend_worker<A: BackendApi>(
    api: A,
    options: TranslationOptions,
    requests: Receiver<BackendRequest>,
    responses: Sender<BackendResponse>,
) {
    for request in requests {
        match request {
            BackendRequest::Extract {
                generation,
                ticket,
                file,
            } => {
                let response = match extract(&api, &file) {
                    Ok(results) => BackendResponse::Extracted {
                        generation,
                        ticket,
                        results,
                    },
                    Err(e) => BackendResponse::ExtractFailed {
                        generation,
                        ticket,
                        detail: match e {
                            ViewerError::NetworkError { detail } => detail,
                            other => other.to_string(),
                        },
                    },
                };
                let _ = responses.send(response);
            }

            BackendRequest::Translate {
                generation,
                ticket,
                results,
            } => {
                let translator = Translator::new(&api, &options);
                let summary = translator.translate_each(&results, |outcome| {
                    let response = match outcome {
                        FragmentOutcome::Translated { id, text } => BackendResponse::Fragment {
                            generation,
                            ticket,
                            id,
                            text,
                        },
                        FragmentOutcome::Failed { id } => BackendResponse::FragmentFailed {
                            generation,
                            ticket,
                            id,
                        },
                    };
                    let _ = responses.send(response);
                });
                info!(
                    "Translation finished: {} translated, {} kept original",
                    summary.translated, summary.failed
                );
                let _ = responses.send(BackendResponse::TranslationDone { generation, ticket });
            }

            BackendRequest::Shutdown => break,
        }
    }
}
