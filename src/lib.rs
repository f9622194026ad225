// Export modules for use in tests
pub mod backend;
pub mod cli;
pub mod error;
pub mod event_source;
pub mod headless;
pub mod main_app;
pub mod model;
pub mod notification;
pub mod panic_handler;
pub mod pdf;
pub mod session;
pub mod settings;
pub mod theme;
pub mod widget;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main app components
pub use main_app::{App, AppAction, AppOptions, run_app_with_event_source};
