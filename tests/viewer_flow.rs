use std::path::{Path, PathBuf};
use std::time::Duration;

use pdflingo::backend::{BackendService, TranslationOptions};
use pdflingo::error::ViewerError;
use pdflingo::event_source::{Event, KeyCode, KeyModifiers, SimulatedEventSource};
use pdflingo::model::{OcrText, PageResult};
use pdflingo::pdf::PdfService;
use pdflingo::session::ExtractionState;
use pdflingo::test_utils::fakes::{FakeBackend, FakePdfEngine};
use pdflingo::test_utils::test_helpers::{
    TestScenarioBuilder, capture_terminal_state, create_test_terminal,
};
use pdflingo::widget::alert::Alert;
use pdflingo::{App, AppOptions, run_app_with_event_source};
use ratatui::layout::Rect;

const WAIT: Duration = Duration::from_secs(5);

fn app(backend: FakeBackend, translate_after_extract: bool) -> App {
    let mut app = App::new(
        PdfService::spawn(FakePdfEngine),
        BackendService::spawn(backend, TranslationOptions::default()),
        AppOptions {
            translate_after_extract,
            ..AppOptions::default()
        },
    );
    app.sync_layout(Rect::new(0, 0, 100, 30));
    app
}

fn fake_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, FakePdfEngine::document(pages)).unwrap();
    path
}

fn page(text: &str) -> PageResult {
    PageResult {
        pdf_text: Some(text.to_string()),
        image_ocr_text: OcrText::None,
    }
}

fn press(app: &mut App, c: char) {
    if let Event::Key(key) = SimulatedEventSource::char_key(c) {
        app.handle_key(key);
    }
}

fn press_key(app: &mut App, code: KeyCode) {
    if let Event::Key(key) = SimulatedEventSource::key_event(code, KeyModifiers::empty()) {
        app.handle_key(key);
    }
}

#[test]
fn non_pdf_selection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "plain").unwrap();
    let mut app = app(FakeBackend::default(), false);

    app.select_path(&path);

    assert_eq!(
        app.alert().map(Alert::error),
        Some(&ViewerError::InvalidFileType {
            name: "notes.txt".to_string()
        })
    );
    assert!(app.session().selection().is_none());
    assert!(!app.session().controls().load);
}

#[test]
fn navigation_stays_within_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "three.pdf", 3);
    let mut app = app(FakeBackend::default(), false);

    app.open_file(&path);
    assert!(app.settle(WAIT));
    assert_eq!(app.session().current_page(), 1);

    press(&mut app, 'h');
    assert_eq!(app.session().current_page(), 1);

    for _ in 0..5 {
        press_key(&mut app, KeyCode::Right);
    }
    assert_eq!(app.session().current_page(), 3);
    assert!(app.settle(WAIT));
    assert_eq!(app.viewport().frame().map(|f| f.page), Some(3));

    press(&mut app, 'p');
    assert!(app.settle(WAIT));
    assert_eq!(app.session().current_page(), 2);
    assert_eq!(app.viewport().frame().map(|f| f.page), Some(2));
}

#[test]
fn extract_then_translate_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "two.pdf", 2);
    let backend = FakeBackend::with_pages(vec![page("Hello"), page("World")]);
    let mut app = app(backend.clone(), false);

    app.open_file(&path);
    assert!(app.settle(WAIT));
    press(&mut app, 'x');
    assert!(app.settle(WAIT));

    assert_eq!(app.session().extraction(), ExtractionState::Ready);
    assert_eq!(
        app.session().results().page(1).and_then(PageResult::body_text),
        Some("Hello")
    );
    assert!(backend.translation_requests().is_empty());

    press(&mut app, 't');
    assert!(app.settle(WAIT));

    assert_eq!(backend.translated_texts(), vec!["Hello", "World"]);
    assert_eq!(
        app.session().results().page(2).and_then(PageResult::body_text),
        Some("[chinese] World")
    );
    assert_eq!(app.session().extraction(), ExtractionState::Ready);
}

#[test]
fn extraction_chains_into_translation() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "one.pdf", 1);
    let backend = FakeBackend::with_pages(vec![PageResult {
        pdf_text: Some("body".to_string()),
        image_ocr_text: OcrText::Single("logo".to_string()),
    }]);
    let mut app = app(backend.clone(), true);

    app.open_file(&path);
    assert!(app.settle(WAIT));
    press(&mut app, 'x');
    assert!(app.settle(WAIT));

    let result = app.session().results().page(1).unwrap();
    assert_eq!(result.pdf_text.as_deref(), Some("[chinese] body"));
    assert_eq!(result.image_ocr_text, OcrText::Single("[chinese] logo".to_string()));
}

#[test]
fn failed_translation_keeps_original_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "one.pdf", 1);
    let backend = FakeBackend::with_pages(vec![page("keep me")]).failing_translation();
    let mut app = app(backend, true);

    app.open_file(&path);
    assert!(app.settle(WAIT));
    press(&mut app, 'x');
    assert!(app.settle(WAIT));

    assert_eq!(
        app.session().results().page(1).and_then(PageResult::body_text),
        Some("keep me")
    );
    assert!(app.alert().is_none());
}

#[test]
fn extraction_failure_raises_network_alert() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "one.pdf", 1);
    let mut app = app(FakeBackend::failing_extraction(), false);

    app.open_file(&path);
    assert!(app.settle(WAIT));
    press(&mut app, 'x');
    assert!(app.settle(WAIT));

    let alert = app.alert().expect("alert shown");
    assert!(matches!(alert.error(), ViewerError::NetworkError { .. }));
    assert!(alert.message().starts_with("Error extracting text:"));
    assert!(app.session().results().is_empty());
}

#[test]
fn delete_during_extraction_drops_late_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "one.pdf", 1);
    let (backend, gate) = FakeBackend::with_pages(vec![page("late")]).gated();
    let mut app = app(backend, false);

    app.open_file(&path);
    assert!(app.settle(WAIT));
    press(&mut app, 'x');
    assert!(matches!(
        app.session().extraction(),
        ExtractionState::Extracting { .. }
    ));

    press(&mut app, 'D');
    assert!(!app.session().has_document());
    gate.send(()).unwrap();
    assert!(app.settle(WAIT));

    assert!(app.session().results().is_empty());
    assert_eq!(app.session().extraction(), ExtractionState::Idle);
    assert!(app.viewport().frame().is_none());
}

#[test]
fn unparseable_file_keeps_previous_document() {
    let dir = tempfile::tempdir().unwrap();
    let good = fake_pdf(dir.path(), "good.pdf", 2);
    let bad = dir.path().join("bad.pdf");
    std::fs::write(&bad, "%PDF-garbage").unwrap();
    let mut app = app(FakeBackend::default(), false);

    app.open_file(&good);
    assert!(app.settle(WAIT));
    app.open_file(&bad);
    assert!(app.settle(WAIT));

    assert!(matches!(
        app.alert().map(Alert::error),
        Some(ViewerError::ParseFailure { .. })
    ));
    assert_eq!(app.session().total_pages(), 2);
    assert_eq!(
        app.session().loaded_file().map(|f| f.file.name.as_str()),
        Some("good.pdf")
    );
}

/// Dismiss the current alert, then page forward and resize; the frames
/// must come from the three-page document that is still loaded
fn assert_previous_document_still_renders(app: &mut App) {
    assert!(matches!(
        app.alert().map(Alert::error),
        Some(ViewerError::ParseFailure { .. })
    ));
    press_key(app, KeyCode::Enter);
    assert!(app.alert().is_none());
    assert_eq!(app.session().total_pages(), 3);

    press(app, 'l');
    press(app, 'l');
    assert!(app.settle(WAIT));
    assert_eq!(app.session().current_page(), 3);
    assert_eq!(app.viewport().frame().map(|f| f.page), Some(3));
    assert!(
        app.viewport()
            .frame()
            .is_some_and(|f| f.overlay_text().contains("Page 3 text"))
    );

    let before = app.viewport().frame().map(|f| f.scale);
    app.sync_layout(Rect::new(0, 0, 160, 60));
    assert!(app.settle(WAIT));
    let frame = app.viewport().frame().expect("rerendered after resize");
    assert_eq!(frame.page, 3);
    assert!(Some(frame.scale) > before);
}

#[test]
fn zero_page_file_leaves_previous_document_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let good = fake_pdf(dir.path(), "good.pdf", 3);
    let empty = fake_pdf(dir.path(), "empty.pdf", 0);
    let mut app = app(FakeBackend::default(), false);

    app.open_file(&good);
    assert!(app.settle(WAIT));
    app.open_file(&empty);
    assert!(app.settle(WAIT));

    assert_previous_document_still_renders(&mut app);
}

#[test]
fn superseded_load_never_replaces_rendered_document() {
    let dir = tempfile::tempdir().unwrap();
    let good = fake_pdf(dir.path(), "good.pdf", 3);
    let single = fake_pdf(dir.path(), "single.pdf", 1);
    let garbage = dir.path().join("garbage.pdf");
    std::fs::write(&garbage, "%PDF-garbage").unwrap();
    let mut app = app(FakeBackend::default(), false);

    app.open_file(&good);
    assert!(app.settle(WAIT));
    app.open_file(&single);
    app.open_file(&garbage);
    assert!(app.settle(WAIT));

    assert_eq!(
        app.session().loaded_file().map(|f| f.file.name.as_str()),
        Some("good.pdf")
    );
    assert_previous_document_still_renders(&mut app);
}

#[test]
fn text_panel_follows_extraction() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "one.pdf", 1);
    let (backend, gate) = FakeBackend::with_pages(vec![page("Body")]).gated();
    let mut app = app(backend, false);
    let panel_text = |app: &App| -> Vec<String> {
        app.text_panel()
            .lines()
            .iter()
            .map(ToString::to_string)
            .collect()
    };

    app.open_file(&path);
    assert!(app.settle(WAIT));
    assert_eq!(panel_text(&app), vec!["No extracted text yet."]);

    press(&mut app, 'x');
    assert_eq!(panel_text(&app), vec!["Extracting text…"]);

    gate.send(()).unwrap();
    assert!(app.settle(WAIT));
    assert_eq!(panel_text(&app), vec!["Page 1:", "Body"]);
}

#[test]
fn run_loop_draws_panels_until_quit() {
    let dir = tempfile::tempdir().unwrap();
    let path = fake_pdf(dir.path(), "paper.pdf", 2);
    let mut app = app(FakeBackend::with_pages(vec![page("Alpha"), page("Beta")]), false);
    app.open_file(&path);
    assert!(app.settle(WAIT));
    press(&mut app, 'x');
    assert!(app.settle(WAIT));

    let mut terminal = create_test_terminal(100, 30);
    let mut events = TestScenarioBuilder::new().next_page().quit().build();

    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    let screen = capture_terminal_state(&terminal);
    assert_eq!(app.session().current_page(), 2);
    assert!(screen.contains("Page 2:"), "{screen}");
    assert!(screen.contains("Beta"), "{screen}");
    assert!(screen.contains("[x]Extract"), "{screen}");
}
