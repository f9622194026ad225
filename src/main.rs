use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use pdflingo::backend::HttpBackend;
use pdflingo::cli::{Cli, Commands};
use pdflingo::event_source::KeyboardEventSource;
use pdflingo::headless::run_extract;
use pdflingo::panic_handler::{initialize_panic_handler, restore_terminal};
use pdflingo::settings::{Settings, default_config_path};
use pdflingo::{App, run_app_with_event_source};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&cli.log_file)
            .with_context(|| format!("cannot create log file {}", cli.log_file.display()))?,
    )?;
    info!("Starting pdflingo {}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.clone().or_else(default_config_path);
    let mut settings = Settings::load_or_create(config_path.as_deref());
    cli.apply_overrides(&mut settings);
    info!("Backend: {}", settings.backend_url);

    match &cli.command {
        Some(Commands::Extract {
            file,
            translate,
            json,
        }) => {
            let api = HttpBackend::new(settings.backend_url.as_str(), settings.request_timeout())?;
            let options = settings.translation_options();
            let translate = translate.then_some(&options);
            run_extract(&api, file, translate, *json, &mut io::stdout().lock())?;
            Ok(())
        }
        None => run_viewer(&cli, &settings),
    }
}

fn run_viewer(cli: &Cli, settings: &Settings) -> Result<()> {
    let start_dir = cli
        .file
        .as_ref()
        .and_then(|f| f.parent().map(PathBuf::from))
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(std::env::current_dir, Ok)?;
    let mut app = App::from_settings(settings, start_dir)?;
    if let Some(file) = &cli.file {
        app.open_file(file);
    }

    initialize_panic_handler();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app_with_event_source(&mut terminal, &mut app, &mut KeyboardEventSource);

    restore_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }
    info!("Shutting down");
    Ok(())
}
