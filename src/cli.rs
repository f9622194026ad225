use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::settings::Settings;

/// Terminal PDF viewer with backend text extraction and translation.
#[derive(Debug, Parser)]
#[command(name = "pdflingo", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// PDF to select and load on start
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Backend base address (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Model name sent with translation requests
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Language to translate into
    #[arg(long, global = true, value_name = "LANG")]
    pub target_language: Option<String>,

    /// Do not translate automatically after extraction
    #[arg(long, global = true)]
    pub no_translate: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file
    #[arg(long, global = true, value_name = "PATH", default_value = "pdflingo.log")]
    pub log_file: PathBuf,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract page text through the backend and print it
    Extract {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Translate the extracted text before printing
        #[arg(long)]
        translate: bool,

        /// Print the raw `{ "pages": [...] }` document
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Command-line flags win over the settings file
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(url) = &self.backend_url {
            settings.backend_url.clone_from(url);
        }
        if let Some(model) = &self.model {
            settings.model.clone_from(model);
        }
        if let Some(language) = &self.target_language {
            settings.target_language.clone_from(language);
        }
        if self.no_translate {
            settings.translate_after_extract = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_opens_viewer() {
        let cli = Cli::try_parse_from(["pdflingo", "paper.pdf"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.file, Some(PathBuf::from("paper.pdf")));
        assert_eq!(cli.log_file, PathBuf::from("pdflingo.log"));
    }

    #[test]
    fn extract_subcommand_with_flags() {
        let cli = Cli::try_parse_from([
            "pdflingo",
            "extract",
            "paper.pdf",
            "--translate",
            "--json",
            "--target-language",
            "german",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Extract {
                ref file,
                translate,
                json,
            }) => {
                assert_eq!(file, &PathBuf::from("paper.pdf"));
                assert!(translate);
                assert!(json);
            }
            None => panic!("expected extract subcommand"),
        }
        assert_eq!(cli.target_language.as_deref(), Some("german"));
    }

    #[test]
    fn overrides_replace_settings() {
        let cli = Cli::try_parse_from([
            "pdflingo",
            "--backend-url",
            "http://10.0.0.2:9000",
            "--model",
            "gpt-4o",
            "--no-translate",
        ])
        .unwrap();
        let mut settings = Settings::default();

        cli.apply_overrides(&mut settings);

        assert_eq!(settings.backend_url, "http://10.0.0.2:9000");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.target_language, "chinese");
        assert!(!settings.translate_after_extract);
    }
}
