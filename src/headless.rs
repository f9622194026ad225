//! `pdflingo extract`: the pipeline without the viewer

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;

use crate::backend::{BackendApi, ExtractResponse, TranslationOptions, Translator, extract};
use crate::error::ViewerError;
use crate::model::{OcrText, ResultSet};
use crate::session::{LoadedFile, SelectedFile};

const PAGE_SEPARATOR: &str = "--------------------";

/// Extract `path`, optionally translate it, and print the pages to `out`
pub fn run_extract<A: BackendApi + ?Sized>(
    api: &A,
    path: &Path,
    translate: Option<&TranslationOptions>,
    json: bool,
    out: &mut dyn Write,
) -> Result<ResultSet> {
    let file = SelectedFile::from_path(path);
    if !file.is_pdf() {
        bail!(ViewerError::InvalidFileType { name: file.name });
    }
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let loaded = LoadedFile {
        file,
        bytes: bytes.into(),
    };

    let mut results = extract(api, &loaded)?;
    if let Some(options) = translate {
        let summary = Translator::new(api, options).translate_all(&mut results);
        info!(
            "Translated {} fragments, kept {} originals",
            summary.translated, summary.failed
        );
    }

    write_pages(out, &results, json)?;
    Ok(results)
}

/// Print results as text blocks per page, or as the wire JSON document
pub fn write_pages(out: &mut dyn Write, results: &ResultSet, json: bool) -> Result<()> {
    if json {
        let doc = ExtractResponse {
            pages: results.pages().to_vec(),
        };
        serde_json::to_writer_pretty(&mut *out, &doc)?;
        writeln!(out)?;
        return Ok(());
    }

    for (idx, page) in results.iter().enumerate() {
        writeln!(out, "Page {}:", idx + 1)?;
        writeln!(out, "{}", page.body_text().unwrap_or_default())?;
        match &page.image_ocr_text {
            OcrText::None => {}
            OcrText::Single(text) => {
                if !text.is_empty() {
                    writeln!(out, "Image OCR Text:")?;
                    writeln!(out, "{text}")?;
                }
            }
            OcrText::Many(items) => {
                writeln!(out, "Image OCR Text:")?;
                for (i, text) in items.iter().enumerate() {
                    writeln!(out, "[Image {}]: {text}", i + 1)?;
                }
            }
        }
        writeln!(out, "{PAGE_SEPARATOR}")?;
    }
    Ok(())
}
