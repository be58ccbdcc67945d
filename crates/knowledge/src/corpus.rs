//! FAQ corpus loading.
//!
//! Reads FAQ documents (JSON arrays of entries) from disk, validates the
//! required fields, and folds tables, bullet points and notes into the answer
//! text so the retriever only ever deals with plain question/answer pairs.

use crate::types::{Corpus, FaqEntry, FaqTable};
use faqbot_core::{AppError, AppResult};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Label prepended to an entry's note when it is merged into the answer.
const NOTE_LABEL: &str = "Lưu ý:";

/// Entry as found on disk; required fields are validated after parsing.
#[derive(Debug, Deserialize)]
struct RawEntry {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default)]
    table: Option<FaqTable>,
    #[serde(default)]
    bullet_points: Option<Vec<String>>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    keywords: Option<BTreeSet<String>>,
}

/// Load every `*.json` document in `dir` into one corpus.
///
/// Files are read in file-name order so entry indices are stable across
/// restarts. Each entry's `source` is the name of the file it came from.
pub fn load_corpus(dir: &Path) -> AppResult<Corpus> {
    if !dir.is_dir() {
        return Err(AppError::Config(format!(
            "FAQ data directory does not exist: {:?}",
            dir
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        // Unreadable entries fail the whole load
        let entry = entry.map_err(|e| {
            AppError::Config(format!("Failed to read FAQ data directory {:?}: {}", dir, e))
        })?;

        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|e| e.to_str()) == Some("json")
        {
            files.push(entry.into_path());
        }
    }

    let mut entries = Vec::new();
    for path in &files {
        let loaded = load_entries(path)?;
        tracing::debug!("Loaded {} entries from {:?}", loaded.len(), path);
        entries.extend(loaded);
    }

    if entries.is_empty() {
        return Err(AppError::EmptyCorpus);
    }

    tracing::info!(
        "Loaded FAQ corpus: {} entries from {} files in {:?}",
        entries.len(),
        files.len(),
        dir
    );

    Ok(Corpus::new(entries))
}

/// Load a single FAQ document.
pub fn load_corpus_file(path: &Path) -> AppResult<Corpus> {
    let entries = load_entries(path)?;
    if entries.is_empty() {
        return Err(AppError::EmptyCorpus);
    }
    Ok(Corpus::new(entries))
}

fn load_entries(path: &Path) -> AppResult<Vec<FaqEntry>> {
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let content = fs::read_to_string(path)?;
    let raw: Vec<RawEntry> = serde_json::from_str(&content).map_err(|e| {
        AppError::Serialization(format!("Failed to parse {:?}: {}", path, e))
    })?;

    raw.into_iter()
        .enumerate()
        .map(|(index, entry)| into_entry(entry, &source_name, index))
        .collect()
}

fn into_entry(raw: RawEntry, source_name: &str, index: usize) -> AppResult<FaqEntry> {
    let question = required(raw.question, source_name, index, "question")?;
    let answer = required(raw.answer, source_name, index, "answer")?;

    let answer = merge_answer(
        &answer,
        raw.table.as_ref(),
        raw.bullet_points.as_deref(),
        raw.note.as_deref(),
    );

    Ok(FaqEntry {
        question,
        answer,
        source: source_name.to_string(),
        table: raw.table,
        bullet_points: raw.bullet_points,
        note: raw.note,
        keywords: raw.keywords,
    })
}

fn required(
    value: Option<String>,
    source_name: &str,
    index: usize,
    field: &'static str,
) -> AppResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MalformedEntry {
            source_name: source_name.to_string(),
            index,
            field,
        }),
    }
}

/// Fold the structured parts of an entry into its answer text, one block per line.
pub fn merge_answer(
    answer: &str,
    table: Option<&FaqTable>,
    bullet_points: Option<&[String]>,
    note: Option<&str>,
) -> String {
    let mut parts = vec![answer.trim().to_string()];

    if let Some(table) = table {
        parts.extend(table.rows.iter().map(|row| format_row(&table.columns, row)));
    }

    if let Some(bullets) = bullet_points {
        parts.extend(
            bullets
                .iter()
                .map(|b| b.trim())
                .filter(|b| !b.is_empty())
                .map(|b| format!("- {}", b)),
        );
    }

    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        parts.push(format!("{} {}", NOTE_LABEL, note));
    }

    parts.retain(|p| !p.is_empty());
    parts.join("\n")
}

fn format_row(columns: &[String], row: &[String]) -> String {
    if columns.is_empty() {
        return row.join(" | ");
    }

    row.iter()
        .enumerate()
        .map(|(i, cell)| match columns.get(i) {
            Some(col) => format!("{}: {}", col, cell),
            None => cell.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
