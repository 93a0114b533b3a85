use crate::dataset::{load_dataset_from, read_entries_json, read_entries_jsonl, LoadedDataset};
use crate::{InvertedIndex, ScoredResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_records: usize,
    pub num_tokens: usize,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.json") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn is_jsonl(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("jsonl")
}

fn is_dataset_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("json" | "jsonl"))
}

/// Load a dataset from a `.json` array file, a `.jsonl` file, or a directory of them.
///
/// Directory entries are read in path order and concatenated; fallback ids keep
/// counting across files so they stay unique.
pub fn load_dataset_path<P: AsRef<Path>>(path: P) -> Result<LoadedDataset> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(load_dataset_from(read_entries(path)?, 0));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_dataset_file(p))
        .collect();
    files.sort();

    let mut all = LoadedDataset::default();
    let mut position = 0;
    for file in files {
        let entries = read_entries(&file)?;
        let count = entries.len();
        let part = load_dataset_from(entries, position);
        position += count;
        all.records.extend(part.records);
        all.skipped += part.skipped;
    }
    tracing::info!(dir = %path.display(), records = all.records.len(), skipped = all.skipped, "loaded dataset directory");
    Ok(all)
}

fn read_entries(path: &Path) -> Result<Vec<Value>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let entries = if is_jsonl(path) { read_entries_jsonl(&text) } else { read_entries_json(&text) };
    entries.with_context(|| format!("parsing {}", path.display()))
}

/// Write ranked results as a pretty-printed JSON array.
pub fn export_results<P: AsRef<Path>>(path: P, results: &[ScoredResult]) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, results)?;
    w.flush()?;
    Ok(())
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut w = BufWriter::new(File::create(paths.index())?);
    serde_json::to_writer(&mut w, index)?;
    w.flush()?;
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(paths.meta(), json)?;
    Ok(())
}

pub fn load_index(paths: &IndexPaths) -> Result<(InvertedIndex, MetaFile)> {
    let index: InvertedIndex = serde_json::from_str(&fs::read_to_string(paths.index())?)?;
    let meta: MetaFile = serde_json::from_str(&fs::read_to_string(paths.meta())?)?;
    Ok((index, meta))
}
