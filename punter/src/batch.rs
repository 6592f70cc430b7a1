//! Loading of match records from batch files produced by ingestion.

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::bail;
use serde_json::Value;
use tracing::{debug, warn};

use crate::file;
use crate::record::MatchRecord;

/// Records read from one or more batch files.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<MatchRecord>,
    /// Entries that were not JSON objects.
    pub malformed: usize,
    pub files: Vec<PathBuf>,
}
impl Batch {
    fn append(&mut self, other: Batch) {
        self.records.extend(other.records);
        self.malformed += other.malformed;
        self.files.extend(other.files);
    }
}

/// Extracts the match entries from a batch document: either a list of records, or an object
/// holding them under `matches` or `results`.
pub fn entries(document: &Value) -> Option<&[Value]> {
    match document {
        Value::Array(entries) => Some(entries),
        Value::Object(object) => ["matches", "results"]
            .into_iter()
            .find_map(|key| object.get(key).and_then(Value::as_array))
            .map(Vec::as_slice),
        _ => None,
    }
}

/// Parses the match records in a batch document. Entries that are not objects are counted as
/// malformed.
pub fn parse(document: &Value) -> anyhow::Result<Batch> {
    let Some(entries) = entries(document) else {
        bail!("expected a list of matches, or an object with 'matches' or 'results'");
    };
    let mut batch = Batch::default();
    for entry in entries {
        match MatchRecord::from_value(entry) {
            Some(record) => batch.records.push(record),
            None => batch.malformed += 1,
        }
    }
    Ok(batch)
}

pub fn read_from_file(path: impl AsRef<Path>) -> anyhow::Result<Batch> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let document: Value = serde_json::from_reader(BufReader::new(file))?;
    let mut batch = parse(&document)?;
    if batch.malformed > 0 {
        warn!("{} malformed records in {}", batch.malformed, path.display());
    }
    batch.files.push(path.to_path_buf());
    Ok(batch)
}

/// Locates the JSON files under `path` whose names contain `name_filter`, ordered by name. With a
/// `lookback`, only the last `lookback` files are kept.
pub fn list_files(
    path: impl AsRef<Path>,
    name_filter: &str,
    lookback: Option<usize>,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    file::recurse_dir(path.as_ref().into(), &mut files, &mut |ext| ext == "json")?;
    files.retain(|file| {
        file.file_name()
            .and_then(OsStr::to_str)
            .map(|name| name.contains(name_filter))
            .unwrap_or(false)
    });
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if let Some(lookback) = lookback {
        let skip = files.len().saturating_sub(lookback);
        files.drain(..skip);
    }
    Ok(files)
}

/// Reads every batch file selected by [`list_files`]. Files that cannot be read or parsed are
/// logged and skipped.
pub fn read_from_dir(
    path: impl AsRef<Path>,
    name_filter: &str,
    lookback: Option<usize>,
) -> anyhow::Result<Batch> {
    let files = list_files(path, name_filter, lookback)?;
    let mut batch = Batch::default();
    for file in files {
        match read_from_file(&file) {
            Ok(file_batch) => batch.append(file_batch),
            Err(err) => warn!("skipping {}: {err}", file.display()),
        }
    }
    debug!(
        "read {} records ({} malformed) from {} files",
        batch.records.len(),
        batch.malformed,
        batch.files.len()
    );
    Ok(batch)
}

/// The default location of the scored output for an input file: `<stem>_scored.json`, alongside
/// the input.
pub fn scored_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("matches");
    input.with_file_name(format!("{stem}_scored.json"))
}
