// Whole-store snapshot persistence

use crate::record::Question;
use chrono::{DateTime, Utc};
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    questions: Vec<Question>,
}

/// Load questions from a snapshot file, in stored order
///
/// A missing or zero-length file is an empty store.
pub fn load(path: &Path) -> Result<Vec<Question>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let snapshot: Snapshot =
        serde_json::from_str(&content).with_context(|| format!("Corrupt store file {}", path.display()))?;

    if snapshot.version > CURRENT_VERSION {
        return Err(eyre!(
            "Store file {} has version {} (this build supports up to {})",
            path.display(),
            snapshot.version,
            CURRENT_VERSION
        ));
    }

    debug!(file = ?path, count = snapshot.questions.len(), saved_at = %snapshot.saved_at, "Loaded snapshot");
    Ok(snapshot.questions)
}

/// Replace the snapshot file with `questions`
///
/// The new content goes to a temporary sibling which is then renamed over the
/// target, under an exclusive lock on a sibling `.lock` file.
///
/// The empty `.lock` file is never removed; it must outlive every writer
/// that may be waiting on it.
pub fn save<'a, I>(path: &Path, questions: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Question>,
{
    let snapshot = Snapshot {
        version: CURRENT_VERSION,
        saved_at: Utc::now(),
        questions: questions.into_iter().cloned().collect(),
    };

    let lock = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(sibling(path, "lock"))
        .context("Failed to open store lock file")?;
    lock.lock_exclusive().context("Failed to acquire store lock")?;

    let tmp_path = sibling(path, "tmp");
    {
        let file = File::create(&tmp_path).with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, &snapshot).context("Failed to serialize store")?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path).with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!(file = ?path, count = snapshot.questions.len(), "Saved snapshot");
    // Lock is released when `lock` is dropped
    Ok(())
}

/// `questions.json` -> `questions.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
