// JSONL file operations

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Write records to a JSONL file, one object per line, replacing its contents
///
/// Returns the number of lines written.
pub fn write_jsonl<'a, T, I>(path: &Path, records: I) -> Result<usize>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;

    // Acquire exclusive lock before truncating and writing
    file.lock_exclusive().context("Failed to acquire file lock")?;
    file.set_len(0).with_context(|| format!("Failed to truncate {}", path.display()))?;

    let mut writer = BufWriter::new(&file);
    let mut count = 0;
    for record in records {
        let json = serde_json::to_string(record).context("Failed to serialize record")?;
        writeln!(writer, "{}", json)?;
        count += 1;
    }
    writer.flush()?;
    drop(writer);
    file.sync_all()?; // Ensure data is flushed to disk

    debug!(file = ?path, count, "Wrote JSONL file");
    Ok(count)
}

/// Parse every non-empty line of a JSONL file as a JSON value
///
/// Returns `(line_number, value)` pairs with 1-based line numbers. Unlike a
/// best-effort reader this is all-or-nothing: the first unreadable or
/// unparseable line fails the whole call, naming the line number.
pub fn read_jsonl_values(path: &Path) -> Result<Vec<(usize, Value)>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut values = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {} of {}", line_num + 1, path.display()))?;

        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(line.trim())
            .map_err(|e| eyre!("Invalid JSON on line {} of {}: {}", line_num + 1, path.display(), e))?;
        values.push((line_num + 1, value));
    }

    debug!(file = ?path, count = values.len(), "Parsed JSONL file");
    Ok(values)
}
