// Priority-ordered question store with snapshot persistence

use crate::config::StoreConfig;
use crate::jsonl;
use crate::record::{Entry, Question, validate_name, validate_priority};
use crate::snapshot;
use eyre::{Context, Result, eyre};
use serde_json::{Map, Value};
use std::collections::{BinaryHeap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Factor applied to a question's priority each time it is reviewed
pub const DECAY_FACTOR: f64 = 0.7;

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added,
    Updated,
}

/// Counts reported by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub updated: usize,
    /// Lines that parsed as JSON but were not usable questions
    pub skipped: usize,
}

/// In-memory max-priority collection of questions, unique by name
///
/// Every mutating operation rewrites the whole snapshot file before
/// returning. The file is not locked between load and save, so two processes
/// working on the same file can lose each other's updates.
pub struct Store {
    path: PathBuf,
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Store {
    /// Open the store at the location described by `config`
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = config.resolve_path()?;
        Self::open_at(path)
    }

    /// Open or create a store backed by the given snapshot file
    ///
    /// The parent directory is created if it doesn't exist.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create store directory")?;
        }

        let questions = snapshot::load(&path)?;

        let mut store = Self {
            path,
            heap: BinaryHeap::with_capacity(questions.len()),
            next_seq: 0,
        };

        let mut seen = HashSet::new();
        for question in questions {
            if !seen.insert(question.name.clone()) {
                warn!(name = %question.name, "Duplicate question in store file, keeping the first");
                continue;
            }
            store.insert(question);
        }

        debug!(file = ?store.path, count = store.len(), "Opened store");
        Ok(store)
    }

    /// Path of the snapshot file backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Look up a question by name
    pub fn get(&self, name: &str) -> Option<&Question> {
        self.heap.iter().map(|e| &e.question).find(|q| q.name == name)
    }

    /// The question `pop` would select next
    pub fn peek(&self) -> Option<&Question> {
        self.heap.peek().map(|e| &e.question)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Insert a question, or update the existing one with the same name
    ///
    /// On update the priority is always replaced; reference numbers are only
    /// replaced when the incoming value is present and non-zero.
    pub fn upsert(&mut self, question: Question) -> Result<UpsertOutcome> {
        question.validate()?;

        let outcome = if self.contains(&question.name) {
            self.update_entry(&question.name, |existing| {
                existing.priority = question.priority;
                if let Some(n) = question.leetcode_number.filter(|&n| n != 0) {
                    existing.leetcode_number = Some(n);
                }
                if let Some(n) = question.codepro_number.filter(|&n| n != 0) {
                    existing.codepro_number = Some(n);
                }
            });
            UpsertOutcome::Updated
        } else {
            self.insert(question);
            UpsertOutcome::Added
        };

        self.save()?;
        Ok(outcome)
    }

    /// Review the highest-priority question and push it back
    ///
    /// Its priority becomes `new_priority` if given, otherwise it decays by
    /// [`DECAY_FACTOR`]. Returns the question as re-inserted, or `None` when
    /// the store is empty (nothing is written in that case).
    pub fn pop(&mut self, new_priority: Option<f64>) -> Result<Option<Question>> {
        if let Some(priority) = new_priority {
            validate_priority(priority)?;
        }

        let Some(entry) = self.heap.pop() else {
            debug!("Pop on empty store");
            return Ok(None);
        };

        let mut question = entry.question;
        question.priority = match new_priority {
            Some(priority) => priority,
            None => question.priority * DECAY_FACTOR,
        };

        // Re-inserted with a fresh sequence, behind any equal-priority peers
        self.insert(question.clone());
        self.save()?;

        debug!(name = %question.name, priority = question.priority, "Reviewed question");
        Ok(Some(question))
    }

    /// All questions, highest priority first
    pub fn list_all(&self) -> Vec<Question> {
        let mut entries: Vec<&Entry> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|e| e.question.clone()).collect()
    }

    /// Write every question to `path` as JSON lines, in insertion order
    ///
    /// Returns the number of questions written.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let count = jsonl::write_jsonl(path, self.in_seq_order())?;
        info!(file = ?path, count, "Exported questions");
        Ok(count)
    }

    /// Merge questions from a JSON-lines file
    ///
    /// The file must parse completely before anything is applied. Lines that
    /// parse but lack a usable `name` or `priority` are skipped and counted,
    /// as are lines whose `leetcode_number` or `codepro_number` is neither an
    /// integer nor null.
    /// Existing questions keep the higher of the two priorities and take any
    /// reference number whose key is present in the line. Changes are saved
    /// once, at the end.
    pub fn import<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportSummary> {
        let path = path.as_ref();
        let values = jsonl::read_jsonl_values(path)
            .with_context(|| format!("Failed to load questions from {}", path.display()))?;

        let mut summary = ImportSummary::default();

        for (line, value) in values {
            let incoming = match ImportedQuestion::from_value(&value) {
                Ok(q) => q,
                Err(e) => {
                    warn!(file = ?path, line, error = %e, "Skipping invalid question");
                    summary.skipped += 1;
                    continue;
                }
            };

            if self.contains(&incoming.name) {
                if self.merge_imported(&incoming) {
                    summary.updated += 1;
                }
            } else {
                self.insert(incoming.into_question());
                summary.added += 1;
            }
        }

        if summary.added + summary.updated > 0 {
            self.save()?;
        }

        info!(
            file = ?path,
            added = summary.added,
            updated = summary.updated,
            skipped = summary.skipped,
            "Import complete"
        );
        Ok(summary)
    }

    /// Remove every question and persist the empty store
    pub fn clear_all(&mut self) -> Result<()> {
        let removed = self.heap.len();
        self.heap.clear();
        self.next_seq = 0;
        self.save()?;
        info!(removed, "Cleared all questions");
        Ok(())
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn insert(&mut self, question: Question) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { question, seq });
    }

    /// Apply `f` to the named question and restore heap order
    fn update_entry<R>(&mut self, name: &str, f: impl FnOnce(&mut Question) -> R) -> Option<R> {
        let mut entries = std::mem::take(&mut self.heap).into_vec();
        let result = entries
            .iter_mut()
            .find(|e| e.question.name == name)
            .map(|e| f(&mut e.question));
        self.heap = BinaryHeap::from(entries);
        result
    }

    /// Returns true if anything changed
    fn merge_imported(&mut self, incoming: &ImportedQuestion) -> bool {
        self.update_entry(&incoming.name, |existing| {
            let mut changed = false;

            if incoming.priority > existing.priority {
                existing.priority = incoming.priority;
                changed = true;
            }
            if let Some(number) = incoming.leetcode_number
                && existing.leetcode_number != number
            {
                existing.leetcode_number = number;
                changed = true;
            }
            if let Some(number) = incoming.codepro_number
                && existing.codepro_number != number
            {
                existing.codepro_number = number;
                changed = true;
            }

            changed
        })
        .unwrap_or(false)
    }

    fn in_seq_order(&self) -> Vec<&Question> {
        let mut entries: Vec<&Entry> = self.heap.iter().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| &e.question).collect()
    }

    fn save(&self) -> Result<()> {
        snapshot::save(&self.path, self.in_seq_order())
    }
}

/// One parsed import line
///
/// Reference fields distinguish a missing key (`None`) from an explicit
/// `null` (`Some(None)`).
#[derive(Debug)]
struct ImportedQuestion {
    name: String,
    priority: f64,
    leetcode_number: Option<Option<i64>>,
    codepro_number: Option<Option<i64>>,
}

impl ImportedQuestion {
    fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| eyre!("Expected a JSON object, got {}", value))?;

        let (Some(name), Some(priority)) = (obj.get("name"), obj.get("priority")) else {
            return Err(eyre!("Missing name or priority: {}", value));
        };

        let name = name
            .as_str()
            .ok_or_else(|| eyre!("`name` must be a string: {}", value))?
            .to_string();
        validate_name(&name)?;

        let priority = priority
            .as_f64()
            .ok_or_else(|| eyre!("`priority` must be a number: {}", value))?;
        validate_priority(priority)?;

        Ok(Self {
            name,
            priority,
            leetcode_number: ref_field(obj, "leetcode_number")?,
            codepro_number: ref_field(obj, "codepro_number")?,
        })
    }

    fn into_question(self) -> Question {
        Question {
            name: self.name,
            priority: self.priority,
            leetcode_number: self.leetcode_number.flatten(),
            codepro_number: self.codepro_number.flatten(),
        }
    }
}

fn ref_field(obj: &Map<String, Value>, key: &str) -> Result<Option<Option<i64>>> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(v) => v
            .as_i64()
            .map(|n| Some(Some(n)))
            .ok_or_else(|| eyre!("`{}` must be an integer or null, got {}", key, v)),
    }
}
