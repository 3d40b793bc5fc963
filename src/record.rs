// Question record and its priority ordering

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Maximum length of a question name in bytes
pub const MAX_NAME_LEN: usize = 256;

/// A coding-practice question tracked for revision
///
/// Higher `priority` means less familiar, so it comes up sooner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub name: String,
    pub priority: f64,
    pub leetcode_number: Option<i64>,
    pub codepro_number: Option<i64>,
}

impl Question {
    pub fn new(name: impl Into<String>, priority: f64) -> Self {
        Self {
            name: name.into(),
            priority,
            leetcode_number: None,
            codepro_number: None,
        }
    }

    pub fn with_leetcode(mut self, number: i64) -> Self {
        self.leetcode_number = Some(number);
        self
    }

    pub fn with_codepro(mut self, number: i64) -> Self {
        self.codepro_number = Some(number);
        self
    }

    /// Check the name and priority are storable
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_priority(self.priority)
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Name: {}, Priority: {}, LeetCode#: {}, CodePro#: {}",
            self.name,
            self.priority,
            display_number(self.leetcode_number),
            display_number(self.codepro_number)
        )
    }
}

fn display_number(number: Option<i64>) -> String {
    number.map_or_else(|| "None".to_string(), |n| n.to_string())
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(eyre!("Question name cannot be empty or whitespace-only"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(eyre!(
            "Question name too long: {} bytes (max {})",
            name.len(),
            MAX_NAME_LEN
        ));
    }
    Ok(())
}

pub(crate) fn validate_priority(priority: f64) -> Result<()> {
    if !priority.is_finite() {
        return Err(eyre!("Priority must be a finite number, got {}", priority));
    }
    Ok(())
}

/// Heap slot: a question plus the sequence number used to break priority ties
///
/// `Ord` is arranged so `BinaryHeap` yields the highest priority first and,
/// among equal priorities, the lowest sequence (oldest entry) first.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub question: Question,
    pub seq: u64,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.question
            .priority
            .total_cmp(&other.question.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
