//! Demo: a short revision session
//!
//! Adds a few questions, reviews the most unfamiliar ones, then backs the
//! list up to a JSON-lines file and restores it into a second store.
//!
//! Run with: cargo run --example review_session

use coderevise::{Question, Store, StoreConfig};
use eyre::Result;

fn main() -> Result<()> {
    // Create a temporary directory for this demo
    let temp_dir = tempfile::tempdir()?;
    let config = StoreConfig::with_path(temp_dir.path().join("questions.json"));

    println!("CodeRevise Review Session");
    println!("=========================\n");

    let mut store = Store::open(&config)?;
    println!("Store file: {}\n", store.path().display());

    println!("1. ADD - Tracking three questions...");
    store.upsert(Question::new("Two Sum", 3.0).with_leetcode(1))?;
    store.upsert(Question::new("LRU Cache", 9.0).with_leetcode(146))?;
    store.upsert(Question::new("Word Ladder", 6.0).with_codepro(2041))?;
    print_list(&store);

    println!("2. POP - Reviewing the top question twice...");
    for _ in 0..2 {
        if let Some(q) = store.pop(None)? {
            println!("   Reviewed: {}", q);
        }
    }
    println!();
    print_list(&store);

    println!("3. POP - Marking the next question as mastered (priority 0)...");
    if let Some(q) = store.pop(Some(0.0))? {
        println!("   Reviewed: {}\n", q);
    }

    println!("4. EXPORT / IMPORT - Backing up and restoring...");
    let backup = temp_dir.path().join("backup.jsonl");
    let count = store.export(&backup)?;
    println!("   Exported {} questions", count);

    let mut restored = Store::open_at(temp_dir.path().join("restored/questions.json"))?;
    let summary = restored.import(&backup)?;
    println!(
        "   Restored: {} added, {} updated, {} skipped\n",
        summary.added, summary.updated, summary.skipped
    );
    print_list(&restored);

    println!("5. CLEAR - Emptying the original store...");
    store.clear_all()?;
    println!("   {} questions left\n", store.len());

    println!("Demo complete!");
    Ok(())
}

fn print_list(store: &Store) {
    for q in store.list_all() {
        println!("   {:>6.2}  {}", q.priority, q.name);
    }
    println!();
}
