use clap::{Parser, Subcommand};
use coderevise::{Question, Store, StoreConfig, UpsertOutcome};
use colored::Colorize;
use comfy_table::{Cell, Table};
use eyre::Result;
use std::path::PathBuf;
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "coderevise")]
#[command(about = "Manage coding practice questions for revising")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the store file (default: $CODEREVISE_HOME/questions.json, else the platform data directory)
    #[arg(short, long, global = true)]
    store_path: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new question, or update an existing one with the same name
    Add {
        /// Question name
        name: String,

        /// Priority value (higher comes up sooner)
        #[arg(allow_negative_numbers = true)]
        priority: f64,

        /// LeetCode question number
        #[arg(long, visible_alias = "ref-a")]
        leetcode: Option<i64>,

        /// CodePro question number
        #[arg(long, visible_alias = "ref-b")]
        codepro: Option<i64>,
    },

    /// Review the most unfamiliar question and push it back with lower priority
    Pop {
        /// Set the reviewed question's priority instead of decaying it
        #[arg(short, long, allow_negative_numbers = true)]
        priority: Option<f64>,
    },

    /// List all questions sorted by priority
    List,

    /// Export questions to a JSON-lines file
    Export {
        /// File path to export questions to
        filepath: PathBuf,
    },

    /// Import questions from a JSON-lines file
    Import {
        /// File path to import questions from
        filepath: PathBuf,
    },

    /// Clear all questions
    Clear,

    /// Print the location of the store file
    Path,
}

fn main() {
    let cli = Cli::parse();

    // Setup tracing
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = StoreConfig {
        path_override: cli.store_path,
        ..StoreConfig::default()
    };

    // Every command except `path` opens the store
    let open = || Store::open(&config);

    match cli.command {
        Commands::Add {
            name,
            priority,
            leetcode,
            codepro,
        } => {
            let mut store = open()?;
            let question = Question {
                name: name.clone(),
                priority,
                leetcode_number: leetcode,
                codepro_number: codepro,
            };
            match store.upsert(question)? {
                UpsertOutcome::Added => println!("{}", format!("Added new question: {}", name).green()),
                UpsertOutcome::Updated => println!("{}", format!("Updated existing question: {}", name).yellow()),
            }
        }
        Commands::Pop { priority } => match open()?.pop(priority)? {
            Some(question) => {
                println!("Popping the most unfamiliar question:");
                println!("{}", question);
            }
            None => println!("{}", "No questions to pop".yellow()),
        },
        Commands::List => {
            let questions = open()?.list_all();
            if questions.is_empty() {
                println!("No questions tracked");
            } else {
                println!("{}", render_table(&questions));
            }
        }
        Commands::Export { filepath } => {
            let count = open()?.export(&filepath)?;
            println!(
                "{}",
                format!("Exported {} questions to {}", count, filepath.display()).green()
            );
        }
        Commands::Import { filepath } => {
            let summary = open()?.import(&filepath)?;
            println!(
                "Import completed. {} questions added, {} questions updated, {} skipped.",
                summary.added, summary.updated, summary.skipped
            );
        }
        Commands::Clear => {
            open()?.clear_all()?;
            println!("{}", "All questions have been cleared.".green());
        }
        Commands::Path => {
            println!("{}", config.resolve_path()?.display());
        }
    }

    Ok(())
}

fn render_table(questions: &[Question]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Name", "Priority", "LeetCode #", "CodePro #"]);

    for q in questions {
        table.add_row(vec![
            Cell::new(&q.name),
            Cell::new(format_priority(q.priority)),
            Cell::new(format_number(q.leetcode_number)),
            Cell::new(format_number(q.codepro_number)),
        ]);
    }

    table
}

/// Two decimals at most, without trailing zeros: 7.0 -> "7", 5.6000000001 -> "5.6"
fn format_priority(priority: f64) -> String {
    let s = format!("{:.2}", priority);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn format_number(number: Option<i64>) -> String {
    number.map_or_else(|| "-".to_string(), |n| n.to_string())
}
