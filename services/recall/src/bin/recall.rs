//! services/recall/src/bin/recall.rs
//!
//! A thin terminal front end over the review client.

use clap::{Parser, Subcommand};
use recall_core::domain::{Credentials, NoteFilter, Registration, ReviewResult};
use recall_lib::{
    config::Config,
    error::ClientError,
    review::SessionPhase,
    state::AppState,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "recall", about = "Review your notes on a spaced-repetition schedule")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session.
    Login { username: String, password: String },
    /// Create an account.
    Register {
        username: String,
        password: String,
        email: String,
    },
    /// Forget the stored session.
    Logout,
    /// List the notes due today.
    Tasks,
    /// List notes, optionally narrowed to one category or to uncategorized notes.
    Notes {
        #[arg(long, conflicts_with = "uncategorized")]
        category: Option<i64>,
        #[arg(long)]
        uncategorized: bool,
    },
    /// List categories.
    Categories,
    /// Review a note and submit how well you recalled it.
    Review {
        note_id: i64,
        /// remembered, fuzzy or forgotten
        result: ReviewResult,
    },
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    let cli = Cli::parse();

    // --- 2. Build the Client State & Restore the Session ---
    let state = AppState::from_config(&config)?;
    if let Some(user) = state.auth.restore()? {
        info!("Welcome back, {}", user.username);
    }

    // --- 3. Dispatch ---
    match cli.command {
        Command::Login { username, password } => {
            let user = state.auth.login(&Credentials { username, password }).await?;
            println!("Signed in as {}", user.username);
        }
        Command::Register {
            username,
            password,
            email,
        } => {
            let user = state
                .auth
                .register(&Registration {
                    username,
                    password,
                    email,
                })
                .await?;
            println!("Registered {} (id {}). Sign in to continue.", user.username, user.id);
        }
        Command::Logout => {
            state.auth.logout()?;
            println!("Signed out");
        }
        Command::Tasks => {
            let tasks = state.tasks.fetch().await?;
            if tasks.is_empty() {
                println!("Nothing to review today.");
            }
            for task in tasks {
                let lock = if task.supervision.is_supervised() {
                    format!(" [{}s]", task.supervision.required_seconds())
                } else {
                    String::new()
                };
                println!(
                    "{:>6}  stage {}  {}{}{}",
                    task.note_id,
                    task.current_review_stage,
                    task.title,
                    task.category_name
                        .map(|c| format!(" ({})", c))
                        .unwrap_or_default(),
                    lock
                );
            }
        }
        Command::Notes {
            category,
            uncategorized,
        } => {
            let filter = match (category, uncategorized) {
                (Some(id), _) => NoteFilter::Category(id),
                (None, true) => NoteFilter::Uncategorized,
                (None, false) => NoteFilter::All,
            };
            for note in state.notes.fetch(filter).await? {
                println!("{:>6}  {}", note.id, note.title);
            }
        }
        Command::Categories => {
            for category in state.categories.fetch().await? {
                println!("{:>6}  {}", category.id, category.name);
            }
        }
        Command::Review { note_id, result } => {
            review(&state, note_id, result).await?;
        }
    }

    Ok(())
}

/// Opens a session, waits out the supervision countdown and submits `result`.
async fn review(state: &AppState, note_id: i64, result: ReviewResult) -> Result<(), ClientError> {
    let session = state.reviews.open(note_id).await?;
    let mut updates = session.subscribe();

    if let Some(note) = session.snapshot().note {
        println!("# {}\n\n{}\n", note.title, note.content);
    }

    loop {
        let snapshot = updates.borrow_and_update().clone();
        match snapshot.phase {
            SessionPhase::Active { .. } if snapshot.gate_open() => break,
            SessionPhase::Closed { .. } => return Ok(()),
            _ => println!("Results unlock in {}s", snapshot.remaining_seconds()),
        }
        if updates.changed().await.is_err() {
            break;
        }
    }

    let outcome = session.submit(result).await?;
    println!("Recorded {}. Next review on {}.", result, outcome.next_review_date);
    Ok(())
}
