//! Questline CLI - boss-battle task tracking.

use anyhow::Result;
use clap::{Parser, Subcommand};
use questline_core::{Difficulty, GameConfig, Session};
use questline_engine::{CompletionEngine, NoopNotifier, RecurrenceScanner, WebhookNotifier};
use questline_service::{BossService, CreateBoss, CreateTask, TaskService, UserService};
use questline_storage::JsonStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Level;

#[derive(Parser)]
#[command(name = "questline")]
#[command(about = "Boss-battle task tracker", long_about = None)]
struct Cli {
    /// Data directory
    #[arg(long, default_value = ".questline")]
    data_dir: String,

    /// Acting user (auth subject)
    #[arg(long, default_value = "local")]
    user: String,

    /// Game config TOML (damage / HP / XP tables)
    #[arg(long)]
    config: Option<String>,

    /// Webhook URL for due-task notifications
    #[arg(long)]
    webhook: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or show the local user profile
    Init,
    /// Add a new boss
    AddBoss {
        /// Boss title
        title: String,
        /// Difficulty (easy/medium/hard/epic)
        #[arg(long, default_value = "medium")]
        difficulty: String,
        /// Override starting HP (defaults to the config table)
        #[arg(long)]
        hp: Option<u32>,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
        /// Parent boss ID
        #[arg(long)]
        parent: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Add a new task
    AddTask {
        /// Task title
        title: String,
        /// Difficulty (easy/medium/hard/epic)
        #[arg(long, default_value = "medium")]
        difficulty: String,
        /// Recur every N days (0 = one-shot)
        #[arg(long, default_value = "0")]
        every: u32,
        /// Boss this task damages
        #[arg(long)]
        boss: Option<String>,
        /// Parent task ID
        #[arg(long)]
        parent: Option<String>,
        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List bosses
    Bosses,
    /// List tasks
    Tasks {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },
    /// Show task details
    ShowTask {
        /// Task ID
        id: String,
    },
    /// Complete a task, damaging its boss
    Complete {
        /// Task ID
        id: String,
    },
    /// Delete a task and its sub-tasks
    RmTask {
        /// Task ID
        id: String,
    },
    /// Delete a boss
    RmBoss {
        /// Boss ID
        id: String,
    },
    /// Reopen recurring tasks whose day has arrived
    Scan,
    /// Scan now and at every local midnight
    Watch,
    /// Show counts
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    let config = Arc::new(match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    });

    let store = Arc::new(Mutex::new(JsonStore::new(&cli.data_dir).await?));
    let users = UserService::new(store.clone());
    let bosses = BossService::new(store.clone(), config.clone());
    let tasks = TaskService::new(store.clone());
    let engine = CompletionEngine::new(store.clone(), config.clone());

    let user = users.get_or_create(&cli.user).await?;
    let session = Session::new(user.id);

    match cli.command {
        Commands::Init => {
            println!("{} (level {}, {} XP)", user.username, user.level, user.experience);
            println!("  id: {}", user.id);
        }
        Commands::AddBoss {
            title,
            difficulty,
            hp,
            description,
            parent,
            due,
        } => {
            let boss = bosses
                .create(
                    &session,
                    CreateBoss {
                        title,
                        description,
                        difficulty: parse_difficulty(&difficulty)?,
                        max_hp: hp,
                        parent_goal_id: parent.as_deref().map(parse_id).transpose()?,
                        due_date: due.as_deref().map(parse_date).transpose()?,
                    },
                )
                .await?;
            println!("Added boss: {} - {} ({} HP)", boss.id, boss.title, boss.max_hp);
        }
        Commands::AddTask {
            title,
            difficulty,
            every,
            boss,
            parent,
            description,
        } => {
            let task = tasks
                .create(
                    &session,
                    CreateTask {
                        title,
                        description,
                        difficulty: parse_difficulty(&difficulty)?,
                        recurrence_days: every,
                        goal_id: boss.as_deref().map(parse_id).transpose()?,
                        parent_task_id: parent.as_deref().map(parse_id).transpose()?,
                    },
                )
                .await?;
            println!("Added task: {} - {}", task.id, task.title);
        }
        Commands::Bosses => {
            let list = bosses.list(&session).await?;
            println!("Bosses ({})", list.len());
            for boss in list {
                let state = if boss.is_defeated() { " [DEFEATED]" } else { "" };
                println!(
                    "  {} | {} | {}/{} HP | {}{}",
                    boss.id, boss.difficulty, boss.current_hp, boss.max_hp, boss.title, state,
                );
            }
        }
        Commands::Tasks { all } => {
            let mut list = tasks.list(&session).await?;
            if !all {
                list.retain(|t| !t.completed);
            }
            println!("Tasks ({})", list.len());
            for task in list {
                let state = if task.completed {
                    "done"
                } else if task.is_due {
                    "DUE"
                } else {
                    "open"
                };
                let recur = if task.is_recurring() {
                    format!(" (every {}d)", task.recurrence_days)
                } else {
                    String::new()
                };
                println!(
                    "  {} | {} | {} | {}{}",
                    task.id, state, task.difficulty, task.title, recur,
                );
            }
        }
        Commands::ShowTask { id } => {
            let task = tasks.get(&session, parse_id(&id)?).await?;
            println!("Task: {}", task.id);
            println!("  Title: {}", task.title);
            if !task.description.is_empty() {
                println!("  Description: {}", task.description);
            }
            println!("  Difficulty: {}", task.difficulty);
            println!(
                "  Status: {}",
                if task.completed {
                    "completed"
                } else if task.is_due {
                    "due"
                } else {
                    "open"
                }
            );
            if task.is_recurring() {
                println!("  Recurs: every {} days", task.recurrence_days);
                if let Some(next) = task.next_due() {
                    println!("  Next due: {next}");
                }
            }
            if let Some(goal_id) = task.goal_id {
                println!("  Boss: {goal_id}");
            }
            if let Some(parent) = task.parent_task_id {
                println!("  Parent: {parent}");
            }
            println!("  Created: {}", task.created_at);
        }
        Commands::Complete { id } => {
            let outcome = engine.complete_task(&session, parse_id(&id)?).await?;
            println!("Completed: {}", outcome.task.title);
            if let Some(hit) = outcome.boss {
                println!("  boss {} now at {} HP", hit.boss_id, hit.new_hp);
                if hit.defeated {
                    println!("  boss defeated!");
                }
            }
        }
        Commands::RmTask { id } => {
            tasks.delete(&session, parse_id(&id)?).await?;
            println!("Deleted task {id} (and any sub-tasks)");
        }
        Commands::RmBoss { id } => {
            bosses.delete(&session, parse_id(&id)?).await?;
            println!("Deleted boss {id}");
        }
        Commands::Scan => {
            let report = run_scan(store.clone(), cli.webhook.clone()).await?;
            println!(
                "Scanned {} completed recurring tasks, reopened {}",
                report.scanned,
                report.reopened.len(),
            );
        }
        Commands::Watch => match cli.webhook.clone() {
            Some(url) => {
                let scanner = RecurrenceScanner::new(store.clone(), WebhookNotifier::new(url));
                scanner.run_daily().await?;
            }
            None => {
                let scanner = RecurrenceScanner::new(store.clone(), NoopNotifier);
                scanner.run_daily().await?;
            }
        },
        Commands::Status => {
            let all_tasks = tasks.list(&session).await?;
            let open = all_tasks.iter().filter(|t| !t.completed).count();
            let due = all_tasks.iter().filter(|t| t.is_due).count();
            let done = all_tasks.iter().filter(|t| t.completed).count();

            let all_bosses = bosses.list(&session).await?;
            let live = all_bosses.iter().filter(|b| !b.is_defeated()).count();
            let defeated = all_bosses.len() - live;

            println!("Questline Status - {} (level {})", user.username, user.level);
            println!("  tasks: {open} open ({due} due), {done} completed");
            println!("  bosses: {live} active, {defeated} defeated");
        }
    }

    Ok(())
}

async fn run_scan(
    store: Arc<Mutex<JsonStore>>,
    webhook: Option<String>,
) -> Result<questline_engine::ScanReport> {
    let today = chrono::Local::now().date_naive();
    let report = match webhook {
        Some(url) => {
            RecurrenceScanner::new(store, WebhookNotifier::new(url))
                .scan_and_reopen(today)
                .await?
        }
        None => {
            RecurrenceScanner::new(store, NoopNotifier)
                .scan_and_reopen(today)
                .await?
        }
    };
    Ok(report)
}

fn parse_difficulty(s: &str) -> Result<Difficulty> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("difficulty must be one of easy, medium, hard, epic"))
}

fn parse_id<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.parse().map_err(|_| anyhow::anyhow!("invalid ID: {s}"))
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate> {
    s.parse().map_err(|_| anyhow::anyhow!("invalid date: {s} (expected YYYY-MM-DD)"))
}
