// goal.rs — Goal subcommands: add, list, show, done, remove, photo.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;
use ds_goal::{Goal, GoalError, SharedGoalStore};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a new daily goal.
    Add {
        /// Goal title (e.g., "Read 20 pages").
        title: String,
        /// Longer description of the goal.
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List all goals, newest first.
    List,
    /// Show details and photos for one goal.
    Show {
        /// Goal ID (or a unique prefix of it).
        id: String,
    },
    /// Mark a goal complete for today; run again to uncheck.
    Done {
        /// Goal ID (or a unique prefix of it).
        id: String,
    },
    /// Delete a goal and all of its photos.
    Remove {
        /// Goal ID (or a unique prefix of it).
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Attach a progress photo to a goal.
    Photo {
        /// Goal ID (or a unique prefix of it).
        id: String,
        /// Path to an image file.
        path: PathBuf,
    },
}

/// The calendar days a command runs against.
#[derive(Debug, Clone, Copy)]
pub struct Today {
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
}

pub async fn execute(
    cmd: &GoalCommands,
    store: &SharedGoalStore,
    days: Today,
) -> anyhow::Result<()> {
    match cmd {
        GoalCommands::Add { title, description } => add_goal(store, title, description),
        GoalCommands::List => list_goals(store, days.today),
        GoalCommands::Show { id } => show_goal(store, id, days.today),
        GoalCommands::Done { id } => toggle_goal(store, id, days),
        GoalCommands::Remove { id, yes } => {
            let stdin = io::stdin();
            remove_goal(store, id, *yes, &mut stdin.lock())
        }
        GoalCommands::Photo { id, path } => attach_photo(store, id, path).await,
    }
}

fn add_goal(store: &SharedGoalStore, title: &str, description: &str) -> anyhow::Result<()> {
    let goal = surface(store.add(title, description))?;
    println!("Goal added: {}", goal.id);
    println!("  Title: {}", goal.title);
    Ok(())
}

fn list_goals(store: &SharedGoalStore, today: NaiveDate) -> anyhow::Result<()> {
    let goals = store.snapshot();

    if goals.is_empty() {
        println!("No goals yet. Add one with `streak add <title>`.");
        return Ok(());
    }

    println!(
        "{:<10} {:<30} {:<7} {:<7} {:<6}",
        "ID", "TITLE", "TODAY", "STREAK", "PHOTOS"
    );
    println!("{}", "-".repeat(64));

    for g in &goals {
        println!(
            "{:<10} {:<30} {:<7} {:<7} {:<6}",
            short_id(g.id),
            truncate(&g.title, 28),
            if g.is_completed_on(today) { "done" } else { "-" },
            g.streak,
            g.photos.len(),
        );
    }
    let done = goals.iter().filter(|g| g.is_completed_on(today)).count();
    println!("\n{} of {} goal(s) done today.", done, goals.len());

    Ok(())
}

fn show_goal(store: &SharedGoalStore, id: &str, today: NaiveDate) -> anyhow::Result<()> {
    let goal_id = resolve_id(&store.snapshot(), id)?;
    let Some(g) = store.get(goal_id) else {
        anyhow::bail!("Goal not found: {}", id);
    };

    println!("Goal:        {}", g.id);
    println!("Title:       {}", g.title);
    if !g.description.is_empty() {
        println!("Description: {}", g.description);
    }
    println!("Created:     {}", g.created_at.to_rfc3339());
    println!("Streak:      {}", g.streak);
    match g.last_completed_date {
        Some(d) if d == today => println!("Last done:   {} (today)", d),
        Some(d) => println!("Last done:   {}", d),
        None => println!("Last done:   never"),
    }
    println!("Photos:      {}", g.photos.len());
    for p in &g.photos {
        println!("  {}  {}  {} bytes", short_id(p.id), p.date.to_rfc3339(), p.image.len());
    }

    Ok(())
}

fn toggle_goal(store: &SharedGoalStore, id: &str, days: Today) -> anyhow::Result<()> {
    let goal_id = resolve_id(&store.snapshot(), id)?;
    let g = surface(store.toggle(goal_id, days.today, days.yesterday))?;
    if g.is_completed_on(days.today) {
        println!("Done for today: {} (streak {})", g.title, g.streak);
    } else {
        println!("Unchecked: {} (streak {})", g.title, g.streak);
    }
    Ok(())
}

fn remove_goal(
    store: &SharedGoalStore,
    id: &str,
    yes: bool,
    input: &mut dyn BufRead,
) -> anyhow::Result<()> {
    let goal_id = resolve_id(&store.snapshot(), id)?;
    let Some(g) = store.get(goal_id) else {
        anyhow::bail!("Goal not found: {}", id);
    };

    if !yes && !confirm(&g, input)? {
        println!("Cancelled.");
        return Ok(());
    }

    if let Some(removed) = surface(store.remove(goal_id))? {
        println!("Deleted goal: {} ({})", removed.title, removed.id);
    }
    Ok(())
}

fn confirm(goal: &Goal, input: &mut dyn BufRead) -> anyhow::Result<bool> {
    print!(
        "Delete \"{}\" and its {} photo(s)? This cannot be undone. [y/N] ",
        goal.title,
        goal.photos.len()
    );
    io::stdout().flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn attach_photo(store: &SharedGoalStore, id: &str, path: &Path) -> anyhow::Result<()> {
    let goal_id = resolve_id(&store.snapshot(), id)?;
    let photo = surface(store.attach_photo_file(goal_id, path).await)?;
    println!("Photo attached: {} ({} bytes stored)", photo.id, photo.image.len());
    Ok(())
}

/// Turn a store result into a CLI result, warning loudly when the change
/// happened in memory but could not be saved.
fn surface<T>(result: Result<T, GoalError>) -> anyhow::Result<T> {
    result.map_err(|e| {
        if let GoalError::Storage(_) = e {
            eprintln!("WARNING: your change was NOT saved: {}", e);
            if e.is_quota_exceeded() {
                eprintln!("Storage is full. Remove a goal or some photos to free space.");
            }
        }
        anyhow::Error::new(e)
    })
}

/// Accept a full UUID or any unique prefix of one.
fn resolve_id(goals: &[Goal], input: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }
    let needle = input.to_ascii_lowercase();
    let matches: Vec<Uuid> = goals
        .iter()
        .map(|g| g.id)
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => anyhow::bail!("Goal not found: {}", input),
        _ => anyhow::bail!("Ambiguous goal ID '{}' matches {} goals", input, matches.len()),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
