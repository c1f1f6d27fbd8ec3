use chrono::Local;
use clap::Parser;

use tasklist_core::codec::parse_iso_date;
use tasklist_core::{FilterExt, Priority, TagFilter, TaskCollection, TaskFilter, TaskId, codec};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::display::{format_summary, format_task, supports_color};
use crate::error::{CliError, Result};
use crate::storage::{TodoFile, archive_completed};

mod cli;
mod config;
mod display;
mod error;
mod storage;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg = Config::load()?;

    let tasks_file = match &cli.file {
        Some(path) => TodoFile::new(path),
        None => {
            let file = TodoFile::new(&cfg.task_file);
            file.create_if_missing()?;
            file
        }
    };

    let mut collection = TaskCollection::new();
    tasks_file.load_into(&mut collection)?;
    let today = Local::now().date_naive();

    match cli.command {
        Commands::Add { text, no_date } => {
            let mut task = codec::parse(&text.join(" "));
            if cfg.add_creation_date && !no_date {
                task.stamp_creation_date(today);
            }

            let id = collection.add(task);
            tasks_file.save(&collection)?;
            println!("Added #{}: {}", id, render(&collection, id)?);
        }

        Commands::List {
            all,
            context,
            no_context,
            project,
            no_project,
            search,
            sort,
            reverse,
            no_color,
            json,
        } => {
            let filter = TaskFilter::new()
                .with_done(all)
                .with_context(tag_filter(context, no_context))
                .with_project(tag_filter(project, no_project))
                .with_search(search)
                .sort_by(sort.into())
                .with_reverse(reverse);

            let tasks = collection.get_filtered(&filter);

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks found.");
            } else {
                let use_color = !no_color && supports_color();

                for task in &tasks {
                    println!("{}", format_task(task, today, use_color));
                }

                println!();
                let summary = format_summary(
                    tasks.len(),
                    collection.len(),
                    collection.count_completed(),
                    tasks.iter().filter(|t| t.is_overdue(today)).count(),
                    use_color,
                );
                println!("{}", summary);
            }
        }

        Commands::Done { ids } => {
            let ids = task_ids(&ids);
            let changed = collection.set_done(&ids, true)?;
            if changed > 0 {
                tasks_file.save(&collection)?;
            }
            for id in ids {
                println!("Done #{}: {}", id, render(&collection, id)?);
            }
        }

        Commands::Undo { ids } => {
            let ids = task_ids(&ids);
            let changed = collection.set_done(&ids, false)?;
            if changed > 0 {
                tasks_file.save(&collection)?;
            }
            for id in ids {
                println!("Reopened #{}: {}", id, render(&collection, id)?);
            }
        }

        Commands::Pri { id, priority } => {
            let id = TaskId(id);
            let priority = if priority.eq_ignore_ascii_case("none") {
                Priority::None
            } else {
                priority.to_uppercase().parse::<Priority>()?
            };

            collection.update(id, |task| task.set_priority(priority))??;
            tasks_file.save(&collection)?;
            println!("Updated #{}: {}", id, render(&collection, id)?);
        }

        Commands::Due { id, date } => {
            let id = TaskId(id);
            let due = if date.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse_iso_date(&date).ok_or_else(|| {
                    CliError::validation("due", format!("'{}' is not a YYYY-MM-DD date", date))
                })?)
            };

            collection.update(id, |task| task.due_date = due)?;
            tasks_file.save(&collection)?;
            println!("Updated #{}: {}", id, render(&collection, id)?);
        }

        Commands::Edit { id, text } => {
            let id = TaskId(id);
            let parsed = codec::parse(&text.join(" "));

            collection.update(id, |task| {
                task.description = parsed.description;
                task.contexts = parsed.contexts;
                task.projects = parsed.projects;
                task.metadata = parsed.metadata;
                if parsed.due_date.is_some() {
                    task.due_date = parsed.due_date;
                }
            })?;
            tasks_file.save(&collection)?;
            println!("Updated #{}: {}", id, render(&collection, id)?);
        }

        Commands::Copy { id } => {
            let copy = collection.duplicate(TaskId(id))?;
            tasks_file.save(&collection)?;
            println!("Copied #{} to #{}: {}", id, copy, render(&collection, copy)?);
        }

        Commands::Rm { id } => {
            let id = TaskId(id);
            let removed = collection.remove(id).ok_or(CliError::TaskNotFound(id))?;
            tasks_file.save(&collection)?;
            println!("Removed: {}", codec::render(&removed));
        }

        Commands::Archive => {
            let archive = TodoFile::new(cfg.archive_path(tasks_file.path()));
            let moved = archive_completed(&mut collection, &archive)?;

            if moved == 0 {
                println!("No completed tasks to archive.");
                return Ok(());
            }

            tasks_file.save(&collection)?;
            println!(
                "Moved {} completed task(s) to {}.",
                moved,
                archive.path().display()
            );
        }

        Commands::Contexts => print_tags(collection.contexts().tags(), "contexts", '@'),

        Commands::Projects => print_tags(collection.projects().tags(), "projects", '+'),
    }

    Ok(())
}

fn task_ids(ids: &[u32]) -> Vec<TaskId> {
    ids.iter().copied().map(TaskId).collect()
}

fn tag_filter(name: Option<String>, without: bool) -> TagFilter {
    match name {
        Some(name) => TagFilter::Named(name.trim_start_matches(['@', '+']).to_string()),
        None if without => TagFilter::Without,
        None => TagFilter::All,
    }
}

fn render(collection: &TaskCollection, id: TaskId) -> Result<String> {
    Ok(codec::render(collection.get_or_err(id)?))
}

fn print_tags(tags: &[String], kind: &str, prefix: char) {
    if tags.is_empty() {
        println!("No {} found.", kind);
    }
    for tag in tags {
        println!("{}{}", prefix, tag);
    }
}
