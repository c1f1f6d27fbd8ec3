use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use tasklist_core::TaskSort;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Keep a todo.txt task list in order from the terminal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "\nCodeName: ",
    env!("CODENAME")
))]
pub struct Cli {
    /// Task list to open instead of the configured one
    #[arg(long, short = 'f', global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Log debug information to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SortBy {
    Storage,
    Priority,
    Due,
    Description,
}

impl From<SortBy> for TaskSort {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Storage => TaskSort::Storage,
            SortBy::Priority => TaskSort::Priority,
            SortBy::Due => TaskSort::Due,
            SortBy::Description => TaskSort::Description,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adds a task written in todo.txt syntax
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Do not stamp today's date as creation date
        #[arg(long)]
        no_date: bool,
    },

    /// Lists tasks with filtering and sorting
    List {
        /// Include completed tasks
        #[arg(long, short = 'a')]
        all: bool,
        /// Show only tasks with this context
        #[arg(long, short = 'c', value_name = "CONTEXT", conflicts_with = "no_context")]
        context: Option<String>,
        /// Show only tasks without any context
        #[arg(long)]
        no_context: bool,
        /// Show only tasks with this project
        #[arg(long, short = 'p', value_name = "PROJECT", conflicts_with = "no_project")]
        project: Option<String>,
        /// Show only tasks without any project
        #[arg(long)]
        no_project: bool,
        /// Filter tasks containing text (case-insensitive)
        #[arg(long, short = 's', value_name = "TERM")]
        search: Option<String>,
        /// Sort tasks by field
        #[arg(long, value_enum, default_value = "storage")]
        sort: SortBy,
        /// Reverse sort order
        #[arg(long, short = 'r')]
        reverse: bool,
        /// Disable colors
        #[arg(long)]
        no_color: bool,
        /// Print the tasks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Marks tasks as done
    Done {
        #[arg(required = true, num_args = 1.., value_parser = clap::value_parser!(u32))]
        ids: Vec<u32>,
    },

    /// Marks tasks as not done
    Undo {
        #[arg(required = true, num_args = 1.., value_parser = clap::value_parser!(u32))]
        ids: Vec<u32>,
    },

    /// Sets the priority of a task (A-Z, or 'none' to clear)
    Pri {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
        priority: String,
    },

    /// Sets the due date of a task (YYYY-MM-DD, or 'none' to clear)
    Due {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
        date: String,
    },

    /// Replaces the text, tags and metadata of a task
    Edit {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Duplicates a task
    Copy {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
    },

    /// Removes a task
    Rm {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
    },

    /// Moves completed tasks to the archive file
    Archive,

    /// Lists all contexts
    Contexts,

    /// Lists all projects
    Projects,
}
