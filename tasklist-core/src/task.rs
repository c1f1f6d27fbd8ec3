//! Task domain model
//!
//! A [`Task`] is one line of a todo.txt file in structured form. The done
//! flag and the fields derived from it are private so that every status
//! change goes through [`Task::set_done`].

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::codec::parse_iso_date;
use crate::error::{CoreError, Result};

/// Newtype wrapper for task IDs
///
/// Ids are handed out by the owning collection and only re-identify a task
/// inside that collection. They are never written to disk.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl TaskId {
    /// Id of a task that has not been added to a collection yet
    pub const UNASSIGNED: TaskId = TaskId(0);
}

impl From<u32> for TaskId {
    fn from(id: u32) -> Self {
        TaskId(id)
    }
}

impl From<TaskId> for u32 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority slot of a task
///
/// `Completed` is the `x` marker of a done task and can only be reached
/// through the done transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "String")]
pub enum Priority {
    #[default]
    None,
    Letter(char),
    Completed,
}

impl Priority {
    /// Priority for an uppercase ASCII letter, `None` for anything else
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_uppercase().then_some(Self::Letter(c))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Letter(c) => write!(f, "{}", c),
            Self::Completed => f.write_str("x"),
        }
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    /// Accepts `""`, `"x"` or a single uppercase letter
    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(Self::None),
            (Some('x'), None) => Ok(Self::Completed),
            (Some(c), None) => Self::letter(c).ok_or_else(|| {
                CoreError::validation("priority", format!("'{}' is not a letter A-Z", s))
            }),
            _ => Err(CoreError::validation(
                "priority",
                format!("'{}' is not a single letter", s),
            )),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.to_string()
    }
}

/// A single task
#[derive(Serialize, Debug, Clone, Default)]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) priority: Priority,
    pub(crate) done: bool,
    /// Priority to restore when the task is reopened
    #[serde(skip)]
    pub(crate) last_priority: Priority,
    pub creation_date: Option<NaiveDate>,
    pub(crate) completion_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub description: String,
    /// Context tags without the `@` prefix, in source order
    pub contexts: Vec<String>,
    /// Project tags without the `+` prefix, in source order
    pub projects: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Task {
    /// Create a new open task with the given description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Builder method to set the priority
    ///
    /// `Priority::Completed` is ignored here; use [`Task::set_done`].
    pub fn with_priority(mut self, priority: Priority) -> Self {
        if !priority.is_completed() {
            self.priority = priority;
        }
        self
    }

    /// Builder method to set the creation date
    pub fn with_creation_date(mut self, date: NaiveDate) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// Builder method to set the due date
    pub fn with_due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    /// Builder method to add a context
    pub fn with_context(mut self, context: &str) -> Self {
        self.add_context(context);
        self
    }

    /// Builder method to add a project
    pub fn with_project(mut self, project: &str) -> Self {
        self.add_project(project);
        self
    }

    /// Builder method to add a metadata pair
    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.add_metadata(key, value);
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_date
    }

    /// Set the priority of an open task
    ///
    /// The `x` marker is owned by the done transition, so both setting `x`
    /// and changing the priority of a done task are rejected.
    pub fn set_priority(&mut self, priority: Priority) -> Result<()> {
        if priority.is_completed() {
            return Err(CoreError::validation(
                "priority",
                "mark the task done instead of setting priority 'x'",
            ));
        }
        if self.done {
            return Err(CoreError::validation(
                "priority",
                "reopen the task before changing its priority",
            ));
        }
        self.priority = priority;
        Ok(())
    }

    /// Stamp `today` as creation date unless one is already set
    ///
    /// A done task without a completion date gets `today` as completion
    /// date too, since a lone date after `x` reads back as the completion
    /// date.
    pub fn stamp_creation_date(&mut self, today: NaiveDate) {
        if self.creation_date.is_some() {
            return;
        }
        if self.done && self.completion_date.is_none() {
            self.completion_date = Some(today);
        }
        self.creation_date = Some(today);
    }

    /// Change the done status, stamping today's local date on completion
    pub fn set_done(&mut self, done: bool) {
        self.set_done_on(done, Local::now().date_naive());
    }

    /// Change the done status with an explicit completion date
    ///
    /// Completing remembers the current priority and replaces it with `x`;
    /// reopening restores it and clears the completion date. Setting the
    /// current value again is a no-op.
    pub fn set_done_on(&mut self, done: bool, today: NaiveDate) {
        if self.done == done {
            return;
        }
        self.done = done;

        if done {
            self.last_priority = self.priority;
            self.priority = Priority::Completed;
            self.completion_date = Some(today);
        } else {
            self.priority = if self.last_priority.is_completed() {
                Priority::None
            } else {
                self.last_priority
            };
            self.completion_date = None;
        }
    }

    /// Add a context (leading `@` is stripped, duplicates are ignored)
    ///
    /// [`crate::parse`] keeps a line's tags verbatim, repeats included, so
    /// the line renders back unchanged. Edits made through this method
    /// never introduce a repeat.
    pub fn add_context(&mut self, context: &str) {
        push_tag(&mut self.contexts, context.trim_start_matches('@'));
    }

    /// Add a project (leading `+` is stripped, duplicates are ignored)
    ///
    /// See [`Task::add_context`] for how this differs from parsing.
    pub fn add_project(&mut self, project: &str) {
        push_tag(&mut self.projects, project.trim_start_matches('+'));
    }

    /// Remove a context, returns whether it was present
    pub fn remove_context(&mut self, context: &str) -> bool {
        remove_tag(&mut self.contexts, context.trim_start_matches('@'))
    }

    /// Remove a project, returns whether it was present
    pub fn remove_project(&mut self, project: &str) -> bool {
        remove_tag(&mut self.projects, project.trim_start_matches('+'))
    }

    /// Add a `key:value` pair
    ///
    /// A `due` key (any case) with a valid `YYYY-MM-DD` value sets the due
    /// date instead of being stored as metadata.
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("due")
            && let Some(date) = parse_iso_date(value)
        {
            self.due_date = Some(date);
            return;
        }
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Check if the task is open and its due date lies before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.done && self.due_date.is_some_and(|due| due < today)
    }
}

/// Content equality; collection ids are not part of a task's content
impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
            && self.done == other.done
            && self.creation_date == other.creation_date
            && self.completion_date == other.completion_date
            && self.due_date == other.due_date
            && self.description == other.description
            && self.contexts == other.contexts
            && self.projects == other.projects
            && self.metadata == other.metadata
    }
}

impl Eq for Task {}

fn push_tag(tags: &mut Vec<String>, tag: &str) {
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

fn remove_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    if let Some(pos) = tags.iter().position(|t| t == tag) {
        tags.remove(pos);
        true
    } else {
        false
    }
}
