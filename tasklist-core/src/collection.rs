//! In-memory task list
//!
//! A [`TaskCollection`] holds the tasks of one opened todo.txt file in
//! storage order, the known contexts and projects, and the id counter for
//! the list. It performs no I/O: lines come in and go out as strings.

use chrono::{Local, NaiveDate};
use std::io;

use crate::codec;
use crate::error::{CoreError, LoadError, Result};
use crate::task::{Task, TaskId};

/// Id counter owned by a collection
///
/// Hands out strictly increasing ids starting at 1. Only [`TaskIds::reset`]
/// moves it backwards.
#[derive(Debug, Default, Clone)]
pub struct TaskIds {
    last: u32,
}

impl TaskIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused id
    pub fn next_id(&mut self) -> TaskId {
        self.last += 1;
        TaskId(self.last)
    }

    /// Last id handed out, `TaskId::UNASSIGNED` after a reset
    pub fn last(&self) -> TaskId {
        TaskId(self.last)
    }

    pub fn reset(&mut self) {
        self.last = 0;
    }
}

/// Sorted, de-duplicated list of tag names
///
/// Callers may pin entries at the head (for example "all" and "without"
/// labels of a filter menu). Pinned entries stay in place; the tags after
/// them are kept in case-insensitive order. Duplicate detection is exact,
/// so `Home` and `home` are two tags.
#[derive(Debug, Default, Clone)]
pub struct TagList {
    pinned: Vec<String>,
    tags: Vec<String>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list whose head holds the given entries
    pub fn with_pinned<I, S>(pinned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pinned: pinned.into_iter().map(Into::into).collect(),
            tags: Vec::new(),
        }
    }

    /// Insert a tag unless an identical entry exists; returns whether it was added
    pub fn insert(&mut self, tag: &str) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        self.tags.sort_by_key(|t| t.to_lowercase());
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.pinned.iter().chain(self.tags.iter()).any(|t| t == tag)
    }

    /// Drop every tag, keeping the pinned head
    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Pinned entries followed by the sorted tags
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pinned.iter().chain(self.tags.iter()).map(String::as_str)
    }

    /// Only the tags, without the pinned head
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn pinned(&self) -> &[String] {
        &self.pinned
    }

    pub fn len(&self) -> usize {
        self.pinned.len() + self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty() && self.tags.is_empty()
    }
}

/// Completed tasks taken out of a collection by [`TaskCollection::archive_completed`]
///
/// Holds the rendered lines for the archive file and the removed tasks with
/// their former positions, so the move can be undone if writing fails.
#[derive(Debug, Default)]
pub struct ArchiveBatch {
    lines: Vec<String>,
    removed: Vec<(usize, Task)>,
}

impl ArchiveBatch {
    /// Rendered lines, in their original relative order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of archived tasks
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The removed tasks
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.removed.iter().map(|(_, task)| task)
    }
}

/// In-memory collection of tasks for one todo.txt file
#[derive(Debug, Default)]
pub struct TaskCollection {
    tasks: Vec<Task>,
    ids: TaskIds,
    contexts: TagList,
    projects: TagList,
}

impl TaskCollection {
    /// Create a new empty task collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection whose tag lists start with pinned entries
    pub fn with_tag_lists(contexts: TagList, projects: TagList) -> Self {
        Self {
            contexts,
            projects,
            ..Self::default()
        }
    }

    /// Replace the contents with the parsed lines
    ///
    /// Ids restart at 1. If any line fails to read, the error is returned
    /// and the collection is left exactly as it was.
    pub fn load<I>(&mut self, lines: I) -> std::result::Result<(), LoadError>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mut ids = TaskIds::new();
        let mut tasks = Vec::new();

        for line in lines {
            let line = line.map_err(|source| LoadError::Io { source })?;
            let mut task = codec::parse(&line);
            task.id = ids.next_id();
            tasks.push(task);
        }

        self.tasks = tasks;
        self.ids = ids;
        self.contexts.clear();
        self.projects.clear();
        for i in 0..self.tasks.len() {
            self.register_tags(i);
        }

        tracing::debug!(
            tasks = self.tasks.len(),
            contexts = self.contexts.tags().len(),
            projects = self.projects.tags().len(),
            "loaded task list"
        );
        Ok(())
    }

    /// Render every task in storage order
    pub fn render_all(&self) -> Vec<String> {
        self.tasks.iter().map(codec::render).collect()
    }

    /// Remove every completed task and return it rendered for the archive
    ///
    /// The collection is unchanged when nothing is completed.
    pub fn archive_completed(&mut self) -> ArchiveBatch {
        let mut batch = ArchiveBatch::default();
        let mut kept = Vec::with_capacity(self.tasks.len());

        for (position, task) in std::mem::take(&mut self.tasks).into_iter().enumerate() {
            if task.is_done() {
                batch.lines.push(codec::render(&task));
                batch.removed.push((position, task));
            } else {
                kept.push(task);
            }
        }
        self.tasks = kept;

        tracing::debug!(
            archived = batch.count(),
            remaining = self.tasks.len(),
            "archived completed tasks"
        );
        batch
    }

    /// Put archived tasks back where they were
    pub fn restore_archived(&mut self, batch: ArchiveBatch) {
        let restored = batch.removed.len();
        for (position, task) in batch.removed {
            let position = position.min(self.tasks.len());
            self.tasks.insert(position, task);
        }
        tracing::debug!(restored, "restored archived tasks");
    }

    /// Add a context to the known contexts
    pub fn add_context(&mut self, name: &str) -> bool {
        self.contexts.insert(name)
    }

    /// Add a project to the known projects
    pub fn add_project(&mut self, name: &str) -> bool {
        self.projects.insert(name)
    }

    pub fn contexts(&self) -> &TagList {
        &self.contexts
    }

    pub fn projects(&self) -> &TagList {
        &self.projects
    }

    /// Add a task, assigning it a fresh id
    pub fn add(&mut self, mut task: Task) -> TaskId {
        let id = self.ids.next_id();
        task.id = id;
        self.tasks.push(task);
        self.register_tags(self.tasks.len() - 1);
        id
    }

    /// Append a copy of a task under a fresh id
    pub fn duplicate(&mut self, id: TaskId) -> Result<TaskId> {
        let copy = self.get_or_err(id)?.clone();
        Ok(self.add(copy))
    }

    /// Get a task by ID
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get or return error if task not found
    pub fn get_or_err(&self, id: TaskId) -> Result<&Task> {
        self.get(id).ok_or(CoreError::TaskNotFound(id))
    }

    /// Storage position of a task
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Edit a task in place, then fold its tags into the known lists
    pub fn update<F, T>(&mut self, id: TaskId, edit: F) -> Result<T>
    where
        F: FnOnce(&mut Task) -> T,
    {
        let index = self.position(id).ok_or(CoreError::TaskNotFound(id))?;
        let result = edit(&mut self.tasks[index]);
        self.register_tags(index);
        Ok(result)
    }

    /// Remove a task by ID
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Set the done status of several tasks
    ///
    /// Every id is checked before anything changes. Returns how many tasks
    /// actually changed status.
    pub fn set_done(&mut self, ids: &[TaskId], done: bool) -> Result<usize> {
        self.set_done_on(ids, done, Local::now().date_naive())
    }

    /// [`TaskCollection::set_done`] with an explicit completion date
    pub fn set_done_on(&mut self, ids: &[TaskId], done: bool, today: NaiveDate) -> Result<usize> {
        if let Some(missing) = ids.iter().find(|id| self.get(**id).is_none()) {
            return Err(CoreError::TaskNotFound(*missing));
        }

        let mut changed = 0;
        for task in self.tasks.iter_mut().filter(|t| ids.contains(&t.id)) {
            if task.is_done() != done {
                task.set_done_on(done, today);
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Tasks in storage order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Count total tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if collection is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Count completed tasks
    pub fn count_completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_done()).count()
    }

    /// Forget all tasks and restart ids at 1
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.ids.reset();
        self.contexts.clear();
        self.projects.clear();
    }

    fn register_tags(&mut self, index: usize) {
        let task = &self.tasks[index];
        for context in &task.contexts {
            self.contexts.insert(context);
        }
        for project in &task.projects {
            self.projects.insert(project);
        }
    }
}
