//! Task filtering and sorting logic
//!
//! Provides a builder-style API for choosing which tasks a view shows and
//! in which order. Filtering never reorders the collection itself.

use std::str::FromStr;

use crate::error::CoreError;
use crate::ordering::{by_due, by_priority};
use crate::task::Task;

/// Sort order for tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSort {
    /// Order of the lines in the file
    #[default]
    Storage,
    Priority,
    Due,
    Description,
}

impl FromStr for TaskSort {
    type Err = CoreError;

    /// Parse a sort key (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "storage" | "file" => Ok(Self::Storage),
            "priority" | "pri" => Ok(Self::Priority),
            "due" => Ok(Self::Due),
            "description" | "text" => Ok(Self::Description),
            other => Err(CoreError::validation(
                "sort",
                format!("unknown sort key '{}'", other),
            )),
        }
    }
}

/// Selection for one tag dimension (contexts or projects)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    /// Every task
    #[default]
    All,
    /// Only tasks without any tag of this kind
    Without,
    /// Only tasks carrying this exact tag
    Named(String),
}

impl TagFilter {
    fn matches(&self, tags: &[String]) -> bool {
        match self {
            Self::All => true,
            Self::Without => tags.is_empty(),
            Self::Named(name) => tags.iter().any(|t| t == name),
        }
    }
}

/// Builder for filtering tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Include completed tasks (hidden by default)
    pub show_done: bool,
    pub context: TagFilter,
    pub project: TagFilter,
    /// Search term for the description (case-insensitive)
    pub search: Option<String>,
    pub sort: TaskSort,
    pub reverse: bool,
}

impl TaskFilter {
    /// Create a new filter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Also show completed tasks
    pub fn including_done(mut self) -> Self {
        self.show_done = true;
        self
    }

    /// Set whether completed tasks are shown
    pub fn with_done(mut self, show_done: bool) -> Self {
        self.show_done = show_done;
        self
    }

    /// Filter by context
    pub fn with_context(mut self, context: TagFilter) -> Self {
        self.context = context;
        self
    }

    /// Filter by project
    pub fn with_project(mut self, project: TagFilter) -> Self {
        self.project = project;
        self
    }

    /// Filter by search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Set search term
    pub fn with_search(mut self, term: Option<String>) -> Self {
        self.search = term;
        self
    }

    /// Sort by given field
    pub fn sort_by(mut self, sort: TaskSort) -> Self {
        self.sort = sort;
        self
    }

    /// Set reverse flag
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Check if a task matches this filter
    pub fn matches(&self, task: &Task) -> bool {
        if task.is_done() && !self.show_done {
            return false;
        }

        if !self.context.matches(&task.contexts) || !self.project.matches(&task.projects) {
            return false;
        }

        if let Some(term) = &self.search
            && !task.description.to_lowercase().contains(&term.to_lowercase())
        {
            return false;
        }

        true
    }

    /// Apply filter and sort to a sequence of tasks
    ///
    /// Sorting is stable, so equal keys keep their storage order.
    pub fn apply<'a>(&self, tasks: impl Iterator<Item = &'a Task>) -> Vec<&'a Task> {
        let mut filtered: Vec<&Task> = tasks.filter(|t| self.matches(t)).collect();

        match self.sort {
            TaskSort::Storage => {}
            TaskSort::Priority => filtered.sort_by(|a, b| by_priority(a, b)),
            TaskSort::Due => filtered.sort_by(|a, b| by_due(a, b)),
            TaskSort::Description => {
                filtered.sort_by_key(|t| t.description.to_lowercase());
            }
        }

        if self.reverse {
            filtered.reverse();
        }

        filtered
    }
}

/// Extension trait for TaskCollection to support filtering
pub trait FilterExt {
    /// Get tasks filtered and sorted according to the filter
    fn get_filtered(&self, filter: &TaskFilter) -> Vec<&Task>;
}

impl FilterExt for crate::collection::TaskCollection {
    fn get_filtered(&self, filter: &TaskFilter) -> Vec<&Task> {
        filter.apply(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::TaskCollection;

    fn collection() -> TaskCollection {
        let mut collection = TaskCollection::new();
        let lines = [
            "(B) Pay bills @home due:2024-05-10",
            "x 2024-04-01 Return books @town +library",
            "Fix bike @home +cycling due:2024-04-20",
            "(A) Call plumber @phone",
            "Read novel",
        ];
        collection
            .load(lines.iter().map(|l| Ok(l.to_string())))
            .unwrap();
        collection
    }

    fn descriptions(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.description.clone()).collect()
    }

    #[test]
    fn test_done_hidden_by_default() {
        let collection = collection();

        assert_eq!(collection.get_filtered(&TaskFilter::new()).len(), 4);
        assert_eq!(
            collection
                .get_filtered(&TaskFilter::new().including_done())
                .len(),
            5
        );
    }

    #[test]
    fn test_filter_context() {
        let collection = collection();

        let filter = TaskFilter::new().with_context(TagFilter::Named("home".to_string()));
        let results = collection.get_filtered(&filter);
        assert_eq!(descriptions(&results), vec!["Pay bills", "Fix bike"]);

        let filter = TaskFilter::new().with_context(TagFilter::Without);
        let results = collection.get_filtered(&filter);
        assert_eq!(descriptions(&results), vec!["Read novel"]);
    }

    #[test]
    fn test_filter_project_including_done() {
        let collection = collection();

        let filter = TaskFilter::new()
            .including_done()
            .with_project(TagFilter::Named("library".to_string()));
        let results = collection.get_filtered(&filter);
        assert_eq!(descriptions(&results), vec!["Return books"]);
    }

    #[test]
    fn test_filter_search() {
        let collection = collection();

        let results = collection.get_filtered(&TaskFilter::new().search("BI"));
        assert_eq!(descriptions(&results), vec!["Pay bills", "Fix bike"]);
    }

    #[test]
    fn test_sort_by_priority() {
        let collection = collection();

        let filter = TaskFilter::new().including_done().sort_by(TaskSort::Priority);
        let results = collection.get_filtered(&filter);
        assert_eq!(
            descriptions(&results),
            vec!["Call plumber", "Pay bills", "Fix bike", "Read novel", "Return books"]
        );
    }

    #[test]
    fn test_sort_by_due() {
        let collection = collection();

        let filter = TaskFilter::new().sort_by(TaskSort::Due);
        let results = collection.get_filtered(&filter);
        assert_eq!(
            descriptions(&results),
            vec!["Fix bike", "Pay bills", "Call plumber", "Read novel"]
        );
    }

    #[test]
    fn test_reverse_sort() {
        let collection = collection();

        let filter = TaskFilter::new()
            .sort_by(TaskSort::Description)
            .with_reverse(true);
        let results = collection.get_filtered(&filter);
        assert_eq!(
            descriptions(&results),
            vec!["Read novel", "Pay bills", "Fix bike", "Call plumber"]
        );
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("Priority".parse::<TaskSort>().unwrap(), TaskSort::Priority);
        assert_eq!("due".parse::<TaskSort>().unwrap(), TaskSort::Due);
        assert!("size".parse::<TaskSort>().is_err());
    }

    #[test]
    fn test_filtering_leaves_storage_order() {
        let collection = collection();
        let before = collection.render_all();

        let _ = collection.get_filtered(&TaskFilter::new().sort_by(TaskSort::Priority));

        assert_eq!(collection.render_all(), before);
    }
}
