//! todo.txt line codec
//!
//! Converts a single todo.txt line into a [`Task`] and back. Parsing never
//! fails: anything that does not look like a structured token ends up in
//! the description.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::task::{Priority, Task};

/// Date format used everywhere in a todo.txt file
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const BOM: char = '\u{feff}';

// Regex patterns are compile-time constants - invalid patterns are programming errors
static PRIORITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([A-Z])\)$").expect("Invalid priority regex pattern"));

static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("Invalid date regex pattern")
});

static PROJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\S+$").expect("Invalid project regex pattern"));

static CONTEXT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@\S+$").expect("Invalid context regex pattern"));

static METADATA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+:\S+$").expect("Invalid metadata regex pattern"));

/// Parse a strict `YYYY-MM-DD` date
///
/// Returns `None` for other digit groupings and for calendar-impossible
/// dates such as `2024-02-30`.
pub fn parse_iso_date(token: &str) -> Option<NaiveDate> {
    if !DATE_REGEX.is_match(token) {
        return None;
    }
    let date = NaiveDate::parse_from_str(token, DATE_FORMAT).ok();
    if date.is_none() {
        tracing::trace!(token, "date-shaped token is not a calendar date");
    }
    date
}

/// Parse one todo.txt line into a task
///
/// A leading byte-order mark is ignored. The returned task has no id yet.
pub fn parse(line: &str) -> Task {
    let line = line.strip_prefix(BOM).unwrap_or(line);
    let mut task = Task::default();
    let mut tokens = line.split_whitespace().peekable();

    // Priority or done marker
    if let Some(&first) = tokens.peek() {
        if let Some(caps) = PRIORITY_REGEX.captures(first) {
            if let Some(letter) = caps.get(1).and_then(|m| m.as_str().chars().next()) {
                task.priority = Priority::Letter(letter);
            }
            tokens.next();
        } else if first == "x" {
            task.priority = Priority::Completed;
            task.last_priority = Priority::Completed;
            task.done = true;
            tokens.next();
        }
    }

    // Completion and/or creation date
    if let Some(date) = tokens.peek().and_then(|t| parse_iso_date(t)) {
        tokens.next();
        if task.done {
            task.completion_date = Some(date);
            if let Some(created) = tokens.peek().and_then(|t| parse_iso_date(t)) {
                tokens.next();
                task.creation_date = Some(created);
            }
        } else {
            task.creation_date = Some(date);
        }
    }

    let mut words: Vec<&str> = Vec::new();
    for token in tokens {
        if PROJECT_REGEX.is_match(token) {
            task.projects.push(token[1..].to_string());
        } else if CONTEXT_REGEX.is_match(token) {
            task.contexts.push(token[1..].to_string());
        } else if METADATA_REGEX.is_match(token)
            && let Some((key, value)) = token.split_once(':')
        {
            task.add_metadata(key, value);
        } else {
            words.push(token);
        }
    }
    task.description = words.join(" ").trim().to_string();

    task
}

/// Render a task as one todo.txt line
pub fn render(task: &Task) -> String {
    let mut parts: Vec<String> = Vec::new();

    match task.priority {
        Priority::Completed => parts.push("x".to_string()),
        Priority::Letter(c) => parts.push(format!("({})", c)),
        Priority::None => {}
    }

    if task.done
        && let Some(date) = task.completion_date
    {
        parts.push(date.format(DATE_FORMAT).to_string());
    }

    if let Some(date) = task.creation_date {
        parts.push(date.format(DATE_FORMAT).to_string());
    }

    if !task.description.is_empty() {
        parts.push(task.description.clone());
    }

    parts.extend(task.contexts.iter().map(|c| format!("@{}", c)));
    parts.extend(task.projects.iter().map(|p| format!("+{}", p)));

    if let Some(date) = task.due_date {
        parts.push(format!("due:{}", date.format(DATE_FORMAT)));
    }

    parts.extend(task.metadata.iter().map(|(k, v)| format!("{}:{}", k, v)));

    parts.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_full_line() {
        let task = parse("(A) 2024-03-01 Buy milk @errand +home due:2024-03-10 phone:555-1234");

        assert_eq!(task.priority(), Priority::Letter('A'));
        assert!(!task.is_done());
        assert_eq!(task.creation_date, Some(date(2024, 3, 1)));
        assert_eq!(task.description, "Buy milk");
        assert_eq!(task.contexts, vec!["errand"]);
        assert_eq!(task.projects, vec!["home"]);
        assert_eq!(task.due_date, Some(date(2024, 3, 10)));
        assert_eq!(task.metadata.len(), 1);
        assert_eq!(task.metadata["phone"], "555-1234");
    }

    #[test]
    fn test_render_full_line() {
        let line = "(A) 2024-03-01 Buy milk @errand +home due:2024-03-10 phone:555-1234";
        assert_eq!(render(&parse(line)), line);
    }

    #[test]
    fn test_parse_empty_line() {
        let task = parse("");
        assert_eq!(task, Task::default());
        assert_eq!(render(&task), "");
    }

    #[test]
    fn test_parse_done_with_two_dates() {
        let task = parse("x 2024-02-03 2024-01-15 Submit report +work");

        assert!(task.is_done());
        assert_eq!(task.priority(), Priority::Completed);
        assert_eq!(task.completion_date(), Some(date(2024, 2, 3)));
        assert_eq!(task.creation_date, Some(date(2024, 1, 15)));
        assert_eq!(task.description, "Submit report");
        assert_eq!(task.projects, vec!["work"]);
    }

    #[test]
    fn test_parse_done_without_dates_keeps_completion_unset() {
        let task = parse("x Sweep floor");

        assert!(task.is_done());
        assert!(task.completion_date().is_none());
        assert_eq!(render(&task), "x Sweep floor");
    }

    #[test]
    fn test_parse_open_task_takes_only_one_leading_date() {
        let task = parse("2024-01-01 2024-01-02 Odd line");

        assert_eq!(task.creation_date, Some(date(2024, 1, 1)));
        assert_eq!(task.description, "2024-01-02 Odd line");
    }

    #[test]
    fn test_parse_malformed_dates_fall_through() {
        let task = parse("24-1-1 Renew passport");
        assert!(task.creation_date.is_none());
        assert_eq!(task.description, "24-1-1 Renew passport");

        let task = parse("2024-13-45 Impossible month");
        assert!(task.creation_date.is_none());
        assert_eq!(task.description, "2024-13-45 Impossible month");
    }

    #[test]
    fn test_parse_due_override() {
        let task = parse("task due:2024-01-01");
        assert_eq!(task.due_date, Some(date(2024, 1, 1)));
        assert!(!task.metadata.contains_key("due"));

        let task = parse("task due:notadate");
        assert!(task.due_date.is_none());
        assert_eq!(task.metadata.get("due").map(String::as_str), Some("notadate"));

        let task = parse("task Due:2024-07-04");
        assert_eq!(task.due_date, Some(date(2024, 7, 4)));
    }

    #[test]
    fn test_parse_metadata_splits_on_first_colon() {
        let task = parse("Read docs url:https://example.com/a:b");
        assert_eq!(task.metadata["url"], "https://example.com/a:b");
        assert_eq!(task.description, "Read docs");
    }

    #[test]
    fn test_parse_ignores_bom() {
        assert_eq!(parse("\u{feff}call mom @phone"), parse("call mom @phone"));
        assert_eq!(parse("\u{feff}(B) call mom").priority(), Priority::Letter('B'));
    }

    #[test]
    fn test_parse_interleaved_tokens() {
        let task = parse("Email @work the +budget draft to Ann");

        assert_eq!(task.description, "Email the draft to Ann");
        assert_eq!(task.contexts, vec!["work"]);
        assert_eq!(task.projects, vec!["budget"]);
    }

    #[test]
    fn test_parse_lone_prefixes_are_description() {
        let task = parse("Compare a + b @ noon");
        assert_eq!(task.description, "Compare a + b @ noon");
        assert!(task.contexts.is_empty());
        assert!(task.projects.is_empty());
    }

    #[test]
    fn test_parse_priority_only_in_first_slot() {
        let task = parse("Call (A) back");
        assert_eq!(task.priority(), Priority::None);
        assert_eq!(task.description, "Call (A) back");

        let task = parse("(a) lowercase is text");
        assert_eq!(task.priority(), Priority::None);
        assert_eq!(task.description, "(a) lowercase is text");
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let task = parse("  (C)\tWash   the car  ");
        assert_eq!(task.priority(), Priority::Letter('C'));
        assert_eq!(task.description, "Wash the car");
    }

    #[test]
    fn test_render_orders_tokens() {
        let task = Task::new("Plan trip")
            .with_project("vacation")
            .with_metadata("budget", "2000")
            .with_context("home")
            .with_due_date(date(2024, 8, 1))
            .with_priority(Priority::Letter('B'))
            .with_creation_date(date(2024, 7, 1));

        assert_eq!(
            render(&task),
            "(B) 2024-07-01 Plan trip @home +vacation due:2024-08-01 budget:2000"
        );
    }

    #[test]
    fn test_render_completed_task() {
        let mut task = Task::new("Ship it").with_creation_date(date(2024, 1, 2));
        task.set_done_on(true, date(2024, 1, 9));

        assert_eq!(render(&task), "x 2024-01-09 2024-01-02 Ship it");
    }

    #[test]
    fn test_roundtrip_preserves_content() {
        let lines = [
            "(A) 2024-03-01 Buy milk @errand +home due:2024-03-10 phone:555-1234",
            "x 2024-02-03 2024-01-15 Submit report +work",
            "x 2024-02-03 (B) still text",
            "Email @work the +budget draft to Ann",
            "task due:notadate",
            "2024-05-05 @a @b +c +d k:v z:1 a:2",
            "(Z) 2024-13-01 not a date",
        ];

        for line in lines {
            let task = parse(line);
            let again = parse(&render(&task));
            assert_eq!(task, again, "roundtrip changed {:?}", line);
        }
    }

    fn assert_reparses(task: &Task) {
        let line = render(task);
        assert_eq!(&parse(&line), task, "reparse changed {:?}", line);
    }

    #[test]
    fn test_roundtrip_after_done_transitions() {
        let mut task = parse("(B) 2024-01-15 Submit report +work due:2024-02-01");

        task.set_done_on(true, date(2024, 2, 3));
        assert_eq!(render(&task), "x 2024-02-03 2024-01-15 Submit report +work due:2024-02-01");
        assert_reparses(&task);

        // The reparsed line no longer knows the old priority
        let mut reloaded = parse(&render(&task));
        reloaded.set_done_on(false, date(2024, 2, 4));
        assert_eq!(render(&reloaded), "2024-01-15 Submit report +work due:2024-02-01");
        assert_reparses(&reloaded);
    }

    #[test]
    fn test_roundtrip_after_priority_change() {
        let mut done = parse("x 2024-02-03 2024-01-15 Submit report");
        assert!(done.set_priority(Priority::Letter('A')).is_err());
        assert_eq!(render(&done), "x 2024-02-03 2024-01-15 Submit report");
        assert_reparses(&done);

        let mut open = parse("2024-01-15 Submit report");
        open.set_priority(Priority::Letter('A')).unwrap();
        assert_eq!(render(&open), "(A) 2024-01-15 Submit report");
        assert_reparses(&open);

        open.set_priority(Priority::None).unwrap();
        assert_reparses(&open);
    }

    #[test]
    fn test_roundtrip_after_creation_stamp() {
        let today = date(2024, 5, 1);

        let mut done = parse("x Pay rent");
        done.stamp_creation_date(today);
        assert_eq!(render(&done), "x 2024-05-01 2024-05-01 Pay rent");
        assert_reparses(&done);

        let mut open = parse("(C) Pay rent @bank");
        open.stamp_creation_date(today);
        assert_eq!(render(&open), "(C) 2024-05-01 Pay rent @bank");
        assert_reparses(&open);
    }

    #[test]
    fn test_roundtrip_after_field_edits() {
        let mut task = parse("(A) 2024-03-01 Buy milk @errand");
        task.add_project("+home");
        task.add_context("errand");
        task.add_metadata("due", "2024-03-10");
        task.add_metadata("phone", "555");
        task.due_date = None;
        task.description = "Buy oat milk".to_string();

        assert_eq!(render(&task), "(A) 2024-03-01 Buy oat milk @errand +home phone:555");
        assert_reparses(&task);
    }

    #[test]
    fn test_parse_keeps_repeated_tags() {
        let line = "Plan @work @work +q3 +q3";
        let task = parse(line);

        assert_eq!(task.contexts, vec!["work", "work"]);
        assert_eq!(render(&task), line);

        let mut edited = task.clone();
        edited.add_context("work");
        assert_eq!(edited.contexts, vec!["work", "work"]);
    }
}
