//! Task display formatting module
//!
//! Handles colored terminal output for task lists

use chrono::NaiveDate;
use colored::*;

use tasklist_core::codec::DATE_FORMAT;
use tasklist_core::{Priority, Task};

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn paint_priority(priority: Priority, use_color: bool) -> String {
    let text = match priority {
        Priority::None => "   ".to_string(),
        Priority::Letter(c) => format!("({})", c),
        Priority::Completed => " x ".to_string(),
    };
    if !use_color {
        return text;
    }
    match priority {
        Priority::Letter('A') => text.red().bold().to_string(),
        Priority::Letter('B') => text.yellow().bold().to_string(),
        Priority::Letter('C') => text.green().bold().to_string(),
        Priority::Letter(_) => text.blue().to_string(),
        Priority::None => text,
        Priority::Completed => text.dimmed().to_string(),
    }
}

/// Format a task as one display line
///
/// `today` decides whether an open task's due date is shown as overdue.
pub fn format_task(task: &Task, today: NaiveDate, use_color: bool) -> String {
    let mut parts = vec![
        format!("{:>3}", task.id().0),
        paint_priority(task.priority(), use_color),
    ];

    if !task.description.is_empty() {
        parts.push(task.description.clone());
    }

    let tags: Vec<String> = task
        .contexts
        .iter()
        .map(|c| format!("@{}", c))
        .chain(task.projects.iter().map(|p| format!("+{}", p)))
        .collect();
    if !tags.is_empty() {
        let tags = tags.join(" ");
        parts.push(if use_color {
            tags.magenta().to_string()
        } else {
            tags
        });
    }

    if let Some(due) = task.due_date {
        let due_str = format!("due:{}", due.format(DATE_FORMAT));
        parts.push(if !use_color {
            due_str
        } else if task.is_overdue(today) {
            due_str.red().bold().to_string()
        } else if due == today {
            due_str.yellow().to_string()
        } else {
            due_str.cyan().to_string()
        });
    }

    let line = parts.join(" ");
    if use_color && task.is_done() {
        line.dimmed().to_string()
    } else {
        line
    }
}

/// Format a summary line for task list
pub fn format_summary(
    shown: usize,
    total: usize,
    done: usize,
    overdue: usize,
    use_color: bool,
) -> String {
    let mut parts = vec![format!("{} of {} shown", shown, total)];

    parts.push(if use_color {
        format!("{} done", done).green().to_string()
    } else {
        format!("{} done", done)
    });

    if overdue > 0 {
        parts.push(if use_color {
            format!("{} overdue", overdue).red().to_string()
        } else {
            format!("{} overdue", overdue)
        });
    }

    format!("[{}]", parts.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::TaskCollection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_task_plain() {
        let mut collection = TaskCollection::new();
        let id = collection.add(tasklist_core::parse(
            "(A) Buy milk @errand +home due:2024-03-10 phone:555",
        ));
        let task = collection.get(id).unwrap();

        let output = format_task(task, date(2024, 3, 1), false);
        assert_eq!(output, "  1 (A) Buy milk @errand +home due:2024-03-10");
    }

    #[test]
    fn test_format_task_done() {
        let task = tasklist_core::parse("x 2024-01-01 Finished");

        let output = format_task(&task, date(2024, 3, 1), false);
        assert!(output.contains(" x "));
        assert!(output.ends_with("Finished"));
    }

    #[test]
    fn test_format_summary() {
        let summary = format_summary(3, 10, 5, 2, false);
        assert_eq!(summary, "[3 of 10 shown | 5 done | 2 overdue]");

        let summary = format_summary(1, 1, 0, 0, false);
        assert_eq!(summary, "[1 of 1 shown | 0 done]");
    }
}
