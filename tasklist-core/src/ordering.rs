//! Display orderings for tasks
//!
//! These comparisons are used for sorting views only; they never change the
//! storage order of a collection.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::task::{Priority, Task};

/// Sort rank of a priority: letters by ASCII code, then no priority, then done
pub fn priority_rank(priority: Priority) -> u32 {
    match priority {
        Priority::Letter(c) => c as u32,
        Priority::None => 'Z' as u32 + 1,
        Priority::Completed => 'Z' as u32 + 2,
    }
}

/// Compare priorities: `A < B < ... < Z < none < x`
pub fn compare_priority(a: Priority, b: Priority) -> Ordering {
    priority_rank(a).cmp(&priority_rank(b))
}

/// Compare due dates soonest first, tasks without a due date last
pub fn compare_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    a.unwrap_or(NaiveDate::MAX).cmp(&b.unwrap_or(NaiveDate::MAX))
}

/// Compare two tasks by priority
pub fn by_priority(a: &Task, b: &Task) -> Ordering {
    compare_priority(a.priority(), b.priority())
}

/// Compare two tasks by due date
pub fn by_due(a: &Task, b: &Task) -> Ordering {
    compare_due(a.due_date, b.due_date)
}
