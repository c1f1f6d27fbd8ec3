//! Tasklist Core - todo.txt codec and task model
//!
//! This crate contains no I/O operations. Lines of a todo.txt file come in
//! and go out as strings; reading and writing files is left to adapters in
//! consuming crates.

pub mod codec;
pub mod collection;
pub mod error;
pub mod filter;
pub mod ordering;
pub mod task;

pub use codec::{parse, render};
pub use collection::{ArchiveBatch, TagList, TaskCollection, TaskIds};
pub use error::{CoreError, LoadError, Result};
pub use filter::{FilterExt, TagFilter, TaskFilter, TaskSort};
pub use task::{Priority, Task, TaskId};
