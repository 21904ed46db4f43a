//! Domain models for tick
//!
//! Contains the interpretation logic without any I/O concerns: the task
//! model, name resolution, ID selections, sort orders and due dates.

mod due;
mod id;
mod prototype;
mod sort;
mod task;

pub use due::{parse_absolute, resolve_due_date, DueDateError, RelativeShift};
pub use id::{IdError, TaskIds};
pub use prototype::{edit_distance, resolve, MatchError, Prototype, Prototyped, Resolved};
pub use sort::{Direction, SortError, SortOrder, SortProperty, SortStep};
pub use task::{next_id, remove_and_shift, renumber, Priority, Task, TaskError};
