//! tick - an abbreviation-friendly command-line task manager
//!
//! Tasks live in a JSON Lines file. Every command and flag can be shortened
//! to any unambiguous prefix of one of its spellings, filters compose in a
//! fixed order, and due dates accept absolute dates, natural-language
//! keywords and relative shifts.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Priority, SortOrder, Task, TaskIds};
