//! Filter composition
//!
//! Set filter flags run in ascending filter priority, ties in declaration
//! order. Each filter receives the output of the previous one, so position
//! based filters (skip, limit) count within the already-narrowed sequence.

use super::error::UnsetFlag;
use super::flags::{Flags, TaskFilter};
use super::output::Output;
use crate::domain::Task;

/// The set filters, in the order they will run
pub fn active_filters(flags: &Flags) -> Vec<&dyn TaskFilter> {
    let mut active: Vec<&dyn TaskFilter> = flags
        .filters()
        .into_iter()
        .filter(|filter| filter.is_set())
        .collect();
    // Stable: equal priorities keep declaration order
    active.sort_by_key(|filter| filter.priority());
    active
}

/// Narrows `tasks` through every set filter
pub fn compose<'t>(
    flags: &Flags,
    tasks: &'t [Task],
    output: &Output,
) -> Result<Vec<&'t Task>, UnsetFlag> {
    let mut selected: Vec<&Task> = tasks.iter().collect();

    for filter in active_filters(flags) {
        let before = selected.len();
        selected = filter.filter(selected)?;
        output.verbose_ctx(
            "filter",
            &format!(
                "--{} (priority {}): {} -> {} task(s)",
                filter.id().name(),
                filter.priority(),
                before,
                selected.len()
            ),
        );
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::flags::{AnyFlag, FilterFlag, FlagId, ParseContext};
    use chrono::NaiveDate;
    use crate::cli::output::OutputFormat;
    use crate::domain::{Priority, TaskIds};

    fn quiet() -> Output {
        Output::new(OutputFormat::Text, false)
    }

    fn tasks() -> Vec<Task> {
        vec![
            Task::new(0, "Write report").with_priority(Priority::Critical),
            Task::new(1, "Read mail"),
            Task::new(2, "Write tests").with_priority(Priority::Critical),
            Task::new(3, "Call mom"),
            Task::new(4, "Write docs").with_priority(Priority::Critical),
        ]
    }

    fn ids(selected: &[&Task]) -> Vec<u32> {
        selected.iter().map(|t| t.id).collect()
    }

    #[test]
    fn nothing_set_keeps_everything() {
        let tasks = tasks();
        let flags = Flags::new();
        assert_eq!(compose(&flags, &tasks, &quiet()).unwrap().len(), 5);
        assert!(active_filters(&flags).is_empty());
    }

    #[test]
    fn filters_run_in_priority_order() {
        let mut flags = Flags::new();
        flags.limit.set(1);
        flags.priority.set(Priority::Critical);
        flags.id.set("1-4".parse::<TaskIds>().unwrap());

        let order: Vec<FlagId> = active_filters(&flags).iter().map(|f| f.id()).collect();
        assert_eq!(order, vec![FlagId::Id, FlagId::Priority, FlagId::Limit]);
    }

    #[test]
    fn limit_counts_after_earlier_filters() {
        let tasks = tasks();
        let mut flags = Flags::new();
        flags.priority.set(Priority::Critical);
        flags.skip.set(1);
        flags.limit.set(1);

        // Critical: 0, 2, 4 -> skip one -> 2, 4 -> limit one -> 2
        let selected = compose(&flags, &tasks, &quiet()).unwrap();
        assert_eq!(ids(&selected), vec![2]);
    }

    #[test]
    fn description_regex_and_pending() {
        let mut tasks = tasks();
        tasks[2].finish();
        let mut flags = Flags::new();
        flags.pending.set(true);
        let ctx = ParseContext {
            today: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        flags.matching.set_raw(Some("^write"), &ctx).unwrap();

        let selected = compose(&flags, &tasks, &quiet()).unwrap();
        assert_eq!(ids(&selected), vec![0, 4]);
    }

    #[test]
    fn same_priority_keeps_declaration_order() {
        let flag_a = FilterFlag::<bool>::new(FlagId::Pending, 5, |_, _, _| true);
        let flag_b = FilterFlag::<bool>::new(FlagId::Finished, 5, |_, _, _| true);
        let mut list: Vec<&dyn TaskFilter> = vec![&flag_a, &flag_b];
        list.sort_by_key(|f| f.priority());
        assert_eq!(list[0].id(), FlagId::Pending);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let tasks = tasks();
        let mut flags = Flags::new();
        flags.id.set("99".parse::<TaskIds>().unwrap());
        assert!(compose(&flags, &tasks, &quiet()).unwrap().is_empty());
    }
}
