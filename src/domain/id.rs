//! Task ID selections
//!
//! Format accepted on the command line:
//! - Single ID: `5`
//! - List: `5,6,7`
//! - Inclusive range: `5-7`
//! - Any mix of the above: `1,3-5,9`

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid task ID or ID range: '{0}'")]
    InvalidIdOrIdRange(String),

    #[error("Invalid ID range '{0}': start is greater than end")]
    InvalidIdRangeOrder(String),
}

/// A set of task IDs parsed from user input
///
/// Kept as sorted, disjoint, non-adjacent inclusive ranges, so `0-4294967295`
/// costs one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskIds(Vec<RangeInclusive<u32>>);

impl TaskIds {
    fn from_ranges(mut ranges: Vec<RangeInclusive<u32>>) -> Self {
        ranges.sort_by_key(|range| *range.start());

        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start().saturating_sub(1) <= *last.end() => {
                    if range.end() > last.end() {
                        *last = *last.start()..=*range.end();
                    }
                }
                _ => merged.push(range),
            }
        }

        Self(merged)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.0
            .binary_search_by(|range| {
                if *range.end() < id {
                    std::cmp::Ordering::Less
                } else if *range.start() > id {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Number of IDs in the set
    pub fn len(&self) -> u64 {
        self.0
            .iter()
            .map(|range| u64::from(*range.end()) - u64::from(*range.start()) + 1)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over IDs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().flat_map(|range| range.clone())
    }
}

impl FromIterator<u32> for TaskIds {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self::from_ranges(iter.into_iter().map(|id| id..=id).collect())
    }
}

fn parse_id(part: &str, whole: &str) -> Result<u32, IdError> {
    part.trim()
        .parse()
        .map_err(|_| IdError::InvalidIdOrIdRange(whole.to_string()))
}

impl FromStr for TaskIds {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ranges = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(IdError::InvalidIdOrIdRange(s.to_string()));
            }

            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_id(start, s)?;
                    let end = parse_id(end, s)?;
                    if start > end {
                        return Err(IdError::InvalidIdRangeOrder(part.to_string()));
                    }
                    ranges.push(start..=end);
                }
                None => {
                    let id = parse_id(part, s)?;
                    ranges.push(id..=id);
                }
            }
        }

        Ok(Self::from_ranges(ranges))
    }
}

impl fmt::Display for TaskIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|range| {
                if range.start() == range.end() {
                    range.start().to_string()
                } else {
                    format!("{}-{}", range.start(), range.end())
                }
            })
            .collect();
        f.write_str(&parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(s: &str) -> Vec<u32> {
        s.parse::<TaskIds>().unwrap().iter().collect()
    }

    #[test]
    fn single_id() {
        assert_eq!(ids("5"), vec![5]);
        assert_eq!(ids(" 12 "), vec![12]);
    }

    #[test]
    fn comma_list() {
        assert_eq!(ids("5,6,7"), vec![5, 6, 7]);
        assert_eq!(ids("7,5,5"), vec![5, 7]);
    }

    #[test]
    fn inclusive_range() {
        assert_eq!(ids("5-7"), vec![5, 6, 7]);
        assert_eq!(ids("4-4"), vec![4]);
    }

    #[test]
    fn mixed_list_and_ranges() {
        assert_eq!(ids("1,3-5,9"), vec![1, 3, 4, 5, 9]);
    }

    #[test]
    fn reversed_range_fails() {
        assert_eq!(
            "7-5".parse::<TaskIds>(),
            Err(IdError::InvalidIdRangeOrder("7-5".to_string()))
        );
    }

    #[test]
    fn garbage_fails() {
        for input in ["", "abc", "1,,2", "1-", "-3", "1-2-3", "5,x"] {
            assert!(
                matches!(input.parse::<TaskIds>(), Err(IdError::InvalidIdOrIdRange(_))),
                "expected failure for {input:?}"
            );
        }
    }

    #[test]
    fn display_joins_ranges() {
        assert_eq!("3-5".parse::<TaskIds>().unwrap().to_string(), "3-5");
        assert_eq!("9,3,4,5,1".parse::<TaskIds>().unwrap().to_string(), "1,3-5,9");
    }

    #[test]
    fn overlapping_ranges_merge() {
        let parsed: TaskIds = "1-4,3-8,10,9".parse().unwrap();
        assert_eq!(parsed, "1-10".parse().unwrap());
        assert_eq!(parsed.len(), 10);
    }

    #[test]
    fn full_id_range_stays_compact() {
        let parsed: TaskIds = "0-4294967295".parse().unwrap();
        assert_eq!(parsed.len(), u64::from(u32::MAX) + 1);
        assert!(parsed.contains(0));
        assert!(parsed.contains(123_456_789));
        assert!(parsed.contains(u32::MAX));
        assert_eq!(parsed.to_string(), "0-4294967295");
    }

    #[test]
    fn membership_between_ranges() {
        let parsed: TaskIds = "2-4,8-9".parse().unwrap();
        for id in [0, 1, 5, 7, 10] {
            assert!(!parsed.contains(id), "{id} should not be selected");
        }
        for id in [2, 3, 4, 8, 9] {
            assert!(parsed.contains(id), "{id} should be selected");
        }
    }

    #[test]
    fn collects_from_ids() {
        let ids: TaskIds = [5, 3, 4, 9].into_iter().collect();
        assert_eq!(ids.to_string(), "3-5,9");
    }

    proptest! {
        #[test]
        fn range_contains_every_id(start in 0u32..500, len in 0u32..50) {
            let end = start + len;
            let parsed: TaskIds = format!("{start}-{end}").parse().unwrap();
            prop_assert_eq!(parsed.len(), u64::from(len) + 1);
            prop_assert!(parsed.contains(start));
            prop_assert!(parsed.contains(end));
        }
    }
}
