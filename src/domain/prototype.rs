//! Name resolution with aliases and prefix abbreviation
//!
//! A [`Prototype`] is a pipe-delimited list of accepted spellings, e.g.
//! `finish|complete|accomplish`. The first spelling is the canonical name.
//!
//! Resolution is two-phase:
//! 1. Strict: the token equals one of an entry's spellings (case-insensitive).
//! 2. Prefix: only when nothing matched strictly, the token is a prefix of
//!    one of an entry's spellings.
//!
//! Exactly one entry must survive, otherwise resolution fails with
//! [`MatchError::Unknown`] or [`MatchError::Ambiguous`].

use std::fmt;
use thiserror::Error;

/// Maximum edit distance for "did you mean" suggestions
const SUGGESTION_DISTANCE: usize = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("unknown name '{token}'")]
    Unknown {
        token: String,
        suggestions: Vec<String>,
    },

    #[error("ambiguous name '{token}', could be: {}", candidates.join(", "))]
    Ambiguous {
        token: String,
        candidates: Vec<String>,
    },
}

/// Set of accepted spellings for a command, flag or other named entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prototype(&'static str);

impl Prototype {
    pub const fn new(spellings: &'static str) -> Self {
        Self(spellings)
    }

    /// All accepted spellings, canonical first
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> {
        self.0.split('|').map(str::trim).filter(|s| !s.is_empty())
    }

    /// The canonical (first) spelling
    pub fn canonical(&self) -> &'static str {
        self.aliases().next().unwrap_or(self.0)
    }

    /// Returns the spelling equal to `token`, ignoring case
    pub fn exact(&self, token: &str) -> Option<&'static str> {
        self.aliases().find(|alias| alias.eq_ignore_ascii_case(token))
    }

    /// Returns every spelling starting with `token`, ignoring case
    pub fn prefixed(&self, token: &str) -> Vec<&'static str> {
        let token = token.to_ascii_lowercase();
        self.aliases()
            .filter(|alias| alias.to_ascii_lowercase().starts_with(&token))
            .collect()
    }
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Anything that can be looked up by name
pub trait Prototyped {
    fn prototype(&self) -> Prototype;
}

/// A successful resolution
#[derive(Debug)]
pub struct Resolved<'a, T> {
    /// The matched entry
    pub entry: &'a T,
    /// The full spelling the token stood for
    pub spelling: &'static str,
    /// True when the token was a prefix rather than a full spelling
    pub abbreviated: bool,
}

impl<T> Clone for Resolved<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Resolved<'_, T> {}

/// Resolves `token` against `entries`
pub fn resolve<'a, T: Prototyped>(
    token: &str,
    entries: &'a [T],
) -> Result<Resolved<'a, T>, MatchError> {
    let token = token.trim();

    let strict: Vec<(&'a T, &'static str)> = entries
        .iter()
        .filter_map(|entry| entry.prototype().exact(token).map(|s| (entry, s)))
        .collect();

    match strict.as_slice() {
        [(entry, spelling)] => {
            return Ok(Resolved {
                entry: *entry,
                spelling: *spelling,
                abbreviated: false,
            })
        }
        [] => {}
        _ => {
            return Err(MatchError::Ambiguous {
                token: token.to_string(),
                candidates: strict.iter().map(|(_, s)| s.to_string()).collect(),
            })
        }
    }

    if token.is_empty() {
        return Err(unknown(token, entries));
    }

    let prefixed: Vec<(&'a T, Vec<&'static str>)> = entries
        .iter()
        .map(|entry| (entry, entry.prototype().prefixed(token)))
        .filter(|(_, spellings)| !spellings.is_empty())
        .collect();

    match prefixed.as_slice() {
        [] => Err(unknown(token, entries)),
        [(entry, spellings)] => Ok(Resolved {
            entry: *entry,
            spelling: spellings[0],
            abbreviated: true,
        }),
        _ => Err(MatchError::Ambiguous {
            token: token.to_string(),
            candidates: prefixed
                .iter()
                .flat_map(|(_, spellings)| spellings.iter().map(|s| s.to_string()))
                .collect(),
        }),
    }
}

fn unknown<T: Prototyped>(token: &str, entries: &[T]) -> MatchError {
    let lowered = token.to_ascii_lowercase();
    let mut suggestions: Vec<(usize, String)> = entries
        .iter()
        .flat_map(|entry| entry.prototype().aliases())
        .map(|alias| (edit_distance(&lowered, &alias.to_ascii_lowercase()), alias))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .map(|(distance, alias)| (distance, alias.to_string()))
        .collect();
    suggestions.sort();
    suggestions.dedup_by(|a, b| a.1 == b.1);

    MatchError::Unknown {
        token: token.to_string(),
        suggestions: suggestions.into_iter().map(|(_, s)| s).collect(),
    }
}

/// Levenshtein distance between two strings
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
