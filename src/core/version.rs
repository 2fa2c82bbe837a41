//! Version token ordering.
//!
//! Store versions are opaque directory-name tokens. The only ordering the
//! tool ever needs is "which sibling is newest": when every token in the
//! sibling set parses as an integer they compare numerically, otherwise the
//! whole set compares lexicographically. Equality is always exact token
//! equality, never semantic.

use std::cmp::Ordering;

/// Compare two version tokens under the given interpretation.
fn compare(a: &str, b: &str, numeric: bool) -> Ordering {
    if numeric {
        // Both parse by construction; see `select_latest`.
        let a: u64 = a.parse().unwrap_or(0);
        let b: u64 = b.parse().unwrap_or(0);
        a.cmp(&b)
    } else {
        a.cmp(b)
    }
}

/// Select the newest token out of a sibling set.
///
/// Returns `None` for an empty set.
pub fn select_latest<'a, I>(tokens: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens: Vec<&str> = tokens.into_iter().collect();
    let numeric = !tokens.is_empty() && tokens.iter().all(|t| t.parse::<u64>().is_ok());

    tokens.into_iter().max_by(|a, b| compare(a, b, numeric))
}
