//! Index and range selection parsing.
//!
//! The operator selects images from the numbered list with a whitespace
//! separated token string: single 1-based indices (`3`), ranges in either
//! direction (`1-5`, `5-1`), or a mix (`1-3 7 9-6`). Malformed tokens are
//! collected as errors without aborting the rest of the batch.
//!
//! # Example
//!
//! ```
//! use isodeck::selection::parse_selection;
//!
//! let selection = parse_selection("2-4 3 9", 6);
//! assert_eq!(selection.indices.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
//! assert_eq!(selection.errors, vec!["invalid index '9'".to_string()]);
//! ```

use std::collections::BTreeSet;

/// Result of parsing an operator selection string.
///
/// `indices` is deduplicated and ordered; every value lies in `[1, len]`.
/// `errors` holds one human-readable message per rejected token, in input
/// order and without duplicates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Resolved 1-based indices, each at most once.
    pub indices: BTreeSet<usize>,

    /// Messages for tokens that could not be resolved.
    pub errors: Vec<String>,
}

impl Selection {
    /// Returns true if no indices were resolved.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Parses a selection string against a list of `len` candidates.
///
/// Rules:
/// - a bare `/` token stops scanning; the remainder is reserved for the
///   filter-mode escape and is not an error
/// - a token of all zeros is rejected (`invalid index '0'`)
/// - a token with exactly one interior hyphen and digits on both sides is a
///   range; direction is inferred, endpoints must lie in `[1, len]`
/// - a textually duplicate range is expanded only once
/// - a plain numeric token above `len` is rejected (`invalid index 'N'`)
/// - anything else is rejected (`invalid input 'tok'`)
pub fn parse_selection(input: &str, len: usize) -> Selection {
    let mut selection = Selection::default();
    let mut seen_errors = BTreeSet::new();
    let mut seen_ranges = BTreeSet::new();

    for token in input.split_whitespace() {
        if token == "/" {
            break;
        }

        if is_all_zeros(token) {
            push_unique(&mut selection, &mut seen_errors, "invalid index '0'".to_string());
            continue;
        }

        if let Some(dash) = token.find('-') {
            if !is_well_formed_range(token, dash) {
                push_unique(
                    &mut selection,
                    &mut seen_errors,
                    format!("invalid input '{}'", token),
                );
                continue;
            }

            let (start, end) = match parse_bounds(token, dash) {
                Some(bounds) => bounds,
                None => {
                    push_unique(
                        &mut selection,
                        &mut seen_errors,
                        format!("invalid range '{}'", token),
                    );
                    continue;
                }
            };

            if start < 1 || start > len || end < 1 || end > len {
                push_unique(
                    &mut selection,
                    &mut seen_errors,
                    format!("invalid range '{}-{}'", start, end),
                );
                continue;
            }

            // A textually repeated range is expanded only once.
            if seen_ranges.insert((start, end)) {
                expand_range(start, end, &mut selection.indices);
            }
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            match token.parse::<usize>() {
                Ok(num) if num >= 1 && num <= len => {
                    selection.indices.insert(num);
                }
                Ok(num) => {
                    push_unique(
                        &mut selection,
                        &mut seen_errors,
                        format!("invalid index '{}'", num),
                    );
                }
                Err(_) => {
                    push_unique(
                        &mut selection,
                        &mut seen_errors,
                        format!("invalid index '{}'", token),
                    );
                }
            }
        } else {
            push_unique(
                &mut selection,
                &mut seen_errors,
                format!("invalid input '{}'", token),
            );
        }
    }

    selection
}

fn push_unique(selection: &mut Selection, seen: &mut BTreeSet<String>, msg: String) {
    if seen.insert(msg.clone()) {
        selection.errors.push(msg);
    }
}

/// Counts the distinct indices a selection would produce, stopping at `cap`.
///
/// This is the pre-scan accounting pass used to size the worker pool before
/// the main parse runs. The cap bounds only this count (and therefore the
/// pool size); the main parse expands ranges without a ceiling, so more
/// tasks than `cap` may be submitted and simply queue behind the bounded
/// workers.
pub fn sizing_token_count(input: &str, len: usize, cap: usize) -> usize {
    let mut counted = BTreeSet::new();

    for token in input.split_whitespace() {
        if counted.len() >= cap {
            break;
        }
        if token == "/" {
            break;
        }
        if token.starts_with('-') || is_all_zeros(token) {
            continue;
        }

        if let Some(dash) = token.find('-') {
            if !is_well_formed_range(token, dash) {
                continue;
            }
            let (start, end) = match parse_bounds(token, dash) {
                Some(bounds) => bounds,
                None => continue,
            };
            if start < 1 || start > len || end < 1 || end > len {
                continue;
            }
            let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
            for i in lo..=hi {
                counted.insert(i);
                if counted.len() >= cap {
                    break;
                }
            }
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(num) = token.parse::<usize>() {
                if num >= 1 && num <= len {
                    counted.insert(num);
                }
            }
        }
    }

    counted.len()
}

fn is_all_zeros(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c == '0')
}

/// A range token has exactly one hyphen, not at either end, with digits on
/// both sides of it.
fn is_well_formed_range(token: &str, dash: usize) -> bool {
    if token[dash + 1..].contains('-') {
        return false;
    }
    if dash == 0 || dash == token.len() - 1 {
        return false;
    }
    let before = &token[..dash];
    let after = &token[dash + 1..];
    before.chars().all(|c| c.is_ascii_digit()) && after.chars().all(|c| c.is_ascii_digit())
}

fn parse_bounds(token: &str, dash: usize) -> Option<(usize, usize)> {
    let start = token[..dash].parse::<usize>().ok()?;
    let end = token[dash + 1..].parse::<usize>().ok()?;
    Some((start, end))
}

fn expand_range(start: usize, end: usize, indices: &mut BTreeSet<usize>) {
    if start <= end {
        for i in start..=end {
            indices.insert(i);
        }
    } else {
        for i in (end..=start).rev() {
            indices.insert(i);
        }
    }
}
