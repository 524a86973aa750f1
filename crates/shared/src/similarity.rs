//! Approximate string matching.
//!
//! Implements the Ratcliff/Obershelp "gestalt" ratio: the number of characters
//! found in recursively located longest common blocks, doubled and divided by
//! the combined length of both strings.

/// Trims surrounding whitespace and case-folds a value for comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Returns the similarity ratio of two strings in `[0.0, 1.0]`.
///
/// Comparison is over Unicode scalar values and is case sensitive; callers
/// wanting case-insensitive matching should [`normalize`] first. Two empty
/// strings are identical and score `1.0`.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Returns true when both values are non-blank and their normalized ratio
/// reaches `threshold`.
pub fn is_similar(value: &str, other: &str, threshold: f64) -> bool {
    let value = normalize(value);
    let other = normalize(other);
    if value.is_empty() || other.is_empty() {
        return false;
    }
    similarity_ratio(&value, &other) >= threshold
}

/// Counts characters covered by the recursive longest-common-block split.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut matched = 0;

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;

        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Finds the longest common block within `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties resolve to the block starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo + 1;
    let mut best = (alo, blo, 0);
    // suffix[j - blo + 1] = length of the common run ending at a[i], b[j]
    let mut previous = vec![0usize; width];

    for i in alo..ahi {
        let mut current = vec![0usize; width];
        for j in blo..bhi {
            if a[i] == b[j] {
                let size = previous[j - blo] + 1;
                current[j - blo + 1] = size;
                if size > best.2 {
                    best = (i + 1 - size, j + 1 - size, size);
                }
            }
        }
        previous = current;
    }

    best
}
