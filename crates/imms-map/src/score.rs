//! Fuzzy string scoring.
//!
//! Both scorers return a similarity on a 0.0 to 100.0 scale. The base metric
//! is the normalized Indel similarity, i.e. `2 * LCS / (len_a + len_b)`.

use rapidfuzz::distance::indel;

/// Whole-string similarity.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    indel::normalized_similarity(a.chars(), b.chars()) * 100.0
}

/// Best similarity of the shorter string against any same-length window of
/// the longer one.
///
/// Windows that overhang either end of the longer string are also scored, so
/// a short needle aligned with a prefix or suffix is not penalized for the
/// missing characters beyond the edge.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let m = short.len();
    let n = long.len();
    let mut best = 0.0_f64;

    let windows = (1..m)
        .map(|end| &long[..end])
        .chain((0..=n - m).map(|start| &long[start..start + m]))
        .chain((n - m + 1..n).map(|start| &long[start..]));

    for window in windows {
        let score = slice_ratio(&short, window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

fn slice_ratio(a: &[char], b: &[char]) -> f64 {
    indel::normalized_similarity(a.iter().copied(), b.iter().copied()) * 100.0
}

/// Index and score of the best-scoring candidate.
///
/// Ties keep the earliest candidate. Returns `None` for an empty candidate
/// list.
pub fn best_match<'a, I>(query: &str, candidates: I, scorer: fn(&str, &str) -> f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let score = scorer(query, candidate);
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((idx, score)),
        }
    }
    best
}
