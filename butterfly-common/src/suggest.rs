//! Fuzzy "did you mean" suggestions for misspelled identifiers
//!
//! Used to turn a failed lookup of a configuration name (an encoded value, a
//! profile key) into an actionable hint.

use strsim::{jaro_winkler, normalized_levenshtein};

/// Minimum similarity (0.0 to 1.0) a candidate needs to be suggested.
///
/// Tuned so that "max_sped" → "max_speed" and "surfce" → "surface" are caught while
/// unrelated names ("totally_unknown") produce no suggestion at all.
const MIN_SCORE: f64 = 0.75;

/// Score how close `candidate` is to `input`.
///
/// Character similarity is Jaro-Winkler 70% + Normalized Levenshtein 30%. On top of
/// that, snake_case identifiers get a bonus when one of their components matches the
/// input closely ("slope" → "max_slope"), and short candidates are penalised against
/// long inputs so that "toll" does not win for "track_type_grade".
fn score(input: &str, candidate: &str) -> f64 {
    let jw = jaro_winkler(input, candidate);
    let lev = normalized_levenshtein(input, candidate);
    let mut total = jw * 0.7 + lev * 0.3;

    if candidate.contains('_') && !input.contains('_') {
        let best_part = candidate
            .split('_')
            .filter(|part| part.len() >= 4)
            .map(|part| jaro_winkler(input, part))
            .fold(0.0f64, f64::max);
        if best_part > 0.9 {
            total += 0.1 * best_part;
        }
    }

    if input.len() >= 8 && candidate.len() <= 4 {
        total -= 0.1;
    }

    total
}

/// Find the best fuzzy match for `input` among `candidates`.
///
/// Comparison is case-insensitive. An exact (case-insensitive) match yields `None`
/// because there is nothing to correct.
pub fn suggest<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut best: Option<(&str, f64)> = None;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();
        if candidate_lower == input_lower {
            return None;
        }

        let s = score(&input_lower, &candidate_lower);
        if s >= MIN_SCORE && best.map_or(true, |(_, b)| s > b) {
            best = Some((candidate, s));
        }
    }

    best.map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "max_speed",
        "max_slope",
        "average_slope",
        "surface",
        "smoothness",
        "toll",
        "track_type",
        "car_access",
        "bike_access",
        "road_class",
        "road_class_link",
    ];

    #[test]
    fn test_suggest_typos() {
        assert_eq!(suggest("surfce", NAMES.iter().copied()), Some("surface".to_string()));
        assert_eq!(suggest("max_sped", NAMES.iter().copied()), Some("max_speed".to_string()));
        assert_eq!(suggest("smothness", NAMES.iter().copied()), Some("smoothness".to_string()));
        assert_eq!(suggest("car_acess", NAMES.iter().copied()), Some("car_access".to_string()));
    }

    #[test]
    fn test_suggest_case_insensitive_exact_is_none() {
        assert_eq!(suggest("SURFACE", NAMES.iter().copied()), None);
        assert_eq!(suggest("road_class", NAMES.iter().copied()), None);
    }

    #[test]
    fn test_suggest_no_match() {
        assert_eq!(suggest("totally_unrelated_thing", NAMES.iter().copied()), None);
        assert_eq!(suggest("x", NAMES.iter().copied()), None);
        assert_eq!(suggest("surface", std::iter::empty()), None);
    }
}
