//! "Did you mean" suggestions for unknown names.

/// Edit distance between two strings.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Largest distance still worth suggesting for `name`.
fn max_distance(name: &str) -> usize {
    (name.chars().count() / 3).max(2)
}

/// The closest candidate to `name`, if any is close enough.
///
/// Ties go to the candidate listed first.
pub fn suggest<'a, I>(name: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let limit = max_distance(name);
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        if candidate == name {
            continue;
        }
        let distance = levenshtein(name, candidate);
        if distance > limit {
            continue;
        }
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(candidate, _)| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("direct", "direct"), 0);
        assert_eq!(levenshtein("dirct", "direct"), 1);
    }

    #[test]
    fn suggests_nearest() {
        let candidates = ["kafka", "direct", "timer"];
        assert_eq!(suggest("dirct", candidates), Some("direct".to_string()));
        assert_eq!(suggest("kafak", candidates), Some("kafka".to_string()));
    }

    #[test]
    fn no_suggestion_when_too_far() {
        assert_eq!(suggest("zzz", ["kafka", "direct"]), None);
    }

    #[test]
    fn long_names_tolerate_more_edits() {
        // 14 chars allows distance 4
        assert_eq!(
            suggest("platfrm-htttpp", ["platform-http"]),
            Some("platform-http".to_string())
        );
    }

    #[test]
    fn exact_name_is_not_suggested() {
        assert_eq!(suggest("kafka", ["kafka"]), None);
    }
}
