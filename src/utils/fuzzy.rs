// Fuzzy matching for "did you mean" suggestions on stage ids and board names

/// Levenshtein distance between two strings (in chars)
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the edit matrix
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Candidates within `max_distance` of `search` (case-insensitive),
/// plus candidates that start with it, closest first, at most 3
pub fn find_near_matches(search: &str, candidates: &[&str], max_distance: usize) -> Vec<String> {
    let search_lower = search.to_lowercase();
    let mut matches: Vec<(usize, &str)> = candidates
        .iter()
        .filter_map(|candidate| {
            let lower = candidate.to_lowercase();
            let distance = levenshtein_distance(&search_lower, &lower);
            if distance <= max_distance {
                Some((distance, *candidate))
            } else if !search_lower.is_empty() && lower.starts_with(&search_lower) {
                Some((lower.len() - search_lower.len(), *candidate))
            } else {
                None
            }
        })
        .collect();

    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    matches.into_iter().take(3).map(|(_, c)| c.to_string()).collect()
}
