//! Sequence-similarity ratio (Ratcliff–Obershelp, as popularized by
//! difflib's `SequenceMatcher.ratio`): twice the number of matching
//! characters over the total length, with matches found by recursing
//! around the longest common substring.

pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Longest common substring, O(len(a)·len(b)).
    let mut best_len = 0;
    let mut best_a = 0;
    let mut best_b = 0;
    let mut prev = vec![0usize; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        let mut curr = vec![0usize; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                curr[j + 1] = prev[j] + 1;
                if curr[j + 1] > best_len {
                    best_len = curr[j + 1];
                    best_a = i + 1 - best_len;
                    best_b = j + 1 - best_len;
                }
            }
        }
        prev = curr;
    }

    if best_len == 0 {
        return 0;
    }

    best_len
        + matching_chars(&a[..best_a], &b[..best_b])
        + matching_chars(&a[best_a + best_len..], &b[best_b + best_len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(similarity_ratio("lupus", "lupus"), 1.0);
        assert_eq!(similarity_ratio("Lupus", "LUPUS"), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn close_spellings_score_high() {
        let score = similarity_ratio(
            "systemic lupus erythematosus",
            "systemic lupus erythematosis",
        );
        assert!(score > 0.9, "got {score}");
    }

    #[test]
    fn unrelated_conditions_score_low() {
        let score = similarity_ratio("psoriasis", "heart failure");
        assert!(score < 0.5, "got {score}");
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("lupus", ""), 0.0);
    }

    #[test]
    fn symmetric() {
        let ab = similarity_ratio("rheumatoid arthritis", "arthritis");
        let ba = similarity_ratio("arthritis", "rheumatoid arthritis");
        assert!((ab - ba).abs() < 1e-12);
    }
}
