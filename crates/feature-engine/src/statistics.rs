//! Lexical Statistics of the Domain Label

/// Raw (non tri-state) statistics over a domain label
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainStatistics {
    /// Length in characters
    pub length: usize,
    /// Shannon entropy (bits per character)
    pub entropy: f64,
    /// Characters outside `[A-Za-z0-9.-]`
    pub special_chars: usize,
}

impl DomainStatistics {
    /// Compute statistics for a label
    pub fn compute(label: &str) -> Self {
        if label.is_empty() {
            return Self::default();
        }

        Self {
            length: label.chars().count(),
            entropy: shannon_entropy(label),
            special_chars: label
                .chars()
                .filter(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
                .count(),
        }
    }
}

/// Shannon entropy in bits over the characters of `s`; 0 for empty input
pub fn shannon_entropy(s: &str) -> f64 {
    let mut counts: Vec<(char, usize)> = Vec::new();
    let mut total = 0usize;

    for c in s.chars() {
        total += 1;
        match counts.iter_mut().find(|(k, _)| *k == c) {
            Some((_, n)) => *n += 1,
            None => counts.push((c, 1)),
        }
    }

    if total == 0 {
        return 0.0;
    }

    let n = total as f64;
    let entropy: f64 = counts
        .iter()
        .map(|&(_, count)| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum();

    // a single repeated symbol sums to -0.0
    entropy.max(0.0)
}

/// Share of `items` matching `predicate`; `None` when there are no items
pub fn matching_ratio<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> Option<f64> {
    if items.is_empty() {
        return None;
    }
    let matching = items.iter().filter(|item| predicate(item)).count();
    Some(matching as f64 / items.len() as f64)
}
