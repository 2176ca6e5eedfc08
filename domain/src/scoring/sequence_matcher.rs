//! Character-level similarity ratio based on longest matching blocks.
//!
//! Follows the Ratcliff/Obershelp "gestalt" matcher: find the longest common
//! block, recurse on both sides of it, and report `2 * M / (len_a + len_b)`
//! where `M` is the total size of the matched blocks. For long second
//! sequences, characters occurring in more than 1% of positions are treated
//! as popular and cannot seed a match (they can still extend one).

use std::collections::HashMap;

/// Minimum length of `b` at which popular characters are pruned
const AUTOJUNK_MIN_LEN: usize = 200;

struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let threshold = n / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= threshold);
        }

        Self { a, b, b2j }
    }

    /// Longest block `(i, j, size)` with `a[i..i+size] == b[j..j+size]`
    /// inside the given window. Ties go to the earliest `i`, then earliest `j`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular characters never seed a block but may extend one.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// Total number of characters covered by matching blocks
    fn matched_chars(&self) -> usize {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut total = 0;

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }

    fn ratio(&self) -> f64 {
        let length = self.a.len() + self.b.len();
        if length == 0 {
            return 1.0;
        }
        2.0 * self.matched_chars() as f64 / length as f64
    }
}

/// Similarity of two strings in `[0, 1]`; `1.0` for two empty strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(similarity_ratio("payments", "payments"), 1.0);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_disjoint_strings() {
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_known_ratio() {
        // "abcd" vs "bcde": one block "bcd" -> 2*3/8
        assert_eq!(similarity_ratio("abcd", "bcde"), 0.75);
    }

    #[test]
    fn test_blocks_on_both_sides() {
        // longest block "xyzc", then "a" to its left
        assert_eq!(similarity_ratio("axyzc", "aqxyzc"), 2.0 * 5.0 / 11.0);
    }

    #[test]
    fn test_not_transposition_aware() {
        // only one of "ab"/"ba" can match in order
        assert_eq!(similarity_ratio("ab", "ba"), 0.5);
    }

    #[test]
    fn test_popular_characters_in_long_sequences() {
        let a = "a".repeat(200);
        let b = format!("{}b", "a".repeat(199));
        // "a" is popular in b and seeds nothing, but the empty match at the
        // window start still extends over equal characters
        assert_eq!(similarity_ratio(&a, &b), 2.0 * 199.0 / 400.0);
    }

    #[test]
    fn test_popular_characters_extend_a_seeded_block() {
        let a = format!("x{}", "a".repeat(199));
        let b = format!("x{}", "a".repeat(199));
        assert_eq!(similarity_ratio(&a, &b), 1.0);
    }
}
