//! Score-ranked set
//!
//! Members are kept twice: a hash map for O(1) score lookup and a B-tree
//! ordered by `(score, member)` for range reads. Ranges are read from the
//! top, so equal scores come back in descending member order, the same order
//! Redis uses for `ZREVRANGE`.

use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// f64 with a total order
#[derive(Debug, Clone, Copy)]
struct OrderedScore(f64);

impl PartialEq for OrderedScore {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for OrderedScore {}

impl PartialOrd for OrderedScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Set of members, each with a score
#[derive(Debug, Clone, Default)]
pub struct RankedSet {
    scores: FxHashMap<String, f64>,
    order: BTreeSet<(OrderedScore, String)>,
}

impl RankedSet {
    /// Create an empty ranked set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or rescore a member; returns true if it was new
    pub fn upsert(&mut self, member: &str, score: f64) -> bool {
        match self.scores.insert(member.to_string(), score) {
            Some(old) => {
                self.order.remove(&(OrderedScore(old), member.to_string()));
                self.order.insert((OrderedScore(score), member.to_string()));
                false
            }
            None => {
                self.order.insert((OrderedScore(score), member.to_string()));
                true
            }
        }
    }

    /// Remove a member; returns true if it was present
    pub fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(old) => {
                self.order.remove(&(OrderedScore(old), member.to_string()));
                true
            }
            None => false,
        }
    }

    /// Add `delta` to a member's score, creating it at `delta`
    pub fn increment(&mut self, member: &str, delta: f64) -> f64 {
        let next = self.scores.get(member).copied().unwrap_or(0.0) + delta;
        self.upsert(member, next);
        next
    }

    /// Score of a member
    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the set has no members
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Members highest score first, skipping `offset`, at most `limit`
    pub fn range_desc(&self, offset: usize, limit: usize) -> impl Iterator<Item = (&str, f64)> {
        self.order
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .map(|(score, member)| (member.as_str(), score.0))
    }

    /// Iterate members and scores in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(m, s)| (m.as_str(), *s))
    }

    /// Members present in every set, scores summed
    pub fn intersection(sets: &[RankedSet]) -> RankedSet {
        let mut out = RankedSet::new();
        let Some(smallest) = sets.iter().min_by_key(|s| s.len()) else {
            return out;
        };
        'members: for (member, _) in smallest.iter() {
            let mut total = 0.0;
            for set in sets {
                match set.score(member) {
                    Some(score) => total += score,
                    None => continue 'members,
                }
            }
            out.upsert(member, total);
        }
        out
    }

    /// Members present in any set, scores summed
    pub fn union(sets: &[RankedSet]) -> RankedSet {
        let mut out = RankedSet::new();
        for set in sets {
            for (member, score) in set.iter() {
                out.increment(member, score);
            }
        }
        out
    }
}
