//! Determinization, product construction, emptiness, and witnesses
//!
//! DFA transitions are partial: a byte with no matching edge is a dead end.
//! The transition alphabet for each state is the partition of the byte range
//! induced by the outgoing classes, so `.`-heavy patterns stay compact.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::class::ByteClass;
use super::nfa::Nfa;
use super::parse::PatternError;

/// Determinization cap; a pattern that exceeds it fails closed.
const MAX_STATES: usize = 4096;

/// Deterministic finite automaton over the byte alphabet.
#[derive(Debug, Clone)]
pub struct Dfa {
    edges: Vec<Vec<(ByteClass, usize)>>,
    accept: Vec<bool>,
    start: usize,
}

impl Dfa {
    /// Subset construction.
    pub fn from_nfa(nfa: &Nfa) -> Result<Self, PatternError> {
        let start_set = closure(nfa, std::iter::once(nfa.start));

        let mut index: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut sets: Vec<Vec<usize>> = vec![start_set.clone()];
        let mut edges: Vec<Vec<(ByteClass, usize)>> = vec![Vec::new()];
        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        index.insert(start_set, 0);

        while let Some(id) = queue.pop_front() {
            let members = sets[id].clone();
            let outgoing: Vec<(ByteClass, usize)> = members
                .iter()
                .flat_map(|&m| nfa.edges[m].iter().cloned())
                .collect();

            // BTreeMap keeps edge emission order deterministic.
            let mut buckets: BTreeMap<Vec<usize>, Vec<(u8, u8)>> = BTreeMap::new();
            for (lo, hi) in partition(&outgoing) {
                let targets: BTreeSet<usize> = outgoing
                    .iter()
                    .filter(|(class, _)| class.contains(lo))
                    .map(|(_, target)| *target)
                    .collect();
                if targets.is_empty() {
                    continue;
                }
                let closed = closure(nfa, targets.into_iter());
                buckets.entry(closed).or_default().push((lo, hi));
            }

            for (set, ranges) in buckets {
                let target_id = match index.get(&set) {
                    Some(&existing) => existing,
                    None => {
                        let new_id = sets.len();
                        index.insert(set.clone(), new_id);
                        sets.push(set);
                        edges.push(Vec::new());
                        queue.push_back(new_id);
                        new_id
                    }
                };
                edges[id].push((ByteClass::from_ranges(ranges), target_id));
            }

            if sets.len() > MAX_STATES {
                return Err(PatternError::TooComplex(format!(
                    "determinization exceeded {MAX_STATES} states"
                )));
            }
        }

        let accept = sets
            .iter()
            .map(|set| set.binary_search(&nfa.accept).is_ok())
            .collect();

        Ok(Dfa {
            edges,
            accept,
            start: 0,
        })
    }

    /// Product construction: accepts exactly the strings accepted by both
    /// operands.
    pub fn intersect(&self, other: &Dfa) -> Result<Dfa, PatternError> {
        let mut index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut pairs: Vec<(usize, usize)> = vec![(self.start, other.start)];
        let mut edges: Vec<Vec<(ByteClass, usize)>> = vec![Vec::new()];
        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        index.insert((self.start, other.start), 0);

        while let Some(id) = queue.pop_front() {
            let (x, y) = pairs[id];

            let mut buckets: BTreeMap<(usize, usize), Vec<(u8, u8)>> = BTreeMap::new();
            for (class_a, target_a) in &self.edges[x] {
                for (class_b, target_b) in &other.edges[y] {
                    let both = class_a.intersect(class_b);
                    if !both.is_empty() {
                        buckets
                            .entry((*target_a, *target_b))
                            .or_default()
                            .extend_from_slice(both.ranges());
                    }
                }
            }

            for (pair, ranges) in buckets {
                let target_id = match index.get(&pair) {
                    Some(&existing) => existing,
                    None => {
                        let new_id = pairs.len();
                        index.insert(pair, new_id);
                        pairs.push(pair);
                        edges.push(Vec::new());
                        queue.push_back(new_id);
                        new_id
                    }
                };
                edges[id].push((ByteClass::from_ranges(ranges), target_id));
            }

            if pairs.len() > MAX_STATES {
                return Err(PatternError::TooComplex(format!(
                    "product construction exceeded {MAX_STATES} states"
                )));
            }
        }

        let accept = pairs
            .iter()
            .map(|&(x, y)| self.accept[x] && other.accept[y])
            .collect();

        Ok(Dfa {
            edges,
            accept,
            start: 0,
        })
    }

    /// True iff no accepting state is reachable.
    pub fn is_empty(&self) -> bool {
        self.search().is_none()
    }

    /// The shortest accepted string, or `None` for the empty language.
    ///
    /// Breadth-first search over states; each edge consumes exactly one
    /// byte, so the first accepting state found is at minimal distance. Edge
    /// labels pick a printable representative byte where the class allows.
    pub fn shortest_witness(&self) -> Option<String> {
        self.search()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Membership test.
    pub fn matches(&self, input: &str) -> bool {
        let mut state = self.start;
        for &byte in input.as_bytes() {
            match self.edges[state]
                .iter()
                .find(|(class, _)| class.contains(byte))
            {
                Some((_, target)) => state = *target,
                None => return false,
            }
        }
        self.accept[state]
    }

    pub fn state_count(&self) -> usize {
        self.accept.len()
    }

    fn search(&self) -> Option<Vec<u8>> {
        if self.accept[self.start] {
            return Some(Vec::new());
        }
        let mut prev: Vec<Option<(usize, u8)>> = vec![None; self.accept.len()];
        let mut visited = vec![false; self.accept.len()];
        visited[self.start] = true;
        let mut queue = VecDeque::from([self.start]);

        while let Some(state) = queue.pop_front() {
            for (class, target) in &self.edges[state] {
                if visited[*target] {
                    continue;
                }
                visited[*target] = true;
                let byte = class.representative().unwrap_or(b'?');
                prev[*target] = Some((state, byte));
                if self.accept[*target] {
                    return Some(backtrack(&prev, self.start, *target));
                }
                queue.push_back(*target);
            }
        }
        None
    }
}

/// Eps-closure of a seed set, returned sorted for use as a map key.
fn closure(nfa: &Nfa, seed: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut seen: BTreeSet<usize> = BTreeSet::new();
    let mut stack: Vec<usize> = seed.collect();
    while let Some(state) = stack.pop() {
        if seen.insert(state) {
            stack.extend(nfa.eps[state].iter().copied());
        }
    }
    seen.into_iter().collect()
}

/// Split the byte range at every class boundary; yields only segments
/// covered by at least one outgoing class.
fn partition(outgoing: &[(ByteClass, usize)]) -> Vec<(u8, u8)> {
    let mut cuts: Vec<u16> = outgoing
        .iter()
        .flat_map(|(class, _)| class.ranges().iter())
        .flat_map(|&(lo, hi)| [u16::from(lo), u16::from(hi) + 1])
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    cuts.windows(2)
        .filter_map(|window| {
            let lo = window[0];
            let hi = window[1] - 1;
            (lo <= 255).then(|| (lo as u8, hi.min(255) as u8))
        })
        .collect()
}

fn backtrack(prev: &[Option<(usize, u8)>], start: usize, accept: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut cursor = accept;
    while cursor != start {
        let Some((parent, byte)) = prev[cursor] else {
            break;
        };
        bytes.push(byte);
        cursor = parent;
    }
    bytes.reverse();
    bytes
}
