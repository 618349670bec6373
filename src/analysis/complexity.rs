//! Linguistic complexity via a suffix trie
//!
//! Every suffix of the sequence is threaded into a trie; each node created on
//! the way stands for one distinct substring. The number of such nodes,
//! divided by the largest vocabulary a sequence of that length could have
//! over ACGT, is the linguistic complexity: 1.0 for maximally diverse
//! sequences, lower for repetitive ones.

use std::collections::BTreeMap;

use super::bases::validate_sequence;
use super::error::{Result, ThermoError};

/// Size of the DNA alphabet
pub const DNA_ALPHABET_SIZE: u64 = 4;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// Start offset of the suffix ending here, if any
    position: Option<usize>,
    children: BTreeMap<u8, usize>,
}

/// Suffix trie over one or more sequences, nodes kept in an arena.
#[derive(Debug, Clone)]
pub struct SuffixTrie {
    nodes: Vec<TrieNode>,
    edges: usize,
}

impl Default for SuffixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl SuffixTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            edges: 0,
        }
    }

    /// Build a trie holding every suffix of `seq`.
    pub fn from_sequence(seq: &str) -> Result<Self> {
        let mut trie = Self::new();
        trie.insert_suffixes(seq)?;
        Ok(trie)
    }

    /// Thread `word` from the root, creating nodes as needed, and tag its last
    /// node with `position`. Callers pass validated bases; an empty word is a
    /// no-op so the root never carries a position.
    pub(crate) fn insert_word(&mut self, word: &[u8], position: usize) {
        if word.is_empty() {
            return;
        }
        let mut node = ROOT;
        for &b in word {
            node = match self.nodes[node].children.get(&b) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(b, child);
                    self.edges += 1;
                    child
                }
            };
        }
        self.nodes[node].position = Some(position);
    }

    /// Insert `seq[p..]` for every start `p`.
    pub fn insert_suffixes(&mut self, seq: &str) -> Result<()> {
        validate_sequence(seq)?;
        let bytes = seq.as_bytes();
        for p in 0..bytes.len() {
            self.insert_word(&bytes[p..], p);
        }
        Ok(())
    }

    /// Number of edges, i.e. distinct non-empty substrings inserted so far.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Number of nodes including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Start offset recorded for `suffix`, if it was inserted as a suffix.
    pub fn position_of(&self, suffix: &str) -> Option<usize> {
        let mut node = ROOT;
        for b in suffix.bytes() {
            node = *self.nodes[node].children.get(&b)?;
        }
        self.nodes[node].position
    }

    /// Root-to-leaf paths in A < C < G < T order. Each call starts a fresh walk.
    pub fn paths(&self) -> SuffixPaths<'_> {
        let stack = if self.edges == 0 {
            Vec::new()
        } else {
            vec![(ROOT, Vec::new())]
        };
        SuffixPaths { trie: self, stack }
    }
}

/// Depth-first walk over the complete suffix paths of a [`SuffixTrie`].
#[derive(Debug, Clone)]
pub struct SuffixPaths<'a> {
    trie: &'a SuffixTrie,
    stack: Vec<(usize, Vec<u8>)>,
}

impl Iterator for SuffixPaths<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            let children = &self.trie.nodes[node].children;
            if children.is_empty() {
                return Some(path.into_iter().map(char::from).collect());
            }
            for (&b, &child) in children.iter().rev() {
                let mut next = path.clone();
                next.push(b);
                self.stack.push((child, next));
            }
        }
        None
    }
}

/// Largest number of distinct substrings (lengths 1 to `word_len`) a word of
/// length `word_len` can hold over an alphabet of `alphabet_size` letters.
pub fn max_vocabulary(alphabet_size: u64, word_len: usize) -> u64 {
    (1..=word_len)
        .map(|i| {
            let possible = u32::try_from(i)
                .ok()
                .and_then(|exp| alphabet_size.checked_pow(exp))
                .unwrap_or(u64::MAX);
            let windows = (word_len - i + 1) as u64;
            possible.min(windows)
        })
        .sum()
}

/// Ratio of distinct substrings of `seq` to the most a DNA sequence of the
/// same length could hold. Lies in (0, 1].
pub fn linguistic_complexity(seq: &str) -> Result<f64> {
    if seq.is_empty() {
        return Err(ThermoError::SequenceTooShort {
            required: 1,
            actual: 0,
        });
    }
    let trie = SuffixTrie::from_sequence(seq)?;
    let max_vocab = max_vocabulary(DNA_ALPHABET_SIZE, seq.len());
    let complexity = trie.edge_count() as f64 / max_vocab as f64;
    log::debug!(
        "linguistic complexity {:.4} ({} of {} substrings, {} nt)",
        complexity,
        trie.edge_count(),
        max_vocab,
        seq.len()
    );
    Ok(complexity)
}
