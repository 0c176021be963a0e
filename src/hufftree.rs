use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::code_table::CodeTable;
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(bytes))
    }

    /// Builds the tree by repeatedly merging the two lightest fragments.
    ///
    /// Leaves enter the heap in ascending symbol order and every merged node
    /// is numbered after all existing entries. Equal weights pop in that
    /// order, so the same table always yields the same tree. The first node
    /// popped becomes the left child.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(HuffmanError::EmptyInput);
        }

        let leaves: Vec<Entry> = frequencies
            .iter()
            .enumerate()
            .map(|(seq, (byte, count))| Entry {
                seq,
                node: HuffNode::new(byte, count),
            })
            .collect();
        let mut next_seq = leaves.len();

        let mut heap = MinHeap::build(leaves);
        while heap.heap_size() > 1 {
            let x = heap.extract_min().ok_or(HuffmanError::EmptyInput)?;
            let y = heap.extract_min().ok_or(HuffmanError::EmptyInput)?;
            trace!(
                left_weight = x.node.weight(),
                right_weight = y.node.weight(),
                seq = next_seq,
                "merging"
            );

            heap.insert(Entry {
                seq: next_seq,
                node: HuffNode::merge(x.node, y.node),
            });
            next_seq += 1;
        }

        let root = heap.extract_min().ok_or(HuffmanError::EmptyInput)?.node;
        debug_assert!(heap.is_empty());
        debug!(
            leaves = frequencies.len(),
            weight = root.weight(),
            "built huffman tree"
        );
        Ok(HuffmanTree { root })
    }

    pub fn generate_table(&self) -> CodeTable {
        CodeTable::from_tree(self)
    }

    pub fn weight(&self) -> usize {
        self.root.weight()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn extract_frequencies(&self) -> FrequencyTable {
        let mut frequencies = FrequencyTable::new();
        self.root.collect_frequencies(&mut frequencies);
        frequencies
    }

    /// Stores the leaf frequencies; the tree itself is rebuilt on load.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.extract_frequencies().serialize()
    }

    pub fn deserialize(data: &[u8]) -> Result<HuffmanTree> {
        let frequencies = FrequencyTable::deserialize(data)?;
        if frequencies.is_empty() {
            return Err(HuffmanError::malformed("stored tree has no symbols"));
        }
        Self::from_frequencies(&frequencies)
    }

    /// Indented dump of the tree, one node per line.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Huffman Tree Structure:")?;
        render_node(f, &self.root, 0, "root")
    }
}

fn render_node(
    f: &mut fmt::Formatter<'_>,
    node: &HuffNode,
    depth: usize,
    label: &str,
) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match node {
        HuffNode::Leaf { byte, weight } => writeln!(
            f,
            "{}{}-> Leaf: {:?} ({}) [weight: {}]",
            indent, label, *byte as char, byte, weight
        ),
        HuffNode::Internal { weight, left, right } => {
            writeln!(f, "{}{}-> Internal [weight: {}]", indent, label, weight)?;
            render_node(f, left, depth + 1, "L")?;
            render_node(f, right, depth + 1, "R")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: usize,
        byte: u8,
    },
    Internal {
        weight: usize,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn new(b: u8, f: usize) -> Self {
        HuffNode::Leaf { weight: f, byte: b }
    }

    pub fn weight(&self) -> usize {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// `a` becomes the left child.
    pub fn merge(a: Self, b: Self) -> Self {
        let weight = a.weight() + b.weight();
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Box::new(b),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            HuffNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn collect_frequencies(&self, frequencies: &mut FrequencyTable) {
        match self {
            HuffNode::Leaf { byte, weight } => frequencies.add(*byte, *weight),
            HuffNode::Internal { left, right, .. } => {
                left.collect_frequencies(frequencies);
                right.collect_frequencies(frequencies);
            }
        }
    }
}

/// Heap entry: weight first, then insertion sequence.
#[derive(Debug)]
struct Entry {
    seq: usize,
    node: HuffNode,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node
            .weight()
            .cmp(&other.node.weight())
            .then_with(|| self.seq.cmp(&other.seq))
    }
}
