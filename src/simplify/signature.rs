//! Structural and content signatures for repetition detection.
//!
//! Long lists and data tables dominate the serialized size of real designs
//! while adding nothing past the first few exemplars. Two cheap signatures
//! drive the policy: a shallow structure signature finds containers whose
//! children repeat, and a content signature deduplicates rows inside them.

use std::collections::HashMap;

use crate::figma::api_types::RawNode;

/// Children examined when probing a container for tabular repetition.
const DETECTION_WINDOW: usize = 10;
/// Repeats of one structure signature that make a container a table.
const DETECTION_REPEATS: usize = 3;
/// Exemplar rows kept per table container.
const KEPT_ROWS: u32 = 3;

/// Shallow structural signature: type, child count and the sorted set of
/// distinct child types, collected at levels 0..=2, recursing into the first
/// three children.
pub fn structure_signature(node: &RawNode) -> String {
    fn walk(node: &RawNode, level: u32, out: &mut Vec<String>) {
        if level > 2 {
            return;
        }
        let mut part = format!("{}[{}]", node.node_type, node.children.len());
        let mut child_types: Vec<&str> = node
            .children
            .iter()
            .map(|c| c.node_type.as_str())
            .collect();
        child_types.sort_unstable();
        child_types.dedup();
        if !child_types.is_empty() {
            part.push_str(&format!("({})", child_types.join(",")));
        }
        out.push(part);
        for child in node.children.iter().take(3) {
            walk(child, level + 1, out);
        }
    }

    let mut parts = Vec::new();
    walk(node, 0, &mut parts);
    parts.join("|")
}

/// Content signature: truncated text for TEXT nodes, `type[childCount]` for
/// container kinds. Nodes that emit nothing themselves aggregate from their
/// first five children, falling back to the structure signature when the
/// subtree yields nothing at all.
///
/// A FRAME row therefore signs as `FRAME[2]` regardless of the text inside
/// it; two rows differing only in cell text deduplicate, which is exactly
/// what makes long tables collapse to exemplars.
pub fn content_signature(node: &RawNode) -> String {
    match node.node_type.as_str() {
        "TEXT" => {
            if let Some(characters) = &node.characters {
                return characters.chars().take(20).collect();
            }
        }
        "FRAME" | "GROUP" | "INSTANCE" => {
            return format!("{}[{}]", node.node_type, node.children.len());
        }
        _ => {}
    }

    let parts: Vec<String> = node
        .children
        .iter()
        .take(5)
        .map(content_signature)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        structure_signature(node)
    } else {
        parts.join("|")
    }
}

/// A container is a table when it has more than three children and some
/// structure signature occurs at least three times among the first ten.
pub fn is_table_container(node: &RawNode) -> bool {
    if node.children.len() <= 3 {
        return false;
    }
    let mut counts: HashMap<String, usize> = HashMap::new();
    for child in node.children.iter().take(DETECTION_WINDOW) {
        let count = counts.entry(structure_signature(child)).or_insert(0);
        *count += 1;
        if *count >= DETECTION_REPEATS {
            return true;
        }
    }
    false
}

/// Per-container row bookkeeping for the dedup policy.
#[derive(Debug, Default)]
pub struct TableCounter {
    row_count: u32,
    rows_seen: HashMap<String, u32>,
    dropped: u32,
}

impl TableCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one row and decide whether to keep it.
    ///
    /// First sighting of a signature is always kept. Repeats are kept only
    /// while fewer than three rows have been kept overall, so a uniform
    /// table retains exactly its first three rows.
    pub fn admit(&mut self, row: &RawNode) -> bool {
        let signature = content_signature(row);
        match self.rows_seen.get_mut(&signature) {
            None => {
                self.rows_seen.insert(signature, 1);
                self.row_count += 1;
                true
            }
            Some(count) => {
                *count += 1;
                if self.row_count < KEPT_ROWS {
                    self.row_count += 1;
                    true
                } else {
                    self.dropped += 1;
                    false
                }
            }
        }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn total_observed(&self) -> u32 {
        self.rows_seen.values().sum()
    }
}
