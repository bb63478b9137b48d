//! Content-addressed style store with post-pass inlining.
//!
//! Equal style values share one generated id; after the traversal,
//! [`StyleInterner::finalize`] inlines every style referenced fewer than
//! three times back into its slots and drops it from the table, so the
//! emitted `globalVars` only carries styles that actually pay for the
//! indirection.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;

use super::types::{GlobalVars, SimplifiedNode, StyleId, StyleSlot, StyleValue};

/// Styles used fewer than this many times are inlined at finalize.
pub const INLINE_THRESHOLD: u32 = 3;

const ID_LEN: usize = 6;
const ID_SPACE: u64 = 36u64.pow(ID_LEN as u32);
// Odd and not divisible by 3, so multiplication permutes the id space.
const ID_MULTIPLIER: u64 = 2_654_435_761;

/// Sequential short-id source. Ids match `[A-Z0-9]{6}`, are unique within a
/// parse, and are intentionally not stable across parses.
#[derive(Debug, Default)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn next(&mut self) -> String {
        let scrambled = self.counter.wrapping_mul(ID_MULTIPLIER) % ID_SPACE;
        self.counter += 1;
        encode_base36(scrambled)
    }
}

fn encode_base36(mut value: u64) -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut out = [b'0'; ID_LEN];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Style-id prefix, one per slot kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePrefix {
    Style,
    Fill,
    Stroke,
    Effect,
    Layout,
}

impl StylePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            StylePrefix::Style => "style",
            StylePrefix::Fill => "fill",
            StylePrefix::Stroke => "stroke",
            StylePrefix::Effect => "effect",
            StylePrefix::Layout => "layout",
        }
    }
}

#[derive(Debug, Default)]
pub struct StyleInterner {
    styles: BTreeMap<StyleId, StyleValue>,
    usage: HashMap<StyleId, u32>,
    lookup: HashMap<String, StyleId>,
    ids: IdGenerator,
}

impl StyleInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `value`, returning the shared id. Equal values (under canonical
    /// serialization) always map to the same id within one parse.
    pub fn intern(&mut self, value: StyleValue, prefix: StylePrefix) -> StyleId {
        let key = canonical_key(&value);
        if let Some(id) = self.lookup.get(&key) {
            *self.usage.entry(id.clone()).or_insert(0) += 1;
            return id.clone();
        }

        let id = format!("{}_{}", prefix.as_str(), self.ids.next());
        self.lookup.insert(key, id.clone());
        self.usage.insert(id.clone(), 1);
        self.styles.insert(id.clone(), value);
        id
    }

    pub fn usage_count(&self, id: &str) -> u32 {
        self.usage.get(id).copied().unwrap_or(0)
    }

    /// Hand out a raw short id for synthetic nodes sharing this parse's id
    /// sequence.
    pub fn next_short_id(&mut self) -> String {
        self.ids.next()
    }

    /// Inline every style used fewer than [`INLINE_THRESHOLD`] times into the
    /// slots that reference it, prune those ids, and return the surviving
    /// table.
    pub fn finalize(mut self, nodes: &mut [SimplifiedNode]) -> GlobalVars {
        let inline: HashSet<StyleId> = self
            .usage
            .iter()
            .filter(|(_, count)| **count < INLINE_THRESHOLD)
            .map(|(id, _)| id.clone())
            .collect();

        for node in nodes.iter_mut() {
            inline_into_node(node, &inline, &self.styles);
        }

        for id in &inline {
            self.styles.remove(id);
        }

        GlobalVars {
            styles: self.styles,
        }
    }
}

fn inline_into_node(
    node: &mut SimplifiedNode,
    inline: &HashSet<StyleId>,
    styles: &BTreeMap<StyleId, StyleValue>,
) {
    for slot in node.style_slots_mut() {
        if let StyleSlot::Reference(id) = slot {
            if inline.contains(id.as_str()) {
                if let Some(value) = styles.get(id.as_str()) {
                    *slot = StyleSlot::Inline(Box::new(value.clone()));
                }
            }
        }
    }
    for child in &mut node.children {
        inline_into_node(child, inline, styles);
    }
}

/// Canonical serialization used as the interning key: JSON with object keys
/// sorted lexicographically at every level.
pub fn canonical_key(value: &StyleValue) -> String {
    let json = serde_json::to_value(value).unwrap_or(Value::Null);
    let mut out = String::new();
    write_canonical(&json, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplify::types::{SimplifiedFill, TextStyle};

    fn text_style(family: &str, size: f64) -> StyleValue {
        StyleValue::Text(TextStyle {
            font_family: Some(family.to_string()),
            font_weight: Some(400),
            font_size: Some(size),
            ..Default::default()
        })
    }

    #[test]
    fn id_format_matches_wire_contract() {
        let mut interner = StyleInterner::new();
        let id = interner.intern(text_style("Inter", 16.0), StylePrefix::Style);
        let (prefix, suffix) = id.split_once('_').expect("prefix and suffix");
        assert_eq!(prefix, "style");
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn equal_values_share_an_id_and_count_usages() {
        let mut interner = StyleInterner::new();
        let a = interner.intern(text_style("Inter", 16.0), StylePrefix::Style);
        let b = interner.intern(text_style("Inter", 16.0), StylePrefix::Style);
        let c = interner.intern(text_style("Roboto", 14.0), StylePrefix::Style);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.usage_count(&a), 2);
        assert_eq!(interner.usage_count(&c), 1);
    }

    #[test]
    fn id_generator_does_not_repeat_early() {
        let mut ids = IdGenerator::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(ids.next()), "short id repeated");
        }
    }

    #[test]
    fn finalize_inlines_below_threshold() {
        let mut interner = StyleInterner::new();
        let id = interner.intern(text_style("Inter", 16.0), StylePrefix::Style);
        let _ = interner.intern(text_style("Inter", 16.0), StylePrefix::Style);

        let mut nodes = vec![
            SimplifiedNode {
                text_style: Some(StyleSlot::Reference(id.clone())),
                ..SimplifiedNode::new("1:1", "A", "TEXT")
            },
            SimplifiedNode {
                text_style: Some(StyleSlot::Reference(id.clone())),
                ..SimplifiedNode::new("1:2", "B", "TEXT")
            },
        ];

        let vars = interner.finalize(&mut nodes);
        assert!(vars.styles.is_empty(), "usage 2 should inline");
        for node in &nodes {
            match node.text_style.as_ref().unwrap() {
                StyleSlot::Inline(value) => {
                    assert_eq!(**value, text_style("Inter", 16.0));
                }
                StyleSlot::Reference(id) => panic!("expected inline, got reference {id}"),
            }
        }
    }

    #[test]
    fn finalize_keeps_styles_at_threshold() {
        let mut interner = StyleInterner::new();
        let mut id = String::new();
        for _ in 0..3 {
            id = interner.intern(text_style("Inter", 16.0), StylePrefix::Style);
        }

        let mut nodes: Vec<SimplifiedNode> = (0..3)
            .map(|i| SimplifiedNode {
                text_style: Some(StyleSlot::Reference(id.clone())),
                ..SimplifiedNode::new(&format!("1:{i}"), "T", "TEXT")
            })
            .collect();

        let vars = interner.finalize(&mut nodes);
        assert_eq!(vars.styles.len(), 1);
        assert!(vars.styles.contains_key(&id));
        for node in &nodes {
            assert_eq!(node.text_style.as_ref().unwrap().reference(), Some(&*id));
        }
    }

    #[test]
    fn finalize_reaches_nested_children() {
        let mut interner = StyleInterner::new();
        let id = interner.intern(
            StyleValue::Fills(vec![SimplifiedFill::Css("#FF0000".to_string())]),
            StylePrefix::Fill,
        );

        let mut nodes = vec![SimplifiedNode {
            children: vec![SimplifiedNode {
                fills: Some(StyleSlot::Reference(id.clone())),
                ..SimplifiedNode::new("1:2", "Leaf", "RECTANGLE")
            }],
            ..SimplifiedNode::new("1:1", "Root", "FRAME")
        }];

        let vars = interner.finalize(&mut nodes);
        assert!(vars.styles.is_empty());
        assert!(matches!(
            nodes[0].children[0].fills,
            Some(StyleSlot::Inline(_))
        ));
    }

    #[test]
    fn canonical_key_is_order_insensitive() {
        // Two values that serialize with the same fields must produce one key
        // regardless of map iteration order; BTreeMap output plus sorted
        // canonical writing guarantees it.
        let a = canonical_key(&text_style("Inter", 16.0));
        let b = canonical_key(&text_style("Inter", 16.0));
        assert_eq!(a, b);
        assert!(a.contains("\"fontFamily\""));
    }
}
