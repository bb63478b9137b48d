//! Depth profiling for raw Figma documents.
//!
//! Answers "how deep should I ask for?" before a full fetch: walks the raw
//! tree, tallies node counts and an estimated serialized-character
//! contribution per depth, and recommends the smallest depth that covers
//! 80% of the nodes.

use std::fmt::Write;

use crate::figma::api_types::{RawNode, RawResponse};

/// Rough serialized cost per style block, fill, and effect, in characters.
const STYLE_BLOCK_CHARS: u64 = 200;
const FILL_CHARS: u64 = 100;
const EFFECT_CHARS: u64 = 150;

/// Serialized-output expansion factor over the raw character estimate.
const SIZE_FACTOR: f64 = 1.2 * 0.8;
const CHARS_PER_TOKEN: u64 = 4;

/// Node share a recommended depth must cover.
const COVERAGE_TARGET: f64 = 0.8;

const SAMPLES_PER_LEVEL: usize = 3;

#[derive(Debug, Clone)]
pub struct NodeSample {
    pub node_type: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct LevelStats {
    pub node_count: u64,
    pub chars: u64,
    pub samples: Vec<NodeSample>,
}

#[derive(Debug, Clone)]
pub struct DepthAnalysis {
    pub levels: Vec<LevelStats>,
    pub total_nodes: u64,
    pub total_chars: u64,
}

impl DepthAnalysis {
    pub fn max_depth(&self) -> u32 {
        self.levels.len().saturating_sub(1) as u32
    }

    pub fn estimated_kb(&self) -> f64 {
        self.total_chars as f64 * SIZE_FACTOR / 1024.0
    }

    pub fn estimated_tokens(&self) -> u64 {
        self.total_chars / CHARS_PER_TOKEN
    }

    /// Smallest depth whose cumulative node share reaches the coverage
    /// target.
    pub fn recommended_depth(&self) -> u32 {
        if self.total_nodes == 0 {
            return 0;
        }
        let mut cumulative = 0u64;
        for (depth, level) in self.levels.iter().enumerate() {
            cumulative += level.node_count;
            if cumulative as f64 / self.total_nodes as f64 >= COVERAGE_TARGET {
                return depth as u32;
            }
        }
        self.max_depth()
    }
}

/// Walk a raw response, respecting visibility, and profile it per depth.
pub fn analyze(raw: &RawResponse) -> DepthAnalysis {
    let mut levels: Vec<LevelStats> = Vec::new();

    match raw {
        RawResponse::File(file) => {
            for child in &file.document.children {
                walk(child, 0, &mut levels);
            }
        }
        RawResponse::Nodes(response) => {
            let mut entries: Vec<_> = response.nodes.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (_, entry) in entries {
                walk(&entry.document, 0, &mut levels);
            }
        }
    }

    let total_nodes = levels.iter().map(|l| l.node_count).sum();
    let total_chars = levels.iter().map(|l| l.chars).sum();

    DepthAnalysis {
        levels,
        total_nodes,
        total_chars,
    }
}

fn walk(node: &RawNode, depth: usize, levels: &mut Vec<LevelStats>) {
    if !node.is_visible() {
        return;
    }

    if levels.len() <= depth {
        levels.resize_with(depth + 1, LevelStats::default);
    }

    let level = &mut levels[depth];
    level.node_count += 1;
    level.chars += estimate_chars(node);
    if level.samples.len() < SAMPLES_PER_LEVEL {
        level.samples.push(NodeSample {
            node_type: node.node_type.clone(),
            name: node.name.clone(),
        });
    }

    for child in &node.children {
        walk(child, depth + 1, levels);
    }
}

/// Estimated character contribution of one node to the serialized output.
fn estimate_chars(node: &RawNode) -> u64 {
    let mut chars = (node.id.len() + node.name.len() + node.node_type.len()) as u64;
    if node.style.is_some() {
        chars += STYLE_BLOCK_CHARS;
    }
    chars += node.fills.len() as u64 * FILL_CHARS;
    chars += node.effects.len() as u64 * EFFECT_CHARS;
    if let Some(characters) = &node.characters {
        chars += characters.chars().count() as u64;
    }
    chars
}

/// Render the human-readable report handed back by the analysis tool.
pub fn render_report(analysis: &DepthAnalysis) -> String {
    let mut out = String::new();
    writeln!(out, "Figma depth analysis").ok();
    writeln!(
        out,
        "Max depth: {}, total nodes: {}",
        analysis.max_depth(),
        analysis.total_nodes
    )
    .ok();
    writeln!(
        out,
        "Estimated size: {:.1} KB (~{} tokens)",
        analysis.estimated_kb(),
        analysis.estimated_tokens()
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "{:>5}  {:>7}  {:>6}  {:>8}  Samples", "Depth", "Nodes", "Cum%", "CumKB").ok();

    let mut cumulative_nodes = 0u64;
    let mut cumulative_chars = 0u64;
    for (depth, level) in analysis.levels.iter().enumerate() {
        cumulative_nodes += level.node_count;
        cumulative_chars += level.chars;
        let percent = if analysis.total_nodes == 0 {
            0.0
        } else {
            cumulative_nodes as f64 / analysis.total_nodes as f64 * 100.0
        };
        let kb = cumulative_chars as f64 * SIZE_FACTOR / 1024.0;
        let samples: Vec<String> = level
            .samples
            .iter()
            .map(|s| format!("{} \"{}\"", s.node_type, s.name))
            .collect();
        writeln!(
            out,
            "{depth:>5}  {:>7}  {percent:>5.1}%  {kb:>8.1}  {}",
            level.node_count,
            samples.join("; ")
        )
        .ok();
    }

    writeln!(out).ok();
    let recommended = analysis.recommended_depth();
    let coverage: u64 = analysis
        .levels
        .iter()
        .take(recommended as usize + 1)
        .map(|l| l.node_count)
        .sum();
    let share = if analysis.total_nodes == 0 {
        0.0
    } else {
        coverage as f64 / analysis.total_nodes as f64 * 100.0
    };
    writeln!(
        out,
        "Recommended depth: {recommended} (covers {share:.1}% of nodes)"
    )
    .ok();

    out
}
