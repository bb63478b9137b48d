//! Whole-engine integration tests: one realistic document through
//! parse_response, checked against the engine's structural invariants.

use serde_json::{json, Value};

use fcx_lib::{parse_response, remove_empty_keys, RawResponse, SimplifiedNode, StyleSlot};

/// A design resembling a small product page: auto-layout hero with styled
/// text, a seven-row pricing table, a hidden draft frame, an icon vector and
/// an instance wrapper.
fn fixture() -> RawResponse {
    let rows: Vec<Value> = (1..=7)
        .map(|k| {
            json!({
                "id": format!("20:{k}"), "name": format!("Plan row {k}"), "type": "FRAME",
                "children": [
                    {"id": format!("20:{k}:1"), "name": "Plan", "type": "TEXT",
                     "characters": format!("Plan {k}"),
                     "style": {"fontFamily": "Inter", "fontWeight": 500, "fontSize": 14}},
                    {"id": format!("20:{k}:2"), "name": "Price", "type": "TEXT",
                     "characters": format!("${k}9 / month"),
                     "style": {"fontFamily": "Inter", "fontWeight": 500, "fontSize": 14}}
                ]
            })
        })
        .collect();

    serde_json::from_value(json!({
        "name": "Pricing page",
        "lastModified": "2024-06-01T12:00:00Z",
        "thumbnailUrl": "https://example.com/thumb.png",
        "document": {
            "id": "0:0", "name": "Document", "type": "DOCUMENT",
            "children": [{
                "id": "1:0", "name": "Page 1", "type": "CANVAS",
                "children": [
                    {
                        "id": "10:0", "name": "Hero", "type": "FRAME",
                        "layoutMode": "VERTICAL",
                        "itemSpacing": 16.0,
                        "paddingTop": 32.0, "paddingBottom": 32.0,
                        "paddingLeft": 24.0, "paddingRight": 24.0,
                        "fills": [{"type": "SOLID",
                                   "color": {"r": 1.0, "g": 1.0, "b": 1.0, "a": 1.0}}],
                        "children": [
                            {"id": "10:1", "name": "Title", "type": "TEXT",
                             "characters": "Simple pricing",
                             "style": {"fontFamily": "Inter", "fontWeight": 700,
                                        "fontSize": 32, "lineHeightPx": 40.0}},
                            {"id": "10:2", "name": "Icon wrap", "type": "INSTANCE",
                             "componentId": "90:1",
                             "children": [
                                 {"id": "10:3", "name": "Spark", "type": "VECTOR"}
                             ]},
                            {"id": "10:4", "name": "Draft", "type": "FRAME",
                             "visible": false,
                             "children": [
                                 {"id": "10:5", "name": "Old", "type": "TEXT",
                                  "characters": "outdated"}
                             ]}
                        ]
                    },
                    {"id": "20:0", "name": "Plans", "type": "FRAME", "children": rows}
                ]
            }]
        },
        "components": {
            "90:1": {"key": "ck", "name": "Spark icon"}
        }
    }))
    .expect("fixture deserializes")
}

fn walk<'a>(nodes: &'a [SimplifiedNode], visit: &mut dyn FnMut(&'a SimplifiedNode, u32)) {
    fn inner<'a>(
        nodes: &'a [SimplifiedNode],
        depth: u32,
        visit: &mut dyn FnMut(&'a SimplifiedNode, u32),
    ) {
        for node in nodes {
            visit(node, depth);
            inner(&node.children, depth + 1, visit);
        }
    }
    inner(nodes, 0, visit);
}

fn find<'a>(nodes: &'a [SimplifiedNode], id: &str) -> Option<&'a SimplifiedNode> {
    let mut found = None;
    walk(nodes, &mut |node, _| {
        if node.id == id {
            found = Some(node);
        }
    });
    found
}

#[test]
fn full_document_simplifies_with_all_policies_applied() {
    let design = parse_response(&fixture(), None);

    assert_eq!(design.name, "Pricing page");
    assert_eq!(design.last_modified.as_deref(), Some("2024-06-01T12:00:00Z"));

    // Hidden frame and its subtree are gone.
    assert!(find(&design.nodes, "10:4").is_none());
    assert!(find(&design.nodes, "10:5").is_none());

    // The single-child INSTANCE wrapper is elided; its vector child is
    // rewritten for SVG download.
    let hero = find(&design.nodes, "10:0").expect("hero");
    assert!(find(&design.nodes, "10:2").is_none(), "wrapper elided");
    let spark = hero
        .children
        .iter()
        .find(|c| c.id == "10:3")
        .expect("vector child promoted");
    assert_eq!(spark.node_type, "IMAGE-SVG");

    // Table rows collapse to three exemplars plus a summary.
    let plans = find(&design.nodes, "20:0").expect("plans table");
    assert_eq!(plans.children.len(), 4);
    let summary = plans.children.last().unwrap();
    assert_eq!(summary.node_type, "SUMMARY");
    assert_eq!(summary.text.as_deref(), Some("(Omitted 4 similar items)"));

    // The row text style is used six times (2 per kept row x 3): interned.
    let row_text = find(&design.nodes, "20:1:1").expect("first row cell");
    let style_id = row_text
        .text_style
        .as_ref()
        .and_then(StyleSlot::reference)
        .expect("interned style id");
    assert!(design.global_vars.styles.contains_key(style_id));

    // The hero title style is used once: inlined, not in the table.
    let title = find(&design.nodes, "10:1").expect("title");
    assert!(matches!(title.text_style, Some(StyleSlot::Inline(_))));

    // Component metadata is aggregated.
    assert_eq!(design.components["90:1"].name, "Spark icon");
}

#[test]
fn style_slot_invariants_hold_across_the_tree() {
    let design = parse_response(&fixture(), None);

    let mut references: Vec<&str> = Vec::new();
    walk(&design.nodes, &mut |node, _| {
        for slot in node.style_slots() {
            if let Some(id) = slot.reference() {
                references.push(id);
            }
        }
    });

    for id in &references {
        assert!(
            design.global_vars.styles.contains_key(*id),
            "dangling reference {id}"
        );
    }
    for id in design.global_vars.styles.keys() {
        let uses = references.iter().filter(|r| *r == id).count();
        assert!(uses >= 3, "style {id} survived with {uses} references");
    }
}

#[test]
fn depth_budget_bounds_every_real_node() {
    let design = parse_response(&fixture(), Some(2));

    walk(&design.nodes, &mut |node, depth| {
        if node.node_type != "DEPTH_LIMIT" {
            assert!(depth <= 2, "node {} at depth {depth}", node.id);
        } else {
            assert!(node.id.starts_with("depth_limit_"));
            assert!(node.children.is_empty());
        }
    });
}

#[test]
fn payload_serializes_clean_yaml_and_json() {
    let design = parse_response(&fixture(), None);
    let payload = design.into_payload();

    let mut value = serde_json::to_value(&payload).unwrap();
    remove_empty_keys(&mut value);

    // No empty containers survive anywhere in the scrubbed payload.
    fn assert_no_empties(value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    assert!(!child.is_null(), "null at {key}");
                    if let Some(items) = child.as_array() {
                        assert!(!items.is_empty(), "empty array at {key}");
                    }
                    if let Some(object) = child.as_object() {
                        assert!(!object.is_empty(), "empty object at {key}");
                    }
                    assert_no_empties(child);
                }
            }
            Value::Array(items) => items.iter().for_each(assert_no_empties),
            _ => {}
        }
    }
    assert_no_empties(&value);

    let yaml = serde_yaml::to_string(&value).unwrap();
    assert!(yaml.contains("metadata:"));
    assert!(yaml.contains("globalVars:"));

    // Scrubbing is idempotent.
    let mut twice = value.clone();
    remove_empty_keys(&mut twice);
    assert_eq!(value, twice);
}
