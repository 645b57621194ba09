// Legacy document migration
//
// Two older shapes are still found in the wild:
//   1. single-token cells: {"hasButterfly": true, "color": "rgb(...)"}
//   2. token lists under the old key: {"butterflies": [{"color": ...}]}
// Both are rewritten into {"tokens": [{"color": ...}]} before typed decoding.

use serde_json::{Map, Value};

/// Rewrite a parsed document into the current cell shape.
///
/// Legacy single-token cells are recognised by looking at the first cell of
/// the first row only. Anything unrecognisable becomes an empty cell.
/// Idempotent: a normalized document comes back unchanged.
pub fn normalize(doc: Value) -> Value {
    let Value::Object(mut map) = doc else {
        return doc;
    };

    for key in ["columns", "rows"] {
        let labels = match map.remove(key) {
            Some(Value::Array(items)) => items.into_iter().map(label_value).collect(),
            _ => Vec::new(),
        };
        map.insert(key.to_string(), Value::Array(labels));
    }

    if let Some(title) = map.remove("title") {
        if title.is_string() {
            map.insert("title".to_string(), title);
        }
    }

    let rows = match map.remove("cells") {
        Some(Value::Array(rows)) => rows,
        _ => Vec::new(),
    };
    let legacy = is_legacy_cell(rows.first().and_then(|r| r.get(0)));
    if legacy {
        log::debug!("migrating single-token legacy document");
    }

    let cells = rows
        .into_iter()
        .map(|row| match row {
            Value::Array(cells) => Value::Array(
                cells.into_iter().map(|cell| normalize_cell(cell, legacy)).collect(),
            ),
            _ => Value::Array(Vec::new()),
        })
        .collect();
    map.insert("cells".to_string(), Value::Array(cells));

    Value::Object(map)
}

fn is_legacy_cell(cell: Option<&Value>) -> bool {
    match cell {
        Some(Value::Object(obj)) => obj.contains_key("hasButterfly") || obj.contains_key("color"),
        _ => false,
    }
}

fn normalize_cell(cell: Value, legacy: bool) -> Value {
    let tokens = match cell {
        Value::Object(mut obj) => {
            if legacy && (obj.contains_key("hasButterfly") || obj.contains_key("color")) {
                if obj.get("hasButterfly").map(is_truthy).unwrap_or(false) {
                    let color = obj.remove("color").map(color_value).unwrap_or(Value::Null);
                    vec![token(color)]
                } else {
                    Vec::new()
                }
            } else {
                match obj.remove("tokens") {
                    Some(Value::Array(list)) => {
                        list.into_iter().map(|t| normalize_token(t, token_color)).collect()
                    }
                    Some(_) => Vec::new(),
                    None => match obj.remove("butterflies") {
                        Some(Value::Array(list)) => {
                            list.into_iter().map(|t| normalize_token(t, color_value)).collect()
                        }
                        _ => Vec::new(),
                    },
                }
            }
        }
        _ => Vec::new(),
    };

    let mut out = Map::new();
    out.insert("tokens".to_string(), Value::Array(tokens));
    Value::Object(out)
}

fn normalize_token(value: Value, color: fn(Value) -> Value) -> Value {
    match value {
        Value::Object(mut obj) => token(obj.remove("color").map(color).unwrap_or(Value::Null)),
        Value::String(_) => token(color(value)),
        _ => token(Value::Null),
    }
}

fn token(color: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("color".to_string(), color);
    Value::Object(obj)
}

/// Current documents: any string is kept as written.
fn token_color(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        _ => Value::Null,
    }
}

/// Legacy documents: non-empty strings survive verbatim; anything else
/// means "pick a color on load".
fn color_value(value: Value) -> Value {
    match value {
        Value::String(s) if !s.trim().is_empty() => Value::String(s),
        _ => Value::Null,
    }
}

fn label_value(value: Value) -> Value {
    match value {
        Value::String(_) => value,
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        _ => Value::String(String::new()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_token_legacy() {
        let doc = json!({
            "columns": ["HW1", "HW2"],
            "rows": ["Ana"],
            "cells": [[
                {"hasButterfly": true, "color": "#000"},
                {"hasButterfly": false, "color": null}
            ]]
        });
        let out = normalize(doc);
        assert_eq!(
            out["cells"],
            json!([[{"tokens": [{"color": "#000"}]}, {"tokens": []}]])
        );
    }

    #[test]
    fn test_butterflies_key_renamed() {
        let doc = json!({
            "title": "Week 1",
            "columns": ["HW1"],
            "rows": ["Ana"],
            "cells": [[{"butterflies": [{"color": "#FFD400"}, {"color": "rgb(1, 2, 3)"}]}]]
        });
        let out = normalize(doc);
        assert_eq!(out["title"], "Week 1");
        assert_eq!(
            out["cells"][0][0],
            json!({"tokens": [{"color": "#FFD400"}, {"color": "rgb(1, 2, 3)"}]})
        );
    }

    #[test]
    fn test_current_document_unchanged() {
        let doc = json!({
            "title": "Spring",
            "columns": ["HW1"],
            "rows": ["Ana", "Ben"],
            "cells": [[{"tokens": [{"color": "#FF6B00"}]}], [{"tokens": []}]]
        });
        assert_eq!(normalize(doc.clone()), doc);
    }

    #[test]
    fn test_idempotent_on_legacy() {
        let doc = json!({
            "columns": ["A"],
            "rows": ["x", "y"],
            "cells": [[{"hasButterfly": true, "color": "red"}], [null]]
        });
        let once = normalize(doc);
        assert_eq!(normalize(once.clone()), once);
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let out = normalize(json!({"cells": []}));
        assert_eq!(out["columns"], json!([]));
        assert_eq!(out["rows"], json!([]));
        assert_eq!(out["cells"], json!([]));
    }

    #[test]
    fn test_malformed_cells_become_empty() {
        let doc = json!({
            "columns": ["A", "B", "C"],
            "rows": ["x"],
            "cells": [[{"tokens": [{"color": "blue"}]}, 7, {"mystery": true}]]
        });
        let out = normalize(doc);
        assert_eq!(out["cells"][0][1], json!({"tokens": []}));
        assert_eq!(out["cells"][0][2], json!({"tokens": []}));
    }

    #[test]
    fn test_legacy_null_color_kept_as_null() {
        let doc = json!({
            "columns": ["A"],
            "rows": ["x"],
            "cells": [[{"hasButterfly": true, "color": null}]]
        });
        assert_eq!(normalize(doc)["cells"][0][0], json!({"tokens": [{"color": null}]}));
    }

    #[test]
    fn test_current_blank_color_not_rewritten() {
        let doc = json!({
            "title": "Spring",
            "columns": ["A"],
            "rows": ["x"],
            "cells": [[{"tokens": [{"color": ""}, {"color": "#FF6B00"}]}]]
        });
        assert_eq!(normalize(doc.clone()), doc);
    }

    #[test]
    fn test_legacy_blank_colors_become_null() {
        let single = json!({
            "columns": ["A"],
            "rows": ["x"],
            "cells": [[{"hasButterfly": true, "color": "  "}]]
        });
        assert_eq!(normalize(single)["cells"][0][0], json!({"tokens": [{"color": null}]}));

        let list = json!({
            "columns": ["A"],
            "rows": ["x"],
            "cells": [[{"butterflies": [{"color": ""}, "#000"]}]]
        });
        assert_eq!(
            normalize(list)["cells"][0][0],
            json!({"tokens": [{"color": null}, {"color": "#000"}]})
        );
    }

    #[test]
    fn test_non_object_passes_through() {
        assert_eq!(normalize(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_non_string_labels_coerced() {
        let out = normalize(json!({"columns": [1, null], "rows": [true]}));
        assert_eq!(out["columns"], json!(["1", ""]));
        assert_eq!(out["rows"], json!(["true"]));
    }

    // -------------------------------------------------------------------------
    // Property tests
    // -------------------------------------------------------------------------

    mod properties {
        use super::*;
        use proptest::collection::vec;
        use proptest::prelude::*;

        fn config() -> ProptestConfig {
            ProptestConfig {
                cases: std::env::var("PROPTEST_CASES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(256),
                failure_persistence: None,
                ..ProptestConfig::default()
            }
        }

        fn arb_color() -> impl Strategy<Value = Value> {
            prop_oneof![
                1 => Just(Value::Null),
                1 => Just(json!("")),
                4 => "[#A-Fa-f0-9 ]{0,8}".prop_map(Value::String),
            ]
        }

        fn arb_label() -> impl Strategy<Value = Value> {
            prop_oneof![
                6 => "[A-Za-z ]{0,6}".prop_map(Value::String),
                1 => any::<i32>().prop_map(|n| json!(n)),
                1 => any::<bool>().prop_map(Value::Bool),
                1 => Just(Value::Null),
            ]
        }

        fn arb_current_cell() -> impl Strategy<Value = Value> {
            vec(arb_color(), 0..4).prop_map(|colors| {
                json!({"tokens": colors.into_iter().map(|c| json!({"color": c})).collect::<Vec<_>>()})
            })
        }

        /// Any cell shape seen in the wild, plus junk.
        fn arb_any_cell() -> impl Strategy<Value = Value> {
            prop_oneof![
                3 => (any::<bool>(), arb_color())
                    .prop_map(|(has, color)| json!({"hasButterfly": has, "color": color})),
                3 => arb_current_cell(),
                2 => vec(arb_color(), 0..4).prop_map(|colors| {
                    json!({"butterflies": colors.into_iter().map(|c| json!({"color": c})).collect::<Vec<_>>()})
                }),
                1 => Just(Value::Null),
                1 => any::<i32>().prop_map(|n| json!(n)),
            ]
        }

        fn arb_document(cell: BoxedStrategy<Value>, label: BoxedStrategy<Value>) -> impl Strategy<Value = Value> {
            (
                proptest::option::of("[A-Za-z ]{0,10}"),
                vec(label.clone(), 0..4),
                vec(label, 0..4),
                vec(vec(cell, 0..4), 0..4),
            )
                .prop_map(|(title, columns, rows, cells)| {
                    let mut doc = json!({"columns": columns, "rows": rows, "cells": cells});
                    if let Some(title) = title {
                        doc["title"] = json!(title);
                    }
                    doc
                })
        }

        proptest! {
            #![proptest_config(config())]

            #[test]
            fn prop_normalize_idempotent(
                doc in arb_document(arb_any_cell().boxed(), arb_label().boxed())
            ) {
                let once = normalize(doc);
                prop_assert_eq!(normalize(once.clone()), once);
            }

            #[test]
            fn prop_current_document_unchanged(
                doc in arb_document(
                    arb_current_cell().boxed(),
                    "[A-Za-z ]{0,6}".prop_map(Value::String).boxed(),
                )
            ) {
                prop_assert_eq!(normalize(doc.clone()), doc);
            }
        }
    }
}
