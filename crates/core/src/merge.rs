//! Combine a nutrition export with an ordering-system export.
//!
//! The ordering export (an array of categories with `menuItems`) carries names,
//! prices and images. The nutrition export (an object keyed by category, each
//! with `items` that have `title` and `calories`) carries calories. Category and
//! dish names differ between the two, so a [`MergeMap`] translates them.
//!
//! ```toml
//! [categories]
//! "Appetizers" = "APPETIZERS 2025"
//!
//! [dishes.Appetizers]
//! "Spinach Artichoke Dip" = "Spinach-Artichoke Dip"
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// Value written when an item has no price or no matching calories
pub const MISSING_VALUE: &str = "N/A";

/// Order-export names → nutrition-export names
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MergeMap {
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
    /// Per order category: order dish name → nutrition dish title
    #[serde(default)]
    pub dishes: BTreeMap<String, BTreeMap<String, String>>,
}

pub fn parse_merge_map_str(content: &str) -> Result<MergeMap> {
    Ok(toml::from_str(content)?)
}

#[derive(Debug)]
pub struct MergeOutcome {
    /// Category-keyed menu, ready to drop into the data directory
    pub menu: Value,
    /// Sorted, de-duplicated descriptions of what could not be matched
    pub unmatched: Vec<String>,
}

struct SourceDish<'a> {
    title: &'a str,
    normalized: String,
    calories: &'a Value,
}

/// Lowercased name with every `(...)` group removed
pub fn normalize_dish_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out.to_lowercase().trim().to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Per nutrition category, the dishes that have both a title and calories
fn calorie_lookup(nutrition: &Value) -> Result<BTreeMap<&str, Vec<SourceDish<'_>>>> {
    let categories = nutrition.as_object().ok_or_else(|| {
        Error::InvalidData("nutrition export must be an object keyed by category".to_string())
    })?;

    Ok(categories
        .iter()
        .filter_map(|(name, content)| {
            let items = content.get("items")?.as_array()?;
            let dishes = items
                .iter()
                .filter_map(|item| {
                    let title = item.get("title")?.as_str().filter(|t| !t.is_empty())?;
                    let calories = item.get("calories").filter(|c| is_truthy(c))?;
                    Some(SourceDish {
                        title,
                        normalized: normalize_dish_name(title),
                        calories,
                    })
                })
                .collect();
            Some((name.as_str(), dishes))
        })
        .collect())
}

/// Build a category-keyed menu from `order`, filling calories from `nutrition`.
///
/// Every named order category appears in the output, in export order. A
/// category missing from the map, or absent from the nutrition export, is kept
/// with no items. Dishes are matched first through the map's dish overrides,
/// then by [`normalize_dish_name`].
pub fn merge_calories(nutrition: &Value, order: &Value, map: &MergeMap) -> Result<MergeOutcome> {
    let lookup = calorie_lookup(nutrition)?;
    let order_categories = order.as_array().ok_or_else(|| {
        Error::InvalidData("order export must be an array of categories".to_string())
    })?;

    let mut menu = Map::new();
    let mut unmatched = BTreeSet::new();

    for order_category in order_categories {
        let Some(category_name) = order_category
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
        else {
            continue;
        };
        menu.insert(category_name.to_string(), json!({"items": []}));

        let Some(source_name) = map.categories.get(category_name) else {
            unmatched.insert(format!("category not in map: '{}'", category_name));
            continue;
        };
        let Some(dishes) = lookup.get(source_name.as_str()).filter(|d| !d.is_empty()) else {
            unmatched.insert(format!(
                "category not in nutrition export: '{}'",
                source_name
            ));
            continue;
        };

        let overrides = map.dishes.get(category_name);
        let mut items = Vec::new();

        let order_items = order_category
            .get("menuItems")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for order_item in order_items {
            let Some(item_name) = order_item
                .get("name")
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
            else {
                continue;
            };

            let by_override = overrides
                .and_then(|o| o.get(item_name))
                .and_then(|title| dishes.iter().find(|d| d.title == title.as_str()));
            let normalized = normalize_dish_name(item_name);
            let matched =
                by_override.or_else(|| dishes.iter().find(|d| d.normalized == normalized));

            let calories = match matched {
                Some(dish) => dish.calories.clone(),
                None => {
                    unmatched.insert(format!(
                        "dish not matched: '{}' ('{}' -> '{}')",
                        item_name, category_name, source_name
                    ));
                    Value::from(MISSING_VALUE)
                }
            };

            let price = order_item
                .get("unitPrice")
                .cloned()
                .unwrap_or_else(|| Value::from(MISSING_VALUE));

            items.push(json!({
                "title": item_name,
                "price": price,
                "calories": calories,
                "image_url": order_item.get("imageUrl").cloned().unwrap_or(Value::Null),
                "description": order_item.get("description").cloned().unwrap_or(Value::Null),
            }));
        }

        menu.insert(category_name.to_string(), json!({"items": items}));
    }

    Ok(MergeOutcome {
        menu: Value::Object(menu),
        unmatched: unmatched.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> MergeMap {
        parse_merge_map_str(
            r#"
[categories]
"Appetizers" = "APPETIZERS 2025"
"Desserts" = "DESSERTS 2025"
"Sides" = "SIDES 2025"

[dishes.Appetizers]
"Spinach Artichoke Dip" = "Spinach-Artichoke Dip"
"#,
        )
        .unwrap()
    }

    fn nutrition() -> Value {
        json!({
            "APPETIZERS 2025": {"items": [
                {"title": "Spinach-Artichoke Dip", "calories": "870"},
                {"title": "Lasagna Fritta", "calories": "1030"},
                {"title": "Breadstick", "calories": 0}
            ]},
            "DESSERTS 2025": {"items": [{"title": "Tiramisu (Slice)", "calories": "470"}]}
        })
    }

    fn order() -> Value {
        json!([
            {"name": "Appetizers", "menuItems": [
                {"name": "Spinach Artichoke Dip", "unitPrice": 11.49, "imageUrl": "https://cdn.example.com/dip.png"},
                {"name": "Lasagna Fritta (Shareable)", "unitPrice": 12.99},
                {"name": "Breadstick", "description": "Warm"}
            ]},
            {"name": "Desserts", "menuItems": [{"name": "Tiramisu", "unitPrice": 8.99}]},
            {"name": "Sides", "menuItems": [{"name": "Meatballs"}]},
            {"name": "Catering", "menuItems": [{"name": "Party Pan"}]},
            {"menuItems": [{"name": "Orphan"}]}
        ])
    }

    #[test]
    fn test_normalize_dish_name() {
        assert_eq!(normalize_dish_name("Tiramisu (Slice)"), "tiramisu");
        assert_eq!(
            normalize_dish_name("  Chicken (Grilled) Alfredo (Lunch) "),
            "chicken  alfredo"
        );
        assert_eq!(normalize_dish_name("Soup (unclosed"), "soup (unclosed");
    }

    #[test]
    fn test_merge_fills_calories() {
        let outcome = merge_calories(&nutrition(), &order(), &map()).unwrap();
        let menu = outcome.menu.as_object().unwrap();

        let names: Vec<_> = menu.keys().cloned().collect();
        assert_eq!(names, vec!["Appetizers", "Desserts", "Sides", "Catering"]);

        let apps = menu["Appetizers"]["items"].as_array().unwrap();
        assert_eq!(apps[0]["calories"], "870");
        assert_eq!(apps[0]["price"], 11.49);
        assert_eq!(apps[0]["image_url"], "https://cdn.example.com/dip.png");
        assert_eq!(apps[1]["calories"], "1030");
        assert_eq!(apps[1]["title"], "Lasagna Fritta (Shareable)");
        // zero calories count as missing in the nutrition export
        assert_eq!(apps[2]["calories"], MISSING_VALUE);
        assert_eq!(apps[2]["price"], MISSING_VALUE);
        assert_eq!(apps[2]["description"], "Warm");

        assert_eq!(menu["Desserts"]["items"][0]["calories"], "470");
        assert!(menu["Sides"]["items"].as_array().unwrap().is_empty());
        assert!(menu["Catering"]["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_merge_reports_unmatched() {
        let outcome = merge_calories(&nutrition(), &order(), &map()).unwrap();
        assert_eq!(
            outcome.unmatched,
            vec![
                "category not in map: 'Catering'",
                "category not in nutrition export: 'SIDES 2025'",
                "dish not matched: 'Breadstick' ('Appetizers' -> 'APPETIZERS 2025')",
            ]
        );
    }

    #[test]
    fn test_merge_rejects_wrong_shapes() {
        assert!(merge_calories(&json!([]), &order(), &map()).is_err());
        assert!(merge_calories(&nutrition(), &json!({}), &map()).is_err());
    }
}
