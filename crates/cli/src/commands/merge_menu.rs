use anyhow::{Context, Result};
use menusite_core::merge::{MergeOutcome, merge_calories, parse_merge_map_str};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Merge calories from a nutrition export into an ordering export
pub async fn run(
    nutrition: PathBuf,
    order: PathBuf,
    map: PathBuf,
    output: PathBuf,
) -> Result<()> {
    println!("🍽  Merging menu exports...");
    println!("   Nutrition: {}", nutrition.display());
    println!("   Order:     {}", order.display());
    println!("   Map:       {}", map.display());
    println!();

    let outcome = merge_files(&nutrition, &order, &map, &output)?;

    if !outcome.unmatched.is_empty() {
        println!("⚠️  Not matched:");
        for entry in &outcome.unmatched {
            println!("   - {}", entry);
        }
        println!();
    }

    let categories = outcome.menu.as_object().map_or(0, |m| m.len());
    println!("✅ Wrote {} categories to {}", categories, output.display());
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

pub fn merge_files(
    nutrition: &Path,
    order: &Path,
    map: &Path,
    output: &Path,
) -> Result<MergeOutcome> {
    let map_text =
        fs::read_to_string(map).with_context(|| format!("Failed to read {}", map.display()))?;
    let map = parse_merge_map_str(&map_text).context("Invalid merge map")?;

    let outcome = merge_calories(&read_json(nutrition)?, &read_json(order)?, &map)?;
    for entry in &outcome.unmatched {
        log::debug!("unmatched: {}", entry);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&outcome.menu)?;
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use menusite_core::data::parse_data_source;
    use tempfile::TempDir;

    #[test]
    fn test_merge_files_writes_loadable_menu() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(
            root.join("nutrition.json"),
            r#"{"DESSERTS 2025": {"items": [{"title": "Tiramisu", "calories": "470"}]}}"#,
        )
        .unwrap();
        fs::write(
            root.join("order.json"),
            r#"[{"name": "Desserts", "menuItems": [{"name": "Tiramisu", "unitPrice": 8.99}]}]"#,
        )
        .unwrap();
        fs::write(root.join("map.toml"), "[categories]\nDesserts = \"DESSERTS 2025\"\n").unwrap();

        let output = root.join("data/menu.json");
        let outcome = merge_files(
            &root.join("nutrition.json"),
            &root.join("order.json"),
            &root.join("map.toml"),
            &output,
        )
        .unwrap();
        assert!(outcome.unmatched.is_empty());

        let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let categories = parse_data_source("menu.json", written).unwrap();
        let tiramisu = &categories["Desserts"].items[0];
        assert_eq!(tiramisu.name, "Tiramisu");
        assert_eq!(
            tiramisu.calories,
            Some(menusite_core::NumberOrText::Text("470".to_string()))
        );
    }

    #[test]
    fn test_merge_files_reports_bad_map() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("map.toml"), "categories = 3").unwrap();
        let result = merge_files(
            &dir.path().join("nutrition.json"),
            &dir.path().join("order.json"),
            &dir.path().join("map.toml"),
            &dir.path().join("out.json"),
        );
        assert!(result.unwrap_err().to_string().contains("Invalid merge map"));
    }
}
