use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use onem2m_notebook::render::{self, Renderer};
use onem2m_notebook::xpath::find_xpath;

/// Print the element at `path` in a JSON file. Returns whether it exists.
pub fn execute(file: &Path, path: &str, theme: &str) -> Result<bool> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let found = find_xpath(&document, path, Value::Null);
    if found.is_null() {
        render::print_failure(&format!("Nothing found at '{}'", path));
        return Ok(false);
    }
    Renderer::new(theme).json(&found, false)?;
    Ok(true)
}
