use anyhow::{Context, Result};

use super::types::Index;

pub fn parse_index(contents: &str) -> Result<Index> {
    if contents.trim().is_empty() {
        return Ok(Index::new());
    }
    serde_json::from_str(contents).context("failed to parse index")
}

pub fn render_index(index: &Index) -> Result<String> {
    let mut rendered = serde_json::to_string_pretty(index).context("failed to render index")?;
    rendered.push('\n');
    Ok(rendered)
}
