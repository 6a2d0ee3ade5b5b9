use crate::document::Document;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save(path: &str, doc: &Document) -> Result<()> {
    let data = serde_json::to_string_pretty(doc)?;
    fs::write(path, data).with_context(|| format!("Failed to write to file: {}", path))?;
    Ok(())
}

pub fn load(path: &str) -> Result<Document> {
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))?;
    let doc: Document = serde_json::from_str(&data)?;

    // Reject structurally damaged documents before handing them out
    doc.check()?;

    Ok(doc)
}

pub fn exists(path: &str) -> bool {
    Path::new(path).exists()
}
