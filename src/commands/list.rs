// src/commands/list.rs

//! List command - show the libraries a catalog can build

use super::load_catalog;
use anyhow::Result;
use std::path::Path;

/// Print every recipe name with its description
pub fn cmd_list(catalog_path: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(catalog_path)?;

    let width = catalog.names().iter().map(|n| n.len()).max().unwrap_or(0);
    println!("Available libraries:");
    for name in catalog.names() {
        let description = catalog
            .get(name)
            .and_then(|r| r.description.as_deref())
            .unwrap_or("");
        println!("  {:<width$}  {}", name, description, width = width);
    }
    Ok(())
}
