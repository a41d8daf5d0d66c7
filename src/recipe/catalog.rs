// src/recipe/catalog.rs

//! The library catalog: every recipe the tool knows how to build

use crate::error::{Error, Result};
use crate::hooks::HostFileHook;
use crate::recipe::format::Recipe;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Catalog shipped inside the binary
const BUILTIN_CATALOG: &str = include_str!("../../catalog/libs.toml");

/// A set of recipes plus the host-file hooks that accompany them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "recipe")]
    recipes: Vec<Recipe>,

    #[serde(default)]
    hooks: Vec<HostFileHook>,
}

impl Catalog {
    /// Parse a catalog from TOML and validate it
    pub fn parse(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)
            .map_err(|e| Error::CatalogError(format!("Invalid catalog: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading catalog from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::CatalogError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// The catalog embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Build a catalog from recipes directly
    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self> {
        let catalog = Self {
            recipes,
            hooks: Vec::new(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for recipe in &self.recipes {
            if recipe.name.is_empty() {
                return Err(Error::CatalogError("Recipe name cannot be empty".to_string()));
            }
            if recipe.check.is_empty() {
                return Err(Error::CatalogError(format!(
                    "Recipe {} has an empty check path",
                    recipe.name
                )));
            }
            if recipe.url.is_empty() {
                return Err(Error::CatalogError(format!(
                    "Recipe {} has an empty url",
                    recipe.name
                )));
            }
            if !seen.insert(recipe.name.as_str()) {
                return Err(Error::CatalogError(format!(
                    "Duplicate recipe name: {}",
                    recipe.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a recipe by name
    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    /// All recipes in catalog order
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Recipe names sorted case-insensitively
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.recipes.iter().map(|r| r.name.as_str()).collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    pub fn hooks(&self) -> &[HostFileHook] {
        &self.hooks
    }

    /// Resolve requested names to recipes
    ///
    /// Every name is checked before anything is returned, so an invalid
    /// selection never starts any work. Repeated names are built once.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Recipe>> {
        let mut selected: Vec<Recipe> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let recipe = self.get(name).ok_or_else(|| Error::UnknownRecipe {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;
            if !selected.iter().any(|r| r.name == recipe.name) {
                selected.push(recipe.clone());
            }
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        let names = catalog.names();
        for expected in [
            "argtable", "boost", "cppunit", "cunit", "gnump", "gtest", "jansson", "jsoncpp",
            "jsonrpc", "libuv", "libxml", "SDL", "SDL2",
        ] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
        assert_eq!(names.len(), 13);
    }

    #[test]
    fn test_builtin_gtest_globs() {
        let catalog = Catalog::builtin().unwrap();
        let gtest = catalog.get("gtest").unwrap();
        assert_eq!(gtest.check, "lib/libgtest.a");
        assert_eq!(gtest.globs.len(), 6);
        assert_eq!(gtest.globs[5].pattern, "lib/*.a");
        assert_eq!(gtest.globs[5].dest, "lib/");
    }

    #[test]
    fn test_builtin_boost_hook() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.hooks().len(), 1);
        assert!(catalog.hooks()[0].applies_to(["boost"]));
    }

    #[test]
    fn test_names_sorted_case_insensitively() {
        let catalog = Catalog::from_recipes(vec![
            Recipe::new("zlib", "lib/libz.a", "u"),
            Recipe::new("SDL", "lib/libSDL.a", "u"),
            Recipe::new("boost", "lib/libboost.a", "u"),
        ])
        .unwrap();
        assert_eq!(catalog.names(), vec!["boost", "SDL", "zlib"]);
    }

    #[test]
    fn test_select_unknown_name() {
        let catalog = Catalog::builtin().unwrap();
        let err = catalog.select(&["gtest", "nosuchlib"]).unwrap_err();
        match err {
            Error::UnknownRecipe { name, available } => {
                assert_eq!(name, "nosuchlib");
                assert!(available.contains("gtest"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_deduplicates() {
        let catalog = Catalog::builtin().unwrap();
        let selected = catalog.select(&["gtest", "boost", "gtest"]).unwrap();
        let names: Vec<_> = selected.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["gtest", "boost"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Catalog::from_recipes(vec![
            Recipe::new("x", "lib/libx.a", "u"),
            Recipe::new("x", "lib/libx.so", "u"),
        ]);
        assert!(matches!(result, Err(Error::CatalogError(_))));
    }

    #[test]
    fn test_missing_required_field() {
        let content = r#"
[[recipe]]
name = "x"
url = "http://example.com/x.tar.gz"
"#;
        assert!(Catalog::parse(content).is_err());
    }

    #[test]
    fn test_empty_check_rejected() {
        let content = r#"
[[recipe]]
name = "x"
check = ""
url = "http://example.com/x.tar.gz"
"#;
        assert!(matches!(
            Catalog::parse(content),
            Err(Error::CatalogError(_))
        ));
    }
}
