// src/recipe/format.rs

//! Recipe format definitions
//!
//! A recipe describes how to fetch and build one native library. Recipes
//! live in a TOML catalog:
//!
//! ```toml
//! [[recipe]]
//! name = "gnump"
//! check = "lib/libgmp.a"
//! url = "https://gmplib.org/download/gmp/gmp-6.1.2.tar.bz2"
//! cmds = [
//!     "./configure --prefix=TARGET --disable-shared --with-pic",
//!     "make -jJOBS",
//!     "make install",
//! ]
//! globs = [["doc/*.info", "share/info/"]]
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the absolute install directory
pub const TARGET_PLACEHOLDER: &str = "TARGET";

/// Placeholder replaced by the parallel job count
pub const JOBS_PLACEHOLDER: &str = "JOBS";

/// A buildable library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique identifier, also the name of the scratch source directory
    pub name: String,

    /// Path relative to the install directory whose presence means the
    /// library is already installed
    pub check: String,

    /// Archive URL, or a git/svn/mercurial repository URL
    pub url: String,

    /// One-line summary shown by `--list`
    #[serde(default)]
    pub description: Option<String>,

    /// Install directory override (defaults to the caller's target)
    #[serde(default)]
    pub tdir: Option<PathBuf>,

    /// Shell command templates run in order inside the source directory
    #[serde(default)]
    pub cmds: Vec<String>,

    /// Post-build copies from the source tree into the install tree
    #[serde(default)]
    pub globs: Vec<GlobCopy>,
}

/// One post-build copy: files matching `pattern` (relative to the source
/// directory) are copied to `dest` (relative to the install directory).
///
/// Written in TOML as a two-element array: `["lib/*.a", "lib/"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct GlobCopy {
    pub pattern: String,
    pub dest: String,
}

impl GlobCopy {
    pub fn new(pattern: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            dest: dest.into(),
        }
    }

    /// A trailing separator marks the destination as a directory
    pub fn dest_is_dir(&self) -> bool {
        self.dest.ends_with('/')
    }
}

impl From<(String, String)> for GlobCopy {
    fn from((pattern, dest): (String, String)) -> Self {
        Self { pattern, dest }
    }
}

impl From<GlobCopy> for (String, String) {
    fn from(glob: GlobCopy) -> Self {
        (glob.pattern, glob.dest)
    }
}

impl Recipe {
    /// Create a recipe with no commands or copies
    pub fn new(name: impl Into<String>, check: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check: check.into(),
            url: url.into(),
            description: None,
            tdir: None,
            cmds: Vec::new(),
            globs: Vec::new(),
        }
    }

    /// Add a command template
    pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmds.push(cmd.into());
        self
    }

    /// Add a post-build copy
    pub fn with_glob(mut self, pattern: impl Into<String>, dest: impl Into<String>) -> Self {
        self.globs.push(GlobCopy::new(pattern, dest));
        self
    }

    /// Override the install directory
    pub fn with_tdir(mut self, tdir: impl Into<PathBuf>) -> Self {
        self.tdir = Some(tdir.into());
        self
    }

    /// Absolute install directory: the recipe's override or `target`
    pub fn install_dir(&self, target: &Path) -> io::Result<PathBuf> {
        std::path::absolute(self.tdir.as_deref().unwrap_or(target))
    }

    /// Scratch source directory under an install directory
    pub fn source_dir(&self, tdir: &Path) -> PathBuf {
        tdir.join("src").join(&self.name)
    }

    /// Sentinel path that marks this recipe as installed
    pub fn check_path(&self, tdir: &Path) -> PathBuf {
        tdir.join(&self.check)
    }

    /// Whether the recipe is already installed under `tdir`
    pub fn is_installed(&self, tdir: &Path) -> bool {
        self.check_path(tdir).exists()
    }

    /// Substitute `TARGET` and `JOBS` in a command template
    pub fn substitute(&self, template: &str, tdir: &Path, jobs: usize) -> String {
        template
            .replace(TARGET_PLACEHOLDER, &tdir.to_string_lossy())
            .replace(JOBS_PLACEHOLDER, &jobs.to_string())
    }

    /// Split `template` into arguments and substitute each one
    ///
    /// Splitting comes first, so the install path always stays a single
    /// argument whatever characters it contains. `None` means the template
    /// has unbalanced quotes or a trailing escape.
    pub fn command_argv(&self, template: &str, tdir: &Path, jobs: usize) -> Option<Vec<String>> {
        let words = shlex::split(template)?;
        Some(
            words
                .iter()
                .map(|word| self.substitute(word, tdir, jobs))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_placeholders() {
        let recipe = Recipe::new("x", "lib/libx.a", "http://example.com/x-1.0.tar.gz")
            .with_cmd("./configure --prefix=TARGET")
            .with_cmd("make -jJOBS install");

        let tdir = Path::new("/tmp/out");
        assert_eq!(
            recipe.substitute(&recipe.cmds[0], tdir, 8),
            "./configure --prefix=/tmp/out"
        );
        assert_eq!(recipe.substitute(&recipe.cmds[1], tdir, 8), "make -j8 install");
    }

    #[test]
    fn test_command_argv_keeps_install_path_whole() {
        let recipe = Recipe::new("x", "lib/libx.a", "u");
        let tdir = Path::new("/tmp/my libs/$HOME");

        let argv = recipe
            .command_argv("./configure --prefix=TARGET CFLAGS='-O2 -fPIC'", tdir, 4)
            .unwrap();
        assert_eq!(
            argv,
            vec![
                "./configure",
                "--prefix=/tmp/my libs/$HOME",
                "CFLAGS=-O2 -fPIC"
            ]
        );

        assert_eq!(recipe.command_argv("make -jJOBS", tdir, 4).unwrap(), vec!["make", "-j4"]);
        assert!(recipe.command_argv("echo \"open", tdir, 4).is_none());
    }

    #[test]
    fn test_install_dir_uses_override() {
        let recipe = Recipe::new("x", "lib/libx.a", "u").with_tdir("/opt/x");
        assert_eq!(
            recipe.install_dir(Path::new("/tmp/out")).unwrap(),
            PathBuf::from("/opt/x")
        );

        let recipe = Recipe::new("x", "lib/libx.a", "u");
        assert_eq!(
            recipe.install_dir(Path::new("/tmp/out")).unwrap(),
            PathBuf::from("/tmp/out")
        );
    }

    #[test]
    fn test_install_dir_is_absolute() {
        let recipe = Recipe::new("x", "lib/libx.a", "u");
        let tdir = recipe.install_dir(Path::new("libs")).unwrap();
        assert!(tdir.is_absolute());
        assert!(tdir.ends_with("libs"));
    }

    #[test]
    fn test_source_and_check_paths() {
        let recipe = Recipe::new("gtest", "lib/libgtest.a", "u");
        let tdir = Path::new("/tmp/out");
        assert_eq!(recipe.source_dir(tdir), PathBuf::from("/tmp/out/src/gtest"));
        assert_eq!(
            recipe.check_path(tdir),
            PathBuf::from("/tmp/out/lib/libgtest.a")
        );
    }

    #[test]
    fn test_glob_copy_from_toml_pair() {
        let recipe: Recipe = toml::from_str(
            r#"
name = "gtest"
check = "lib/libgtest.a"
url = "https://example.com/gtest.tar.gz"
globs = [["lib/*.a", "lib/"], ["README", "share/gtest/README"]]
"#,
        )
        .unwrap();

        assert_eq!(recipe.globs.len(), 2);
        assert_eq!(recipe.globs[0], GlobCopy::new("lib/*.a", "lib/"));
        assert!(recipe.globs[0].dest_is_dir());
        assert!(!recipe.globs[1].dest_is_dir());
        assert!(recipe.cmds.is_empty());
        assert!(recipe.tdir.is_none());
    }
}
