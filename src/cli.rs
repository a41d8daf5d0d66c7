// src/cli.rs
//! CLI definitions for getlibs
//!
//! The command implementations live in the `commands` module.

use clap::Parser;
use getlibs::config::DEFAULT_LIBRARY_DIR;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "getlibs")]
#[command(version)]
#[command(
    about = "Fetch and build native libraries into a local prefix",
    long_about = None
)]
pub struct Cli {
    /// Libraries to build (see --list)
    #[arg(required_unless_present = "list")]
    pub libs: Vec<String>,

    /// Install prefix; libraries land in <ldir>/lib, <ldir>/include, ...
    #[arg(long, default_value = DEFAULT_LIBRARY_DIR)]
    pub ldir: PathBuf,

    /// Number of libraries built at once (default: CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Abort a library on its first failing build command
    #[arg(long)]
    pub strict: bool,

    /// Recipe catalog to use instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Directory for downloaded archives
    #[arg(long)]
    pub scratch: Option<PathBuf>,

    /// List the available libraries and exit
    #[arg(long)]
    pub list: bool,

    /// Log build output and other debug detail
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_libs_and_flags() {
        let cli = Cli::try_parse_from([
            "getlibs", "--ldir", "/opt/deps", "-j", "2", "--strict", "gtest", "boost",
        ])
        .unwrap();
        assert_eq!(cli.libs, vec!["gtest", "boost"]);
        assert_eq!(cli.ldir, PathBuf::from("/opt/deps"));
        assert_eq!(cli.jobs, Some(2));
        assert!(cli.strict);
        assert!(!cli.list);
    }

    #[test]
    fn test_default_ldir() {
        let cli = Cli::try_parse_from(["getlibs", "jansson"]).unwrap();
        assert_eq!(cli.ldir, PathBuf::from("libs"));
        assert!(cli.catalog.is_none());
    }

    #[test]
    fn test_libs_required_without_list() {
        assert!(Cli::try_parse_from(["getlibs"]).is_err());
        let cli = Cli::try_parse_from(["getlibs", "--list"]).unwrap();
        assert!(cli.list);
        assert!(cli.libs.is_empty());
    }
}
