// src/fetch/vcs.rs

//! Version-control checkouts

use crate::error::{Error, Result};
use crate::process::ProcessRunner;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

/// Version-control client used for a repository URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VcsKind {
    /// `git clone --depth 1`
    Git,
    /// `svn checkout`
    Svn,
    /// `hg clone`
    Mercurial,
}

impl VcsKind {
    /// Pick a client from the URL text
    ///
    /// `git` anywhere in the URL selects git (this catches github.com
    /// URLs without a `.git` suffix), an `svn` prefix selects subversion,
    /// and anything else is cloned with mercurial.
    pub fn classify(url: &str) -> Self {
        if url.contains("git") {
            Self::Git
        } else if url.starts_with("svn") {
            Self::Svn
        } else {
            Self::Mercurial
        }
    }

    /// Command that checks `url` out into `dest`
    pub fn checkout_command(&self, url: &str, dest: &Path) -> Command {
        let mut cmd = match self {
            Self::Git => {
                let mut cmd = Command::new("git");
                cmd.args(["clone", "--depth", "1"]);
                cmd
            }
            Self::Svn => {
                let mut cmd = Command::new("svn");
                cmd.arg("checkout");
                cmd
            }
            Self::Mercurial => {
                let mut cmd = Command::new("hg");
                cmd.arg("clone");
                cmd
            }
        };
        cmd.arg(url).arg(dest);
        cmd
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Svn => "svn",
            Self::Mercurial => "hg",
        }
    }
}

/// Check out `url` into `dest` unless `dest` already exists
pub fn checkout(url: &str, dest: &Path, runner: &ProcessRunner<'_>) -> Result<()> {
    if dest.exists() {
        debug!("{} already exists, skipping checkout", dest.display());
        return Ok(());
    }

    let kind = VcsKind::classify(url);
    info!("Checking out {} with {}", url, kind.as_str());

    let status = runner.run(kind.as_str(), kind.checkout_command(url, dest))?;
    if !status.success() {
        warn!(
            "{} exited with {:?} while checking out {}",
            kind.as_str(),
            status.code(),
            url
        );
    }

    if !dest.exists() {
        return Err(Error::FetchError(format!(
            "{} checkout of {} produced no source at {}",
            kind.as_str(),
            url,
            dest.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_classify() {
        assert_eq!(VcsKind::classify("git://host/repo.git"), VcsKind::Git);
        assert_eq!(
            VcsKind::classify("https://github.com/libuv/libuv"),
            VcsKind::Git
        );
        assert_eq!(
            VcsKind::classify("svn://svn.code.sf.net/p/cunit/code/trunk"),
            VcsKind::Svn
        );
        assert_eq!(
            VcsKind::classify("http://hg.libsdl.org/SDL"),
            VcsKind::Mercurial
        );
        // svn only counts at the front of the URL
        assert_eq!(
            VcsKind::classify("http://example.com/svn/trunk"),
            VcsKind::Mercurial
        );
    }

    #[test]
    fn test_git_uses_shallow_clone() {
        let cmd = VcsKind::Git.checkout_command("git://host/repo.git", Path::new("/tmp/dest"));
        assert_eq!(cmd.get_program(), "git");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(
            args,
            vec!["clone", "--depth", "1", "git://host/repo.git", "/tmp/dest"]
        );
    }

    #[test]
    fn test_svn_and_hg_commands() {
        let cmd = VcsKind::Svn.checkout_command("svn://host/trunk", Path::new("/d"));
        assert_eq!(cmd.get_program(), "svn");
        assert_eq!(cmd.get_args().next().unwrap(), "checkout");

        let cmd = VcsKind::Mercurial.checkout_command("http://hg.host/repo", Path::new("/d"));
        assert_eq!(cmd.get_program(), "hg");
        assert_eq!(cmd.get_args().next().unwrap(), "clone");
    }

    #[test]
    fn test_existing_dest_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let token = CancelToken::new();
        token.cancel();
        let runner = ProcessRunner::new(&token, Duration::from_millis(20));

        // A cancelled runner would fail if anything were spawned.
        checkout("git://host/repo.git", temp.path(), &runner).unwrap();
    }
}
