// src/build/dirstack.rs

//! Per-job working directory stack
//!
//! A pushd/popd analog that never calls `chdir`. Builds run concurrently
//! on threads that share one process-wide working directory, so each job
//! keeps its own stack and hands the current entry to every command it
//! spawns via [`Command::current_dir`].

use std::ffi::OsStr;
use std::io;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DirStack {
    current: PathBuf,
    previous: Vec<PathBuf>,
}

impl DirStack {
    /// Start at the process working directory
    pub fn new() -> io::Result<Self> {
        Ok(Self::at(std::env::current_dir()?))
    }

    /// Start at `dir`
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            current: dir.into(),
            previous: Vec::new(),
        }
    }

    /// The directory commands run in
    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Number of pushes not yet popped
    pub fn depth(&self) -> usize {
        self.previous.len()
    }

    /// Make `dir` current, remembering the previous directory
    ///
    /// Relative paths resolve against the current directory. Fails if the
    /// target is not a directory, leaving the stack unchanged.
    pub fn push(&mut self, dir: impl AsRef<Path>) -> io::Result<()> {
        let next = self.current.join(dir.as_ref());
        if !next.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", next.display()),
            ));
        }
        debug!("{} >>> {}", self.current.display(), next.display());
        let prev = std::mem::replace(&mut self.current, next);
        self.previous.push(prev);
        Ok(())
    }

    /// Return to the most recently pushed-from directory
    pub fn pop(&mut self) -> Option<PathBuf> {
        let prev = self.previous.pop()?;
        debug!(">>> {}", prev.display());
        Some(std::mem::replace(&mut self.current, prev))
    }

    /// Push `dir` for the lifetime of the returned guard
    pub fn scope(&mut self, dir: impl AsRef<Path>) -> io::Result<DirScope<'_>> {
        self.push(dir)?;
        Ok(DirScope { stack: self })
    }

    /// A command that will run in the current directory
    pub fn command(&self, program: impl AsRef<OsStr>) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(&self.current);
        cmd
    }
}

/// Pops its directory when dropped, on every exit path
#[derive(Debug)]
pub struct DirScope<'a> {
    stack: &'a mut DirStack,
}

impl Deref for DirScope<'_> {
    type Target = DirStack;

    fn deref(&self) -> &DirStack {
        &*self.stack
    }
}

impl DerefMut for DirScope<'_> {
    fn deref_mut(&mut self) -> &mut DirStack {
        &mut *self.stack
    }
}

impl Drop for DirScope<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_push_pop_restores_previous() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("a/b")).unwrap();

        let mut stack = DirStack::at(temp.path());
        stack.push("a").unwrap();
        assert_eq!(stack.current(), temp.path().join("a"));
        stack.push("b").unwrap();
        assert_eq!(stack.current(), temp.path().join("a/b"));
        assert_eq!(stack.depth(), 2);

        stack.pop();
        assert_eq!(stack.current(), temp.path().join("a"));
        stack.pop();
        assert_eq!(stack.current(), temp.path());
        assert_eq!(stack.depth(), 0);
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_push_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let mut stack = DirStack::at(temp.path());
        assert!(stack.push("missing").is_err());
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current(), temp.path());
    }

    #[test]
    fn test_scope_pops_on_drop() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("src")).unwrap();

        let mut stack = DirStack::at(temp.path());
        {
            let scope = stack.scope(temp.path().join("src")).unwrap();
            assert_eq!(scope.depth(), 1);
            let cmd = scope.command("pwd");
            assert_eq!(cmd.get_current_dir(), Some(temp.path().join("src").as_path()));
        }
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current(), temp.path());
    }

    #[test]
    fn test_process_cwd_untouched() {
        let before = std::env::current_dir().unwrap();
        let temp = TempDir::new().unwrap();
        let mut stack = DirStack::new().unwrap();
        stack.push(temp.path()).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
