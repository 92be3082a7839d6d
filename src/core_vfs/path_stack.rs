use crate::constants::{CURRENT_DIR, PARENT_DIR, PATH_SEPARATOR};
use crate::core_error::{SessionError, SessionResult};
use log::{debug, trace};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What a single `cd` argument asks the stack to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Stay,
    Up,
    Down(String),
}

impl PathStep {
    /// Turns a client-supplied name into a step. This is the only place
    /// where `.` and `..` are interpreted.
    pub fn parse(name: &str) -> SessionResult<PathStep> {
        let name = validate_name(name)?;
        Ok(match name {
            CURRENT_DIR => PathStep::Stay,
            PARENT_DIR => PathStep::Up,
            other => PathStep::Down(other.to_string()),
        })
    }
}

/// Rejects empty names and names containing a path separator.
pub fn validate_name(name: &str) -> SessionResult<&str> {
    if name.is_empty() || name.contains(PATH_SEPARATOR) {
        return Err(SessionError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Like [`validate_name`], but also refuses the `.`/`..` aliases, which never
/// name a regular file below the current directory.
pub fn validate_file_name(name: &str) -> SessionResult<&str> {
    match validate_name(name)? {
        CURRENT_DIR | PARENT_DIR => Err(SessionError::InvalidName(name.to_string())),
        name => Ok(name),
    }
}

/// Logical working directory of a session, kept as a stack of segments
/// below the confinement root.
///
/// Every segment is a plain name, so the resolved path can never climb
/// above the root: the only way up is [`PathStack::pop`], which refuses to
/// run on an empty stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStack {
    segments: Vec<String>,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Applies a `cd` argument: `.` is a no-op, `..` pops, anything else is
    /// descended into after checking the target directory under `root`.
    /// The stack is untouched on failure.
    pub fn push(&mut self, root: &Path, name: &str) -> SessionResult<()> {
        match PathStep::parse(name)? {
            PathStep::Stay => {
                trace!("cd '.' leaves the directory unchanged");
                Ok(())
            }
            PathStep::Up => self.pop(),
            PathStep::Down(segment) => self.descend(root, segment),
        }
    }

    fn descend(&mut self, root: &Path, name: String) -> SessionResult<()> {
        let candidate = self.resolve(root).join(&name);
        let metadata = match std::fs::metadata(&candidate) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SessionError::NotFound(candidate));
            }
            Err(e) => return Err(SessionError::Io(e)),
        };
        if !metadata.is_dir() {
            return Err(SessionError::NotADirectory(candidate));
        }

        debug!("Entering directory {:?}", candidate);
        self.segments.push(name);
        Ok(())
    }

    pub fn pop(&mut self) -> SessionResult<()> {
        match self.segments.pop() {
            Some(segment) => {
                debug!("Leaving directory {:?}", segment);
                Ok(())
            }
            None => Err(SessionError::RootBoundary),
        }
    }

    /// `/a/b/` style path relative to the root; `/` when at the root.
    pub fn current_relative_path(&self) -> String {
        let mut path = String::from(PATH_SEPARATOR);
        for segment in &self.segments {
            path.push_str(segment);
            path.push(PATH_SEPARATOR);
        }
        path
    }

    pub fn resolve(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }
}
