use std::env;
use std::path::{Path, PathBuf};

/// Looks up an environment variable by name.
pub type VarLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Mutable shell state that outlives a single input line.
///
/// The working directory lives here instead of in the process: `cd` only
/// updates `cwd`, and spawned commands and redirection targets are resolved
/// against it.
pub struct Session {
    pub cwd: PathBuf,
    pub last_status: i32,
    pub trace: bool,
    pub lookup_var: VarLookup,
}

impl Session {
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            last_status: 0,
            trace: false,
            lookup_var: Box::new(|name| env::var(name).ok()),
        }
    }

    /// Session rooted at the process working directory, falling back to `/`.
    pub fn from_env() -> Self {
        Self::new(env::current_dir().unwrap_or_else(|_| "/".into()))
    }

    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.lookup_var = Box::new(lookup);
        self
    }

    pub fn var(&self, name: &str) -> Option<String> {
        (self.lookup_var)(name)
    }

    /// Resolve a user-supplied path against the session directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Resolve a program name for spawning. Bare names are left for `PATH`
    /// lookup; names containing a slash are relative to the session directory.
    pub fn resolve_program(&self, program: &str) -> PathBuf {
        if program.contains('/') {
            self.resolve(program)
        } else {
            PathBuf::from(program)
        }
    }
}
