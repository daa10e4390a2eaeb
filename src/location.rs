use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};

/// Where a snapshot was created: the file and line of the `snap(..)` call.
///
/// `file` is resolved to a path that exists on disk when possible. `column` is the 1-based
/// character column reported by the compiler and is only used to tell apart several calls on
/// one line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Capture the location of the caller.
    ///
    /// The boolean is `false` when the compiled-in path does not point at a readable file
    /// from this process (for example a test binary run away from its sources). Such a
    /// location must never be rewritten.
    #[track_caller]
    pub fn capture() -> (Self, bool) {
        Self::from_caller(Location::caller())
    }

    pub fn from_caller(caller: &Location<'_>) -> (Self, bool) {
        Self::resolve(caller.file(), caller.line(), caller.column())
    }

    /// Resolve an explicit `file:line:column` triple against the running process.
    pub fn resolve(file: impl AsRef<Path>, line: u32, column: u32) -> (Self, bool) {
        let file = file.as_ref();
        match locate_file(file) {
            Some(resolved) => (
                Self {
                    file: resolved,
                    line,
                    column,
                },
                true,
            ),
            None => (
                Self {
                    file: file.to_path_buf(),
                    line,
                    column,
                },
                false,
            ),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Find `file` on disk.
///
/// rustc records paths relative to the directory it was invoked from, which is the workspace
/// root, while test binaries run from their package directory. Walk up from the package
/// directory until the relative path exists.
fn locate_file(file: &Path) -> Option<PathBuf> {
    if file.is_absolute() {
        return file.is_file().then(|| file.to_path_buf());
    }

    let start = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())?;

    start
        .ancestors()
        .map(|dir| dir.join(file))
        .find(|candidate| candidate.is_file())
}
