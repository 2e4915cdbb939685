//! Mapping request paths onto the served root.

use std::path::{Path, PathBuf};

/// Why a request path could not be mapped under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// `..` segments would leave the root
    Escapes,
    /// Not valid UTF-8 after decoding, or contains separators or NUL
    Malformed,
}

/// Percent-decode `request_path`, normalize `.` and `..` segments, and join
/// the result onto `root`.
///
/// `..` is allowed as long as it stays inside the root, so `/a/../b.txt`
/// maps to `root/b.txt` and `/../b.txt` is rejected.
pub fn resolve(root: &Path, request_path: &str) -> Result<PathBuf, ResolveError> {
    let mut segments: Vec<String> = Vec::new();

    for raw in request_path.split('/') {
        let segment = urlencoding::decode(raw).map_err(|_| ResolveError::Malformed)?;
        match &*segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ResolveError::Escapes);
                }
            }
            s if s.contains(['/', '\\', '\0']) => return Err(ResolveError::Malformed),
            s => segments.push(s.to_string()),
        }
    }

    let mut resolved = root.to_path_buf();
    resolved.extend(segments);
    Ok(resolved)
}
