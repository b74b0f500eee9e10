//! Logical folder paths and their Graph drive-root addressing form.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{DriveError, Result};

/// Characters escaped inside a single path segment (everything except RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A normalized absolute path inside a document library.
///
/// The root of the library has no segments and displays as `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    /// The library root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Normalize a caller supplied path.
    ///
    /// `None`, `""` and `"/"` all resolve to the root. Any other path must
    /// begin with `/`; paths that do not are rejected rather than repaired.
    /// Trailing and repeated separators are dropped. `.` and `..` segments
    /// are rejected, since Graph would apply them outside the `root:` address.
    ///
    /// # Examples
    ///
    /// ```
    /// use sharepoint_drive::RemotePath;
    ///
    /// let path = RemotePath::resolve(Some("/Finance/Q1/")).unwrap();
    /// assert_eq!(path.to_string(), "/Finance/Q1");
    /// assert!(RemotePath::resolve(None).unwrap().is_root());
    /// assert!(RemotePath::resolve(Some("Finance")).is_err());
    /// ```
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let raw = match path {
            None => return Ok(Self::root()),
            Some(p) if p.is_empty() => return Ok(Self::root()),
            Some(p) => p,
        };

        if !raw.starts_with('/') {
            return Err(DriveError::InvalidPath(format!(
                "path must begin with '/': {}",
                raw
            )));
        }

        let mut segments = Vec::new();
        for segment in raw.split('/').filter(|segment| !segment.is_empty()) {
            if is_dot_segment(segment) {
                return Err(DriveError::InvalidPath(format!(
                    "relative segment {:?} in path: {}",
                    segment, raw
                )));
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Append a file name to this folder path.
    pub fn join(&self, name: &str) -> Result<Self> {
        if name.is_empty() || name.contains('/') || is_dot_segment(name) {
            return Err(DriveError::InvalidPath(format!(
                "invalid file name: {:?}",
                name
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Drive-root addressing fragment: `root` or `root:/A/B%20C:`.
    pub fn to_graph_segment(&self) -> String {
        if self.is_root() {
            return "root".to_string();
        }
        let encoded: Vec<String> = self
            .segments
            .iter()
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect();
        format!("root:/{}:", encoded.join("/"))
    }
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_forms() {
        assert_eq!(RemotePath::resolve(None).unwrap(), RemotePath::root());
        assert_eq!(RemotePath::resolve(Some("")).unwrap(), RemotePath::root());
        assert_eq!(RemotePath::resolve(Some("/")).unwrap(), RemotePath::root());
        assert_eq!(RemotePath::resolve(Some("//")).unwrap(), RemotePath::root());
        assert_eq!(RemotePath::root().to_string(), "/");
    }

    #[test]
    fn test_normalization() {
        let path = RemotePath::resolve(Some("/Finance//Q1/")).unwrap();
        assert_eq!(path.to_string(), "/Finance/Q1");
        assert_eq!(path.name(), Some("Q1"));
    }

    #[test]
    fn test_missing_leading_separator_is_rejected() {
        let err = RemotePath::resolve(Some("Finance/Q1")).unwrap_err();
        assert!(matches!(err, DriveError::InvalidPath(_)));
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        for input in ["/..", "/../Secret", "/Finance/../HR", "/./Finance", "/Finance/.", "/a/../../b"] {
            let err = RemotePath::resolve(Some(input)).unwrap_err();
            assert!(matches!(err, DriveError::InvalidPath(_)), "input {:?}", input);
        }
        // Dots inside a name are ordinary characters.
        let path = RemotePath::resolve(Some("/.hidden/v1..2/...")).unwrap();
        assert_eq!(path.to_graph_segment(), "root:/.hidden/v1..2/...:");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for input in ["/", "/a", "/a/b/", "//a//b", "/Shared Documents/Q1 Report"] {
            let once = RemotePath::resolve(Some(input)).unwrap();
            let twice = RemotePath::resolve(Some(&once.to_string())).unwrap();
            assert_eq!(once, twice, "input {:?}", input);
        }
    }

    #[test]
    fn test_graph_segment() {
        assert_eq!(RemotePath::root().to_graph_segment(), "root");
        let path = RemotePath::resolve(Some("/Shared Docs/Q1#2/a-b_c.d~e")).unwrap();
        assert_eq!(
            path.to_graph_segment(),
            "root:/Shared%20Docs/Q1%232/a-b_c.d~e:"
        );
    }

    #[test]
    fn test_join() {
        let folder = RemotePath::resolve(Some("/Finance")).unwrap();
        let file = folder.join("summary.pdf").unwrap();
        assert_eq!(file.to_string(), "/Finance/summary.pdf");
        assert_eq!(RemotePath::root().join("a.txt").unwrap().to_string(), "/a.txt");

        assert!(folder.join("").is_err());
        assert!(folder.join("a/b.txt").is_err());
        assert!(folder.join("..").is_err());
        assert!(folder.join(".").is_err());
        assert!(folder.join("..summary.pdf").is_ok());
    }
}
