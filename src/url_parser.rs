//! Parser for SharePoint site URLs copied from a browser.

use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// `https://<tenant>.sharepoint.com/sites/<site>[/<library>[/<path...>]]`
static SITE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([a-zA-Z0-9-]+)\.sharepoint\.com/(?:sites|teams)/([^/?#]+)(/[^?#]*)?")
        .expect("Invalid site URL regex")
});

/// Location pointed at by a SharePoint URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLocation {
    pub tenant: String,
    pub site: String,
    /// Document library segment as it appears in the URL (e.g. `Shared Documents`).
    pub library: Option<String>,
    /// Folder path inside the library, beginning with `/`.
    pub path: Option<String>,
}

/// Split a SharePoint URL into tenant, site, library and folder path.
///
/// # Examples
///
/// ```
/// use sharepoint_drive::url_parser::parse_site_url;
///
/// let loc = parse_site_url(
///     "https://contoso.sharepoint.com/sites/Finance/Shared%20Documents/Reports/2024",
/// )
/// .unwrap();
/// assert_eq!(loc.tenant, "contoso");
/// assert_eq!(loc.site, "Finance");
/// assert_eq!(loc.library.as_deref(), Some("Shared Documents"));
/// assert_eq!(loc.path.as_deref(), Some("/Reports/2024"));
/// ```
pub fn parse_site_url(url: &str) -> Result<SiteLocation> {
    let trimmed = url.trim();
    let captures = SITE_URL_REGEX
        .captures(trimmed)
        .ok_or_else(|| DriveError::InvalidUrl(url.to_string()))?;

    let tenant = captures[1].to_lowercase();
    let site = decode(&captures[2]);

    let mut segments = captures
        .get(3)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(decode);

    let library = segments.next();
    let rest: Vec<String> = segments.collect();
    let path = if rest.is_empty() {
        None
    } else {
        Some(format!("/{}", rest.join("/")))
    };

    Ok(SiteLocation {
        tenant,
        site,
        library,
        path,
    })
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_only() {
        let loc = parse_site_url("https://contoso.sharepoint.com/sites/Finance").unwrap();
        assert_eq!(loc.tenant, "contoso");
        assert_eq!(loc.site, "Finance");
        assert_eq!(loc.library, None);
        assert_eq!(loc.path, None);
    }

    #[test]
    fn test_teams_site_with_trailing_slash() {
        let loc = parse_site_url("https://Contoso.sharepoint.com/teams/Ops/").unwrap();
        assert_eq!(loc.tenant, "contoso");
        assert_eq!(loc.site, "Ops");
        assert_eq!(loc.library, None);
    }

    #[test]
    fn test_library_and_path() {
        let loc = parse_site_url(
            "https://contoso.sharepoint.com/sites/Finance/Shared%20Documents/Q1%20Reports?web=1",
        )
        .unwrap();
        assert_eq!(loc.library.as_deref(), Some("Shared Documents"));
        assert_eq!(loc.path.as_deref(), Some("/Q1 Reports"));
    }

    #[test]
    fn test_with_whitespace() {
        assert!(parse_site_url("  https://contoso.sharepoint.com/sites/Finance  ").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        assert!(parse_site_url("https://example.com/sites/Finance").is_err());
        assert!(parse_site_url("https://contoso.sharepoint.com/").is_err());
        assert!(parse_site_url("").is_err());
    }
}
