//! Tests for SharePoint site URL parsing.

use sharepoint_drive::url_parser::parse_site_url;
use sharepoint_drive::DriveError;

mod site_urls {
    use super::*;

    #[test]
    fn sites_url() {
        let loc = parse_site_url("https://contoso.sharepoint.com/sites/Finance").unwrap();
        assert_eq!(loc.tenant, "contoso");
        assert_eq!(loc.site, "Finance");
        assert!(loc.library.is_none());
        assert!(loc.path.is_none());
    }

    #[test]
    fn teams_url() {
        let loc = parse_site_url("https://contoso.sharepoint.com/teams/Engineering").unwrap();
        assert_eq!(loc.site, "Engineering");
    }

    #[test]
    fn http_scheme() {
        assert!(parse_site_url("http://contoso.sharepoint.com/sites/Finance").is_ok());
    }

    #[test]
    fn hyphenated_tenant() {
        let loc = parse_site_url("https://contoso-eu.sharepoint.com/sites/Finance").unwrap();
        assert_eq!(loc.tenant, "contoso-eu");
    }

    #[test]
    fn encoded_site_name() {
        let loc = parse_site_url("https://contoso.sharepoint.com/sites/Team%20Site").unwrap();
        assert_eq!(loc.site, "Team Site");
    }
}

mod library_and_path {
    use super::*;

    #[test]
    fn library_only() {
        let loc =
            parse_site_url("https://contoso.sharepoint.com/sites/Finance/Shared%20Documents")
                .unwrap();
        assert_eq!(loc.library.as_deref(), Some("Shared Documents"));
        assert!(loc.path.is_none());
    }

    #[test]
    fn nested_path() {
        let loc = parse_site_url(
            "https://contoso.sharepoint.com/sites/Finance/Shared%20Documents/Reports/2024/Q1/",
        )
        .unwrap();
        assert_eq!(loc.path.as_deref(), Some("/Reports/2024/Q1"));
    }

    #[test]
    fn query_and_fragment_ignored() {
        let loc = parse_site_url(
            "https://contoso.sharepoint.com/sites/Finance/Archive/Old?csf=1&web=1#top",
        )
        .unwrap();
        assert_eq!(loc.library.as_deref(), Some("Archive"));
        assert_eq!(loc.path.as_deref(), Some("/Old"));
    }
}

mod invalid_inputs {
    use super::*;

    #[test]
    fn empty_string() {
        assert!(matches!(parse_site_url(""), Err(DriveError::InvalidUrl(_))));
    }

    #[test]
    fn other_host() {
        assert!(parse_site_url("https://example.com/sites/Finance").is_err());
        assert!(parse_site_url("https://contoso.sharepoint.com.evil.com/sites/x").is_err());
    }

    #[test]
    fn missing_site() {
        assert!(parse_site_url("https://contoso.sharepoint.com/").is_err());
        assert!(parse_site_url("https://contoso.sharepoint.com/sites/").is_err());
        assert!(parse_site_url("https://contoso.sharepoint.com/Shared%20Documents").is_err());
    }
}
