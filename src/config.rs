//! Connection settings for a SharePoint site.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DriveError, Result};

/// Microsoft identity platform authority.
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";

/// Base URL for Microsoft Graph API v1.0.
pub const DEFAULT_GRAPH_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default connect and read timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings identifying the site and the application credentials.
///
/// The client secret is never printed by `Debug` and the type is not
/// `Serialize`, so it cannot leak through logs or dumps.
#[derive(Clone)]
pub struct Config {
    tenant: String,
    tenant_domain: String,
    client_id: String,
    client_secret: String,
    site: String,
    drive: Option<String>,
    timeout: Duration,
    authority_url: String,
    graph_url: String,
}

/// On-disk shape of a configuration file.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    tenant: String,
    tenant_domain: String,
    client_id: String,
    client_secret: String,
    site: String,
    #[serde(default)]
    drive: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl Config {
    /// Create a configuration, rejecting empty identifiers.
    ///
    /// # Arguments
    /// * `tenant` - SharePoint tenant name (the `<tenant>` in `<tenant>.sharepoint.com`)
    /// * `tenant_domain` - Directory domain used for the token endpoint
    /// * `client_id` - Application (client) id
    /// * `client_secret` - Application secret
    /// * `site` - Site name under `/sites/`
    pub fn new(
        tenant: impl Into<String>,
        tenant_domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        site: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            tenant: tenant.into(),
            tenant_domain: tenant_domain.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            site: site.into(),
            drive: None,
            timeout: DEFAULT_TIMEOUT,
            authority_url: DEFAULT_AUTHORITY_URL.to_string(),
            graph_url: DEFAULT_GRAPH_URL.to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(DriveError::ConfigFileError)?;
        let file: ConfigFile = serde_json::from_str(&content)?;

        let mut config = Self::new(
            file.tenant,
            file.tenant_domain,
            file.client_id,
            file.client_secret,
            file.site,
        )?;
        if let Some(drive) = file.drive {
            config = config.with_drive(drive);
        }
        if let Some(secs) = file.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Load a configuration from `SHAREPOINT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        fn var(name: &str) -> Result<String> {
            std::env::var(name).map_err(|_| DriveError::MissingEnvVar(name.to_string()))
        }

        let config = Self::new(
            var("SHAREPOINT_TENANT")?,
            var("SHAREPOINT_TENANT_DOMAIN")?,
            var("SHAREPOINT_CLIENT_ID")?,
            var("SHAREPOINT_CLIENT_SECRET")?,
            var("SHAREPOINT_SITE")?,
        )?;
        match std::env::var("SHAREPOINT_DRIVE") {
            Ok(drive) if !drive.trim().is_empty() => Ok(config.with_drive(drive)),
            _ => Ok(config),
        }
    }

    /// Select a document library by name instead of the site's default one.
    pub fn with_drive(mut self, drive: impl Into<String>) -> Self {
        self.drive = Some(drive.into());
        self
    }

    /// Set the connect timeout and the idle limit between reads of a response.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the identity provider authority (useful for testing).
    pub fn with_authority_url(mut self, url: impl Into<String>) -> Self {
        self.authority_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the Graph base URL (useful for testing).
    pub fn with_graph_url(mut self, url: impl Into<String>) -> Self {
        self.graph_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Check that every identifier is non-empty.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("tenant", &self.tenant),
            ("tenant_domain", &self.tenant_domain),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("site", &self.site),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(DriveError::InvalidConfig(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn tenant_domain(&self) -> &str {
        &self.tenant_domain
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn drive(&self) -> Option<&str> {
        self.drive.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Token endpoint for the client-credentials grant.
    pub fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_url, self.tenant_domain)
    }

    pub fn graph_url(&self) -> &str {
        &self.graph_url
    }

    /// Host name of the tenant's SharePoint service.
    pub fn hostname(&self) -> String {
        format!("{}.sharepoint.com", self.tenant)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("tenant", &self.tenant)
            .field("tenant_domain", &self.tenant_domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("site", &self.site)
            .field("drive", &self.drive)
            .field("timeout", &self.timeout)
            .field("authority_url", &self.authority_url)
            .field("graph_url", &self.graph_url)
            .finish()
    }
}
