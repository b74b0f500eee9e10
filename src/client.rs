//! Microsoft Graph client for browsing a SharePoint document library by path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::auth::Authenticator;
use crate::config::Config;
use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, Drive, FileContent, Listing, ListingEntry, Page, Site};
use crate::path::RemotePath;

/// Client for listing and reading files of one SharePoint site.
///
/// Holds its own token cache, so clients built from different
/// configurations never share credentials.
pub struct SharePointClient {
    config: Arc<Config>,
    auth: Authenticator,
    http: Client,
    site: OnceCell<Site>,
    drive_base: OnceCell<String>,
}

impl SharePointClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `config` - Site and credential settings
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        // Per-read limit rather than a whole-request one, so long downloads
        // keep going as long as bytes keep arriving.
        let http = Client::builder()
            .connect_timeout(config.timeout())
            .read_timeout(config.timeout())
            .build()
            .map_err(|e| DriveError::InvalidConfig(format!("failed to build HTTP client: {}", e)))?;
        let config = Arc::new(config);

        Ok(Self {
            auth: Authenticator::new(Arc::clone(&config), http.clone()),
            config,
            http,
            site: OnceCell::new(),
            drive_base: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The authenticator backing this client.
    pub fn authenticator(&self) -> &Authenticator {
        &self.auth
    }

    /// Folders directly under `path` (`None` for the library root).
    pub async fn get_folders(&self, path: Option<&str>) -> Result<Vec<ListingEntry>> {
        Ok(self.list_children(path).await?.folders)
    }

    /// Files directly under `path` (`None` for the library root).
    pub async fn get_files(&self, path: Option<&str>) -> Result<Vec<ListingEntry>> {
        Ok(self.list_children(path).await?.files)
    }

    /// List every child of a folder, following pagination to the end.
    ///
    /// # Arguments
    /// * `path` - Folder path beginning with `/`, or `None` for the root
    pub async fn list_children(&self, path: Option<&str>) -> Result<Listing> {
        let path = RemotePath::resolve(path)?;
        let drive_base = self.drive_base().await?;
        let url = format!("{}/{}/children", drive_base, path.to_graph_segment());

        debug!(path = %path, "Listing folder");
        let items: Vec<Map<String, Value>> = self
            .get_all_pages(url, &format!("folder {}", path))
            .await?;

        let mut listing = Listing::default();
        for item in items {
            match ListingEntry::from_item(item) {
                Ok(entry) => listing.push(entry),
                Err(reason) => debug!(path = %path, %reason, "Skipping drive item"),
            }
        }

        info!(
            path = %path,
            folders = listing.folders.len(),
            files = listing.files.len(),
            "Listed folder"
        );
        Ok(listing)
    }

    /// Fetch the full content of a file.
    ///
    /// # Arguments
    /// * `file_name` - Exact name of the file
    /// * `path` - Folder containing the file, or `None` for the root
    pub async fn get_file_content(
        &self,
        file_name: &str,
        path: Option<&str>,
    ) -> Result<FileContent> {
        let response = self.open_content(file_name, path).await?;
        let content_length = response.content_length();
        let data = response.bytes().await?.to_vec();

        debug!(file = file_name, bytes = data.len(), "Fetched file content");
        Ok(FileContent {
            data,
            content_length,
        })
    }

    /// Download a file to a local path.
    ///
    /// If `destination` is a directory the file keeps its remote name.
    /// A partially written file is removed when the transfer fails.
    pub async fn download_file<P: AsRef<Path>>(
        &self,
        file_name: &str,
        path: Option<&str>,
        destination: P,
    ) -> Result<PathBuf> {
        let destination = destination.as_ref();
        let response = self.open_content(file_name, path).await?;

        let final_path = if destination.is_dir() {
            destination.join(file_name)
        } else {
            destination.to_path_buf()
        };

        if let Err(e) = write_body(response, &final_path).await {
            warn!(path = %final_path.display(), error = %e, "Download failed, removing partial file");
            let _ = tokio::fs::remove_file(&final_path).await;
            return Err(e);
        }

        info!(file = file_name, path = %final_path.display(), "Downloaded file");
        Ok(final_path)
    }

    /// Site metadata, looked up once per client.
    pub async fn site(&self) -> Result<&Site> {
        self.site
            .get_or_try_init(|| async {
                let url = format!(
                    "{}/sites/{}:/sites/{}",
                    self.config.graph_url(),
                    self.config.hostname(),
                    self.config.site()
                );
                let what = format!("site {}/sites/{}", self.config.hostname(), self.config.site());
                let response = self.get_authorized(&url, &what).await?;
                let site: Site = response.json().await?;
                debug!(site_id = %site.id, "Resolved site");
                Ok::<_, DriveError>(site)
            })
            .await
    }

    /// Document libraries of the site.
    pub async fn list_drives(&self) -> Result<Vec<Drive>> {
        let site_id = self.site().await?.id.clone();
        let url = format!("{}/sites/{}/drives", self.config.graph_url(), site_id);
        self.get_all_pages(url, &format!("drives of site {}", site_id))
            .await
    }

    /// Prefix every item address hangs off: the site's default library or
    /// the configured one.
    async fn drive_base(&self) -> Result<&str> {
        self.drive_base
            .get_or_try_init(|| async {
                let Some(name) = self.config.drive() else {
                    let site_id = &self.site().await?.id;
                    return Ok::<_, DriveError>(format!(
                        "{}/sites/{}/drive",
                        self.config.graph_url(),
                        site_id
                    ));
                };

                let drives = self.list_drives().await?;
                let drive = drives
                    .iter()
                    .find(|d| drive_matches(d, name))
                    .ok_or_else(|| DriveError::NotFound(format!("drive {}", name)))?;
                debug!(drive_id = %drive.id, name = %drive.name, "Resolved drive");
                Ok(format!("{}/drives/{}", self.config.graph_url(), drive.id))
            })
            .await
            .map(String::as_str)
    }

    async fn open_content(&self, file_name: &str, path: Option<&str>) -> Result<Response> {
        let file_path = RemotePath::resolve(path)?.join(file_name)?;
        let drive_base = self.drive_base().await?;
        let url = format!("{}/{}/content", drive_base, file_path.to_graph_segment());

        debug!(path = %file_path, "Fetching file content");
        self.get_authorized(&url, &format!("file {}", file_path))
            .await
    }

    /// Follow `@odata.nextLink` until the collection is exhausted.
    ///
    /// Links must stay under the configured Graph base URL, since the bearer
    /// token is sent with them. A link that was already fetched ends the loop.
    async fn get_all_pages<T: DeserializeOwned>(&self, url: String, what: &str) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            let response = self.get_authorized(&url, what).await?;
            let page: Page<T> = response.json().await?;
            visited.insert(url);
            debug!(page = visited.len(), items = page.value.len(), has_next = page.next_link.is_some(), "Fetched page");

            all_items.extend(page.value);
            next = match page.next_link {
                Some(link) if visited.contains(&link) => {
                    warn!(resource = what, "Pagination link repeats a fetched page, stopping");
                    None
                }
                Some(link) if !is_under_base(&link, self.config.graph_url()) => {
                    return Err(DriveError::InvalidResponse(format!(
                        "pagination link outside {}: {}",
                        self.config.graph_url(),
                        link
                    )));
                }
                link => link,
            };
        }

        Ok(all_items)
    }

    /// Authenticated GET with a single retry on 401/403 using a fresh token.
    async fn get_authorized(&self, url: &str, what: &str) -> Result<Response> {
        let token = self.auth.get_access_token().await?;
        let response = self.http.get(url).bearer_auth(&token).send().await?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = response.status().as_u16(), "Access token rejected, refreshing once");
            self.auth.invalidate(&token).await;
            let token = self.auth.get_access_token().await?;
            let response = self.http.get(url).bearer_auth(&token).send().await?;
            return check_status(response, what).await;
        }

        check_status(response, what).await
    }
}

fn is_under_base(link: &str, base: &str) -> bool {
    link.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

fn drive_matches(drive: &Drive, name: &str) -> bool {
    if drive.name.eq_ignore_ascii_case(name) {
        return true;
    }
    let url_name = drive
        .web_url
        .as_deref()
        .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
        .map(|segment| percent_encoding::percent_decode_str(segment).decode_utf8_lossy());
    url_name.is_some_and(|n| n.eq_ignore_ascii_case(name))
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&error_body) {
        Ok(api_error) => api_error.error.message,
        Err(_) if error_body.is_empty() => status.to_string(),
        Err(_) => error_body,
    };

    let err = match status {
        StatusCode::NOT_FOUND => DriveError::NotFound(what.to_string()),
        _ => DriveError::from_status(status, message),
    };
    warn!(status = status.as_u16(), resource = what, "Graph request failed");
    Err(err)
}

async fn write_body(response: Response, final_path: &Path) -> Result<()> {
    let mut file = File::create(final_path).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
    }

    file.flush().await?;
    Ok(())
}
