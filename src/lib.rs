//! sharepoint_drive - Browse and read SharePoint document libraries by path.
//!
//! This library provides functionality to:
//! - Authenticate as an application with the OAuth2 client-credentials flow
//! - List the folders and files under a path in a site's document library
//! - Fetch or download file content by folder path and file name
//!
//! # Example
//!
//! ```no_run
//! use sharepoint_drive::{Config, SharePointClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file("sharepoint.json")?;
//!     let client = SharePointClient::new(config)?;
//!
//!     for folder in client.get_folders(None).await? {
//!         println!("{}", folder);
//!     }
//!
//!     let content = client.get_file_content("summary.pdf", Some("/Finance")).await?;
//!     println!("{} bytes", content.len());
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod path;
pub mod url_parser;

// Re-exports for convenience
pub use auth::Authenticator;
pub use client::SharePointClient;
pub use config::Config;
pub use error::{DriveError, Result};
pub use models::{EntryKind, FileContent, Listing, ListingEntry, SkipReason};
pub use path::RemotePath;
pub use url_parser::parse_site_url;
