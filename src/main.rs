//! sharepoint_drive CLI - Browse SharePoint document libraries by path.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use sharepoint_drive::{parse_site_url, Config, ListingEntry, SharePointClient};

/// CLI tool for browsing SharePoint document libraries.
#[derive(Parser)]
#[command(name = "sharepoint_drive")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON configuration file (overrides the individual flags).
    #[arg(long, env = "SHAREPOINT_CONFIG")]
    config: Option<PathBuf>,

    /// Site URL, e.g. https://contoso.sharepoint.com/sites/Finance/Shared%20Documents/Reports.
    #[arg(long)]
    url: Option<String>,

    /// Tenant name (the <tenant> in <tenant>.sharepoint.com).
    #[arg(long, env = "SHAREPOINT_TENANT")]
    tenant: Option<String>,

    /// Directory domain for the token endpoint (defaults to <tenant>.onmicrosoft.com).
    #[arg(long, env = "SHAREPOINT_TENANT_DOMAIN")]
    tenant_domain: Option<String>,

    /// Application (client) id.
    #[arg(long, env = "SHAREPOINT_CLIENT_ID")]
    client_id: Option<String>,

    /// Application secret.
    #[arg(long, env = "SHAREPOINT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Site name under /sites/.
    #[arg(long, env = "SHAREPOINT_SITE")]
    site: Option<String>,

    /// Document library name (defaults to the site's default library).
    #[arg(long, env = "SHAREPOINT_DRIVE")]
    drive: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List folders under a path.
    Folders {
        /// Folder path beginning with '/' (library root when omitted).
        path: Option<String>,
    },

    /// List files under a path.
    Files {
        /// Folder path beginning with '/' (library root when omitted).
        path: Option<String>,
    },

    /// Fetch a file's content.
    Get {
        /// Exact file name.
        file_name: String,

        /// Folder containing the file.
        #[arg(long, short = 'p')]
        path: Option<String>,

        /// Local destination (file or directory); writes to stdout when omitted.
        #[arg(long, short = 't')]
        to: Option<PathBuf>,
    },

    /// List the site's document libraries.
    Drives,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, url_path) = build_config(&cli)?;
    let client = SharePointClient::new(config).context("Failed to create client")?;

    match cli.command {
        Commands::Folders { path } => {
            let path = path.or(url_path);
            let folders = client
                .get_folders(path.as_deref())
                .await
                .with_context(|| format!("Failed to list folders in {}", display_path(&path)))?;
            print_entries(&folders, "No folders found.");
        }

        Commands::Files { path } => {
            let path = path.or(url_path);
            let files = client
                .get_files(path.as_deref())
                .await
                .with_context(|| format!("Failed to list files in {}", display_path(&path)))?;
            print_entries(&files, "No files found.");
        }

        Commands::Get {
            file_name,
            path,
            to,
        } => {
            let path = path.or(url_path);
            match to {
                Some(to) => {
                    ensure_parent_dir(&to)?;
                    eprint!("Downloading {}... ", file_name);
                    let saved = client
                        .download_file(&file_name, path.as_deref(), &to)
                        .await
                        .with_context(|| format!("Failed to download file: {}", file_name))?;
                    eprintln!("OK");
                    eprintln!("Saved to: {:?}", saved);
                }
                None => {
                    let content = client
                        .get_file_content(&file_name, path.as_deref())
                        .await
                        .with_context(|| format!("Failed to fetch file: {}", file_name))?;
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(content.as_slice())?;
                    stdout.flush()?;
                }
            }
        }

        Commands::Drives => {
            let drives = client
                .list_drives()
                .await
                .context("Failed to list document libraries")?;
            println!("{:<66} {:<16} {}", "ID", "TYPE", "NAME");
            println!("{}", "-".repeat(100));
            for drive in drives {
                println!("{}", drive);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sharepoint_drive=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Assemble the configuration from a file, a site URL and individual flags.
///
/// Returns the folder path embedded in `--url`, if any.
fn build_config(cli: &Cli) -> Result<(Config, Option<String>)> {
    let location = cli
        .url
        .as_deref()
        .map(parse_site_url)
        .transpose()
        .context("Invalid --url")?;

    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?
    } else {
        let tenant = location
            .as_ref()
            .map(|l| l.tenant.clone())
            .or_else(|| cli.tenant.clone())
            .context("Missing --tenant (or --url)")?;
        let site = location
            .as_ref()
            .map(|l| l.site.clone())
            .or_else(|| cli.site.clone())
            .context("Missing --site (or --url)")?;
        let tenant_domain = cli
            .tenant_domain
            .clone()
            .unwrap_or_else(|| format!("{}.onmicrosoft.com", tenant));
        let client_id = cli.client_id.clone().context("Missing --client-id")?;
        let client_secret = cli.client_secret.clone().context("Missing --client-secret")?;

        Config::new(tenant, tenant_domain, client_id, client_secret, site)?
            .with_timeout(Duration::from_secs(cli.timeout))
    };

    let drive = cli
        .drive
        .clone()
        .or_else(|| location.as_ref().and_then(|l| l.library.clone()));
    if let Some(drive) = drive {
        config = config.with_drive(drive);
    }

    Ok((config, location.and_then(|l| l.path)))
}

fn print_entries(entries: &[ListingEntry], empty_message: &str) {
    if entries.is_empty() {
        println!("{}", empty_message);
        return;
    }
    println!("{:<4}\t{:>10}\t{:<20}\t{}", "KIND", "SIZE", "MODIFIED", "NAME");
    println!("{}", "-".repeat(80));
    for entry in entries {
        println!("{}", entry);
    }
}

fn display_path(path: &Option<String>) -> &str {
    path.as_deref().unwrap_or("/")
}

fn ensure_parent_dir(to: &Path) -> Result<()> {
    if to.is_dir() || to.to_string_lossy().ends_with('/') {
        std::fs::create_dir_all(to)
            .with_context(|| format!("Failed to create directory: {:?}", to))?;
    } else if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_build_config_from_url() {
        let cli = cli(&[
            "sharepoint_drive",
            "--url",
            "https://contoso.sharepoint.com/sites/Finance/Shared%20Documents/Reports",
            "--client-id",
            "app",
            "--client-secret",
            "secret",
            "files",
        ]);
        let (config, path) = build_config(&cli).unwrap();
        assert_eq!(config.tenant(), "contoso");
        assert_eq!(config.tenant_domain(), "contoso.onmicrosoft.com");
        assert_eq!(config.site(), "Finance");
        assert_eq!(config.drive(), Some("Shared Documents"));
        assert_eq!(path.as_deref(), Some("/Reports"));
    }

    #[test]
    fn test_build_config_requires_credentials() {
        let cli = cli(&[
            "sharepoint_drive",
            "--tenant",
            "contoso",
            "--site",
            "Finance",
            "drives",
        ]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_get_command_args() {
        let cli = cli(&[
            "sharepoint_drive",
            "--tenant",
            "contoso",
            "get",
            "summary.pdf",
            "-p",
            "/Finance",
            "-t",
            "out/",
        ]);
        match cli.command {
            Commands::Get {
                file_name,
                path,
                to,
            } => {
                assert_eq!(file_name, "summary.pdf");
                assert_eq!(path.as_deref(), Some("/Finance"));
                assert_eq!(to, Some(PathBuf::from("out/")));
            }
            _ => panic!("expected get command"),
        }
    }
}
