use std::fs;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::INSTALLCON_VERSION;

pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(format!("installcon/{INSTALLCON_VERSION}"))
        .timeout(Duration::from_secs(60))
        .build()
        .context("failed to build HTTP client")
}

/// Reads the whole resource at `raw_url` into memory. Local channels publish
/// `file://` URLs, which are read straight from disk.
pub(crate) fn fetch_bytes(client: &Client, raw_url: &str) -> Result<Vec<u8>> {
    let url = Url::parse(raw_url).with_context(|| format!("invalid archive url {raw_url}"))?;
    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| anyhow!("invalid file url {raw_url}"))?;
            debug!(path = %path.display(), "reading local archive");
            fs::read(&path).with_context(|| format!("reading {}", path.display()))
        }
        "http" | "https" => {
            debug!(url = %url, "downloading archive");
            let response = client
                .get(url.clone())
                .send()
                .with_context(|| format!("failed to download {url}"))?
                .error_for_status()
                .with_context(|| format!("download failed for {url}"))?;
            let bytes = response
                .bytes()
                .with_context(|| format!("failed to read {url}"))?;
            Ok(bytes.to_vec())
        }
        other => bail!("unsupported url scheme `{other}` for {raw_url}"),
    }
}
