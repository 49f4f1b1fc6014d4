use std::path::{Path, PathBuf};

use log::{debug, error, info};
use reqwest::blocking::Client;

use crate::annotations::{raw_download_url, Annotation};
use crate::error::{DataError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of a batch download: what was saved and what was skipped.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub saved: Vec<PathBuf>,
    pub failed: Vec<DownloadFailure>,
}

/// The last path segment of `url`, used as the local file name.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let url = reqwest::Url::parse(url).ok()?;
    let name = url.path_segments()?.last()?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Fetches files one at a time over a blocking HTTP client.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(Client::builder().build()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Downloads `url` into `dir`, named after the last segment of the URL.
    pub fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        let name = file_name_from_url(url).ok_or_else(|| DataError::download(url, "no file name in url"))?;
        let path = dir.join(name);

        debug!("GET {url}");
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.bytes())
            .map_err(|e| DataError::download(url, e))?;
        std::fs::write(&path, &body)?;
        Ok(path)
    }

    /// Downloads every URL into `dir`, creating it if needed.
    ///
    /// A URL that fails is logged and recorded in the report; the remaining URLs are still
    /// fetched. Only failing to create `dir` is an error.
    pub fn download_all<'a, I>(&self, urls: I, dir: &Path) -> Result<DownloadReport>
    where
        I: IntoIterator<Item = &'a str>,
    {
        std::fs::create_dir_all(dir)?;
        let mut report = DownloadReport::default();
        for url in urls {
            match self.download(url, dir) {
                Ok(path) => {
                    info!("downloaded {url} to {}", path.display());
                    report.saved.push(path);
                }
                Err(e) => {
                    error!("failed to download {url}: {e}");
                    report.failed.push(DownloadFailure {
                        url: url.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }

    /// Downloads the raw files behind `annotations`. Identifiers without a raw form are skipped.
    pub fn download_annotations(&self, annotations: &[Annotation], dir: &Path) -> Result<DownloadReport> {
        let urls: Vec<String> = annotations
            .iter()
            .filter_map(|a| {
                let url = raw_download_url(&a.file_identifier);
                if url.is_none() {
                    debug!("skipping {}: not an https identifier", a.file_identifier);
                }
                url
            })
            .collect();
        self.download_all(urls.iter().map(String::as_str), dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(
            Some("part.stl".to_string()),
            file_name_from_url("https://raw.github.com/o/r/main/part.stl")
        );
        assert_eq!(None, file_name_from_url("https://example.com/"));
        assert_eq!(None, file_name_from_url("not a url"));
    }
}
