//! Download with streaming SHA256 verification.
//!
//! One request at a time, no retries: a failed or mismatched download is
//! fatal for the run.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use doxy_schema::Sha256Digest;

use crate::Reporter;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Build the HTTP client used for every download in a run.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client(verify_tls: bool) -> Result<Client, DownloadError> {
    let client = Client::builder()
        .user_agent(crate::USER_AGENT)
        .danger_accept_invalid_certs(!verify_tls)
        .build()?;
    Ok(client)
}

/// Request for a download operation
pub struct DownloadRequest<'a, R: Reporter + ?Sized> {
    pub client: &'a Client,
    pub url: &'a str,
    pub dest: &'a Path,
    pub expected_hash: Option<&'a Sha256Digest>,
    pub label: &'a str,
    pub reporter: &'a R,
}

impl<R: Reporter + ?Sized> std::fmt::Debug for DownloadRequest<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("url", &self.url)
            .field("dest", &self.dest)
            .field("expected_hash", &self.expected_hash)
            .finish_non_exhaustive()
    }
}

impl<'a, R: Reporter + ?Sized> DownloadRequest<'a, R> {
    pub fn new(client: &'a Client, url: &'a str, dest: &'a Path, reporter: &'a R) -> Self {
        Self {
            client,
            url,
            dest,
            expected_hash: None,
            label: crate::paths::filename_from_url(url),
            reporter,
        }
    }

    /// Require the downloaded bytes to hash to `hash`.
    pub fn with_expected_hash(mut self, hash: &'a Sha256Digest) -> Self {
        self.expected_hash = Some(hash);
        self
    }

    /// Like [`Self::with_expected_hash`], for digests that may be unpinned.
    pub fn with_optional_hash(mut self, hash: Option<&'a Sha256Digest>) -> Self {
        self.expected_hash = hash;
        self
    }

    /// Label shown in progress output instead of the URL's file name.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    /// Execute the download, returning the hex SHA256 of the body.
    pub async fn execute(self) -> Result<String, DownloadError> {
        download_and_verify(self).await
    }
}

/// Perform a sequential download with streaming verification.
///
/// On a hash mismatch the partially trusted file is removed before the
/// error is returned, so nothing downstream can pick it up.
pub async fn download_and_verify<R: Reporter + ?Sized>(
    req: DownloadRequest<'_, R>,
) -> Result<String, DownloadError> {
    tracing::debug!(url = req.url, dest = %req.dest.display(), "downloading");

    let response = req.client.get(req.url).send().await?.error_for_status()?;
    let total_size = response.content_length();
    req.reporter.downloading(req.label, 0, total_size);

    let mut file = File::create(req.dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
        req.reporter.downloading(req.label, downloaded, total_size);
    }

    file.flush().await?;
    drop(file);
    let actual_hash = hex::encode(hasher.finalize());

    if let Some(expected) = req.expected_hash {
        if !expected.matches(&actual_hash) {
            req.reporter.failed(req.label, "hash mismatch");
            tokio::fs::remove_file(req.dest).await.ok();
            return Err(DownloadError::HashMismatch {
                expected: expected.to_string(),
                actual: actual_hash,
            });
        }
    } else {
        tracing::warn!(url = req.url, sha256 = %actual_hash, "no pinned checksum, download not verified");
    }

    Ok(actual_hash)
}
