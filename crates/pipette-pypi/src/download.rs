//! HTTP access to the package index.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use pipette_util::errors::PipetteError;
use pipette_util::progress;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Show a progress bar for downloads larger than this.
const PROGRESS_THRESHOLD: u64 = 100_000;

/// Build a shared blocking client for index requests and downloads.
pub fn build_client() -> Result<Client, PipetteError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("pipette/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PipetteError::Network {
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// GET `url` with an `Accept` header, retrying server errors and connection
/// failures. Returns `Ok(None)` for 404.
pub fn get_with_retries(
    client: &Client,
    url: &str,
    accept: &str,
) -> Result<Option<Response>, PipetteError> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            std::thread::sleep(RETRY_DELAY * attempt);
        }

        match client.get(url).header(reqwest::header::ACCEPT, accept).send() {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status} from {url}");
                    continue;
                }
                if !status.is_success() {
                    return Err(PipetteError::Network {
                        message: format!("HTTP {status} fetching {url}"),
                    });
                }
                return Ok(Some(resp));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                tracing::debug!("attempt {} for {url} failed: {e}", attempt + 1);
                last_err = format!("{e}");
                continue;
            }
            Err(e) => {
                return Err(PipetteError::Network {
                    message: format!("Request to {url} failed: {e}"),
                });
            }
        }
    }

    Err(PipetteError::Network {
        message: format!("Failed after {MAX_RETRIES} retries for {url}: {last_err}"),
    })
}

/// Stream `url` into `dest`, showing a progress bar for large files.
pub fn download_file(client: &Client, url: &str, dest: &Path, label: &str) -> Result<(), PipetteError> {
    tracing::debug!("downloading {url}");

    let resp = client
        .get(url)
        .send()
        .map_err(|e| PipetteError::Network {
            message: format!("Failed to download {url}: {e}"),
        })?;

    if !resp.status().is_success() {
        return Err(PipetteError::Network {
            message: format!("HTTP {} for {url}", resp.status()),
        });
    }

    let total = resp.content_length().unwrap_or(0);
    let pb = (total > PROGRESS_THRESHOLD).then(|| progress::download_bar(total, label));

    let mut out = File::create(dest)?;
    let mut reader = resp;
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).map_err(|e| PipetteError::Network {
            message: format!("Read error: {e}"),
        })?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
        if let Some(ref pb) = pb {
            pb.inc(n as u64);
        }
    }
    out.flush()?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    Ok(())
}
