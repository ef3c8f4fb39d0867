//! Source tarball download
//!
//! Ensures a verified local copy of an upstream artifact exists, trying
//! mirror URLs in order and downloading only when the cache misses.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::digest::{file_digest, verify, DigestAlgorithm};
use crate::BuildError;

/// Canonical local filename for a set of mirror URLs: the basename of the
/// first one (all candidates must serve the same logical artifact)
pub fn filename_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Materialize a verified copy of the artifact in `dest_dir`.
///
/// An existing file that passes verification is returned without any
/// network access. Otherwise each URL is tried in order; only the last
/// one's transport failure is fatal. The download lands in a `.tmp`
/// sibling and is renamed into place only after its digest checks out,
/// so a valid file at the final path is always trustworthy.
pub async fn fetch(
    client: &reqwest::Client,
    urls: &[String],
    expected: &str,
    dest_dir: &Path,
) -> Result<PathBuf, BuildError> {
    let first = urls
        .first()
        .ok_or(BuildError::NoUrls)?;
    let filename = filename_from_url(first).to_string();

    tokio::fs::create_dir_all(dest_dir).await?;
    let dest = dest_dir.join(&filename);

    if dest.exists() {
        if verify(&dest, expected).await? {
            debug!("Cache hit for {}", filename);
            return Ok(dest);
        }
        warn!("Removing stale {:?}", dest);
        tokio::fs::remove_file(&dest).await?;
    }

    let tmp = dest_dir.join(format!("{}.tmp", filename));

    let mut last_err: Option<BuildError> = None;
    for url in urls {
        info!("Downloading {}", url);
        match download_one(client, url, &tmp).await {
            Ok(()) => {
                last_err = None;
                break;
            }
            Err(e) => {
                warn!("Download from {} failed: {}", url, e);
                last_err = Some(e);
            }
        }
    }
    if let Some(e) = last_err {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }

    let algorithm = DigestAlgorithm::from_hex_len(expected.len())?;
    let actual = file_digest(&tmp, algorithm).await?;
    if actual != expected {
        tokio::fs::remove_file(&tmp).await?;
        return Err(BuildError::DigestMismatch {
            path: dest,
            expected: expected.to_string(),
            actual,
        });
    }

    tokio::fs::rename(&tmp, &dest).await?;
    info!("Downloaded {}", filename);
    Ok(dest)
}

async fn download_one(
    client: &reqwest::Client,
    url: &str,
    tmp: &Path,
) -> Result<(), BuildError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(BuildError::InvalidResponse(format!(
            "HTTP {}",
            response.status()
        )));
    }

    let total = response.content_length().unwrap_or(0);
    let progress = if total > 0 {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("[{bar:30}] {bytes}/{total_bytes} ({bytes_per_sec})")
                .expect("valid progress template"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut file = tokio::fs::File::create(tmp).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        progress.inc(chunk.len() as u64);
    }

    file.flush().await?;
    progress.finish_and_clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    // sha256 of b"upstream artifact"
    const DIGEST: &str = "dd37b8f4fdfc5b099e83608c6d66f3e92a5d5ba579a6a2dc1598225316059591";
    const BODY: &[u8] = b"upstream artifact";

    /// Serve one HTTP response on an ephemeral port and return the mirror URL
    async fn mirror(body: &'static [u8], ok: bool) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = sock.read(&mut buf).await;
                let header = if ok {
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    )
                } else {
                    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_string()
                };
                let _ = sock.write_all(header.as_bytes()).await;
                if ok {
                    let _ = sock.write_all(body).await;
                }
                let _ = sock.shutdown().await;
            }
        });

        format!("http://{}/artifact-1.0.tar.gz", addr)
    }

    /// A mirror that refuses connections
    async fn dead_mirror() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/artifact-1.0.tar.gz", addr)
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://example.org/pub/foo-1.2.tar.xz"),
            "foo-1.2.tar.xz"
        );
        assert_eq!(filename_from_url("bare"), "bare");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("artifact-1.0.tar.gz"), BODY)
            .await
            .unwrap();

        // the mirror is unreachable, so any network attempt would fail
        let urls = vec![dead_mirror().await];
        let client = reqwest::Client::new();

        let path = fetch(&client, &urls, DIGEST, dir.path()).await.unwrap();
        let again = fetch(&client, &urls, DIGEST, dir.path()).await.unwrap();
        assert_eq!(path, again);
        assert_eq!(path, dir.path().join("artifact-1.0.tar.gz"));
    }

    #[tokio::test]
    async fn test_mirror_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec![
            dead_mirror().await,
            mirror(b"", false).await,
            mirror(BODY, true).await,
        ];
        let client = reqwest::Client::new();

        let path = fetch(&client, &urls, DIGEST, dir.path()).await.unwrap();
        assert!(verify(&path, DIGEST).await.unwrap());
    }

    #[tokio::test]
    async fn test_all_mirrors_fail() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec![dead_mirror().await, mirror(b"", false).await];
        let client = reqwest::Client::new();

        let result = fetch(&client, &urls, DIGEST, dir.path()).await;
        // the last mirror answered 404, so that failure surfaces
        assert!(matches!(result, Err(BuildError::InvalidResponse(_))));
        assert!(!dir.path().join("artifact-1.0.tar.gz").exists());
    }

    #[tokio::test]
    async fn test_corrupt_download_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let urls = vec![mirror(b"not the artifact", true).await];
        let client = reqwest::Client::new();

        let result = fetch(&client, &urls, DIGEST, dir.path()).await;
        assert!(matches!(result, Err(BuildError::DigestMismatch { .. })));
        assert!(!dir.path().join("artifact-1.0.tar.gz").exists());
        assert!(!dir.path().join("artifact-1.0.tar.gz.tmp").exists());
    }

    #[tokio::test]
    async fn test_stale_cache_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("artifact-1.0.tar.gz"), b"corrupted")
            .await
            .unwrap();

        let urls = vec![mirror(BODY, true).await];
        let client = reqwest::Client::new();

        let path = fetch(&client, &urls, DIGEST, dir.path()).await.unwrap();
        assert!(verify(&path, DIGEST).await.unwrap());
    }
}
