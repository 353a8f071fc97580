//! Artifact download over HTTP.
//!
//! The [`Fetcher`] trait is the narrow contract the workflow uses: "put
//! the bytes behind this URL at this path". [`HttpFetcher`] implements it
//! with `reqwest`, streaming the body into a `.part` file next to the
//! destination and renaming it into place once the whole body is on disk.
//! A failed fetch never leaves a file at the destination.

use futures::StreamExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Errors that can occur while fetching an artifact.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        /// URL being fetched.
        url: String,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status} for {url}")]
    Status {
        /// URL being fetched.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body could not be written to disk.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// File being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Downloads a URL to a local file.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Fetch `url` into `dest`, overwriting any existing file.
    ///
    /// Returns the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        (**self).fetch(url, dest).await
    }
}

/// [`Fetcher`] performing a plain HTTP GET: no custom headers, no auth,
/// no retry.
///
/// # Example
///
/// ```rust,no_run
/// use rustdesk_provision::{Fetcher, HttpFetcher};
/// use std::path::Path;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let bytes = HttpFetcher
///         .fetch("https://example.com/rustdesk.exe", Path::new("rustdesk.exe"))
///         .await;
///     println!("{:?}", bytes.map_err(|e| e.to_string()));
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let client = reqwest::Client::builder().build().map_err(request_error)?;
        let response = client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        debug!(url, content_length = ?response.content_length(), "download started");

        let partial = partial_path(dest);
        let result = match write_body(url, response, &partial).await {
            Ok(bytes) => tokio::fs::rename(&partial, dest)
                .await
                .map(|()| bytes)
                .map_err(|source| FetchError::Write {
                    path: dest.to_path_buf(),
                    source,
                }),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                info!(path = %dest.display(), bytes, "artifact downloaded");
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

/// Stream the response body into `path`.
async fn write_body(
    url: &str,
    response: reqwest::Response,
    path: &Path,
) -> Result<u64, FetchError> {
    let write_error = |source| FetchError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        file.write_all(&chunk).await.map_err(write_error)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(write_error)?;
    Ok(written)
}

/// `<dest>.part`, in the same directory so the final rename stays on one
/// filesystem.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(response: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/client.exe")
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/tmp/vircom_client.exe")),
            PathBuf::from("/tmp/vircom_client.exe.part")
        );
        assert_eq!(
            partial_path(Path::new("client.exe")),
            PathBuf::from("client.exe.part")
        );
    }

    #[tokio::test]
    async fn test_fetch_writes_body() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\nMZ-payload!",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("client.exe");

        let bytes = HttpFetcher.fetch(&url, &dest).await.unwrap();

        assert_eq!(bytes, 11);
        assert_eq!(std::fs::read(&dest).unwrap(), b"MZ-payload!");
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_overwrites_existing_file() {
        let url =
            serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\nnew")
                .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("client.exe");
        std::fs::write(&dest, b"an older and longer installer").unwrap();

        HttpFetcher.fetch(&url, &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("client.exe");

        let result = HttpFetcher.fetch(&url, &dest).await;

        assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("client.exe");

        let result = HttpFetcher
            .fetch(&format!("http://{addr}/client.exe"), &dest)
            .await;

        assert!(matches!(result, Err(FetchError::Request { .. })));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_fetch_truncated_body_leaves_no_file() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\nConnection: close\r\n\r\nshort",
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("client.exe");

        let result = HttpFetcher.fetch(&url, &dest).await;

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
