//! HTTP utilities for downloading bundler tools.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::fs,
};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Downloads `url` into `dest`.
///
/// The body is streamed into `<dest>.part` and renamed once complete, so an
/// interrupted transfer never leaves a truncated file at `dest`. Non-success
/// HTTP statuses are errors. Returns the number of bytes written.
pub async fn download_to_file(url: &str, dest: &Path) -> Result<u64> {
    log::info!("Downloading {}", url);

    let mut response = reqwest::get(url)
        .await
        .map_err(|e| Error::GenericError(format!("Download of {url} failed: {e}")))?
        .error_for_status()?;

    let partial = partial_path(dest);
    let written = match stream_to_file(&mut response, &partial).await {
        Ok(written) => written,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                log::warn!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, dest)
        .await
        .fs_context("moving downloaded file into place", dest)?;

    log::debug!("Downloaded {} bytes to {}", written, dest.display());
    Ok(written)
}

async fn stream_to_file(response: &mut reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating download file", path)?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .fs_context("writing download file", path)?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .fs_context("flushing download file", path)?;
    Ok(written)
}

/// `<dest>.part`, where an in-progress download of `dest` is written.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/tools/linuxdeploy-x86_64.AppImage")),
            PathBuf::from("/tools/linuxdeploy-x86_64.AppImage.part")
        );
    }

    #[tokio::test]
    async fn unreachable_host_fails_without_leaving_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("tool.AppImage");

        let result = download_to_file("http://127.0.0.1:9/tool.AppImage", &dest).await;

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn truncated_body_removes_partial_file() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\npartial body")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("tool.AppImage");
        let result = download_to_file(&format!("http://{addr}/tool.AppImage"), &dest).await;
        server.await.unwrap();

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
