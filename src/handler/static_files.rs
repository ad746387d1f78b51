//! Static file serving module
//!
//! Maps a validated request path onto the static root and streams the file.

use crate::error::Rejection;
use crate::handler::ResponseBody;
use crate::http::{self, mime};
use crate::logger;
use futures_util::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

const INDEX_FILE: &str = "index.html";

/// File on disk a request path refers to
///
/// `/` maps to `index.html`; anything else is taken relative to `root`.
/// The path must already have passed [`crate::routing::is_valid_path`].
pub fn resolve_file_path(root: &Path, request_path: &str) -> PathBuf {
    if request_path == "/" {
        return root.join(INDEX_FILE);
    }
    root.join(request_path.trim_start_matches('/'))
}

/// Open `request_path` under `root` and stream it back
///
/// Every open or metadata failure, and anything that is not a regular file,
/// yields [`Rejection::FileNotFound`].
pub async fn serve_file(root: &Path, request_path: &str) -> Result<Response<ResponseBody>, Rejection> {
    let file_path = resolve_file_path(root, request_path);

    let file = match File::open(&file_path).await {
        Ok(f) => f,
        Err(e) => {
            logger::log_debug(&format!("Cannot open '{}': {e}", file_path.display()));
            return Err(Rejection::FileNotFound);
        }
    };

    let metadata = match file.metadata().await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(Rejection::FileNotFound),
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to stat '{}': {e}",
                file_path.display()
            ));
            return Err(Rejection::FileNotFound);
        }
    };

    let content_type = mime::content_type_for_path(&file_path);
    Ok(http::build_file_response(
        file_stream_body(file),
        content_type,
        metadata.len(),
    ))
}

/// Chunked body over an open file; read errors abort the connection
fn file_stream_body(file: File) -> ResponseBody {
    let stream = ReaderStream::new(file).map_ok(Frame::data);
    BodyExt::boxed(StreamBody::new(stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};

    #[test]
    fn test_resolve_file_path() {
        let root = Path::new("/srv/www");
        assert_eq!(resolve_file_path(root, "/"), PathBuf::from("/srv/www/index.html"));
        assert_eq!(
            resolve_file_path(root, "/css/site.css"),
            PathBuf::from("/srv/www/css/site.css")
        );
    }

    #[tokio::test]
    async fn test_serve_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();

        let resp = serve_file(dir.path(), "/app.js").await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/javascript");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "15");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"console.log(1);");
    }

    #[tokio::test]
    async fn test_large_file_streams_completely() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..200_000u32).map(|i| u8::try_from(i % 251).unwrap()).collect();
        std::fs::write(dir.path().join("blob.bin"), &data).unwrap();

        let resp = serve_file(dir.path(), "/blob.bin").await.unwrap();
        assert_eq!(resp.headers()[CONTENT_TYPE], mime::DEFAULT_CONTENT_TYPE);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.len(), data.len());
        assert_eq!(&body[..], &data[..]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = serve_file(dir.path(), "/missing.txt").await;
        assert!(matches!(result, Err(Rejection::FileNotFound)));
    }

    #[tokio::test]
    async fn test_directory_is_not_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let result = serve_file(dir.path(), "/sub").await;
        assert!(matches!(result, Err(Rejection::FileNotFound)));
    }

    #[tokio::test]
    async fn test_root_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let result = serve_file(dir.path(), "/").await;
        assert!(matches!(result, Err(Rejection::FileNotFound)));
    }
}
