use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Files under the public directory, served before any session work
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to an existing regular file under the root.
    /// Traversal, hidden segments and directories never resolve.
    pub async fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = match request_path {
            "/favicon.ico" => "images/favicon.ico",
            other => other.trim_start_matches('/'),
        };

        if relative.is_empty() || relative.contains('\\') {
            return None;
        }

        let mut file = self.root.clone();
        for segment in relative.split('/') {
            if segment.is_empty() || segment == ".." || segment.starts_with('.') {
                return None;
            }
            file.push(segment);
        }

        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => Some(file),
            _ => None,
        }
    }
}

/// Answer GET/HEAD requests that name a public file; everything else
/// continues down the pipeline untouched.
pub async fn static_assets_middleware(
    State(assets): State<Arc<StaticAssets>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return next.run(request).await;
    }

    let Some(file) = assets.resolve(request.uri().path()).await else {
        return next.run(request).await;
    };

    tracing::trace!("Serving static file {}", file.display());
    match ServeFile::new(file).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("stylesheets")).unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("stylesheets/style.css"), "body {}").unwrap();
        std::fs::write(dir.path().join("images/favicon.ico"), [0u8; 4]).unwrap();
        std::fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        dir
    }

    #[tokio::test]
    async fn resolves_existing_files_only() {
        let dir = public_dir();
        let assets = StaticAssets::new(dir.path());

        assert_eq!(
            assets.resolve("/stylesheets/style.css").await,
            Some(dir.path().join("stylesheets").join("style.css"))
        );
        assert_eq!(assets.resolve("/stylesheets/missing.css").await, None);
        assert_eq!(assets.resolve("/stylesheets").await, None);
        assert_eq!(assets.resolve("/").await, None);
    }

    #[tokio::test]
    async fn favicon_maps_into_images() {
        let dir = public_dir();
        let assets = StaticAssets::new(dir.path());
        assert_eq!(
            assets.resolve("/favicon.ico").await,
            Some(dir.path().join("images").join("favicon.ico"))
        );
    }

    #[tokio::test]
    async fn rejects_traversal_and_hidden_files() {
        let dir = public_dir();
        let assets = StaticAssets::new(dir.path().join("stylesheets"));
        assert_eq!(assets.resolve("/../images/favicon.ico").await, None);

        let assets = StaticAssets::new(dir.path());
        assert_eq!(assets.resolve("/.env").await, None);
        assert_eq!(assets.resolve("/stylesheets//style.css").await, None);
    }
}
