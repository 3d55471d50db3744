//! Feed server
//!
//! Serves the feed rendered from the current content on every request, plus
//! the public directory (mirrored images included) as static files.

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::feed::FeedRenderer;
use crate::Site;

const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";
const RSS_CACHE_CONTROL: &str = "public, max-age=3600, stale-while-revalidate=86400";

/// Server state
struct ServerState {
    site: Site,
}

/// Build the router for a site
pub fn router(site: Site) -> Router {
    let public_dir = site.public_dir.clone();
    let state = Arc::new(ServerState { site });

    Router::new()
        .route("/rss.xml", get(rss_handler))
        .route("/rss", get(|| async { Redirect::permanent("/rss.xml") }))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16) -> Result<()> {
    let app = router(site.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Feed available at http://{}:{}/rss.xml", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn rss_handler(State(state): State<Arc<ServerState>>) -> Response {
    let site = state.site.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        FeedRenderer::new(&site.config).render(&site.store())
    })
    .await;

    match rendered {
        Ok(Ok(xml)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, RSS_CONTENT_TYPE),
                (header::CACHE_CONTROL, RSS_CACHE_CONTROL),
            ],
            xml,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!("Feed rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Feed unavailable").into_response()
        }
        Err(e) => {
            tracing::error!("Feed task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Feed unavailable").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, SiteConfig};
    use crate::content::store::tests::write_post;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn site(tmp: &TempDir) -> Site {
        let config = SiteConfig {
            layout: Layout::Flat,
            ..SiteConfig::default()
        };
        let site = Site::with_config(tmp.path().to_path_buf(), config);
        write_post(
            &site.content_dir.join("hello"),
            "---\ntitle: Hello\npublishedAt: \"2024-05-06T07:08:09.000Z\"\nsummary: Greeting\n---\n\nHi there\n",
        );
        site
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_rss_headers_and_body() {
        let tmp = TempDir::new().unwrap();
        let response = get(router(site(&tmp)), "/rss.xml").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], RSS_CONTENT_TYPE);
        assert_eq!(response.headers()[header::CACHE_CONTROL], RSS_CACHE_CONTROL);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<rss"), "{body}");
        assert!(body.contains("<title>Hello</title>"), "{body}");
    }

    #[tokio::test]
    async fn test_rss_redirects_permanently() {
        let tmp = TempDir::new().unwrap();
        let response = get(router(site(&tmp)), "/rss").await;

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/rss.xml");
    }

    #[tokio::test]
    async fn test_serves_public_files() {
        let tmp = TempDir::new().unwrap();
        let site = site(&tmp);
        fs::create_dir_all(site.public_dir.join("images/hello")).unwrap();
        fs::write(site.public_dir.join("images/hello/cover.txt"), "cover").unwrap();

        let response = get(router(site), "/images/hello/cover.txt").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"cover");

        let tmp = TempDir::new().unwrap();
        let response = get(router(site_without_posts(&tmp)), "/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn site_without_posts(tmp: &TempDir) -> Site {
        Site::with_config(tmp.path().to_path_buf(), SiteConfig::default())
    }
}
