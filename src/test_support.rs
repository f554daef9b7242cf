use std::path::Path;

use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;

use crate::settings::{FetchSettings, Settings};

pub const LOGO_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n fake logo payload";

pub fn fetch_settings() -> FetchSettings {
    FetchSettings {
        max_redirects: 3,
        timeout_secs: 5,
        user_agent: "logo_harvest-test".into(),
    }
}

/// Settings with every file living under `root`.
pub fn settings_in(root: &Path) -> Settings {
    Settings {
        scrape_paths: root.join("scrape_paths.json"),
        logos_file: root.join("extracted_logos.json"),
        portfolio_file: root.join("research/portfolio_data.json"),
        manual_logos_file: root.join("manual_logos.json"),
        output_dir: root.join("public/client-logos"),
        public_prefix: "/client-logos".into(),
        fetch: fetch_settings(),
    }
}

/// Serve a handful of canned responses on an ephemeral port, returning the base URL.
pub async fn serve_fixtures() -> String {
    let app = Router::new()
        .route("/logo.png", get(|| async { LOGO_BYTES }))
        .route(
            "/moved",
            get(|| async { (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/logo.png")]) }),
        )
        .route(
            "/found",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "moved")]) }),
        )
        .route(
            "/loop",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/loop")]) }),
        )
        .route("/nowhere", get(|| async { StatusCode::MOVED_PERMANENTLY }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
