mod graphql;
mod seed;
mod storage;

use std::path::{Path, PathBuf};

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use graphql::Schema;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
struct Config {
    port: u16,
    db_path: PathBuf,
    seed_dir: Option<PathBuf>,
}

impl Config {
    fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let port = match lookup("PORT") {
            Some(p) => p.parse().map_err(|e| format!("Invalid PORT {:?}: {}", p, e))?,
            None => 3000,
        };
        let db_path = lookup("DB_PATH").unwrap_or_else(|| "data/tracker.redb".to_string());
        let seed_dir = lookup("SEED_DIR").filter(|s| !s.is_empty()).map(PathBuf::from);
        Ok(Config {
            port,
            db_path: PathBuf::from(db_path),
            seed_dir,
        })
    }
}

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(schema: Schema) -> Router {
    let static_files = Router::new()
        .nest(
            "/dist",
            cached_static_router(Path::new("dist"), CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(Path::new("dist/assets"), CACHE_IMMUTABLE),
        );

    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(serve_index))
        .route("/users/{user_id}/{from}/{to}", get(serve_index))
        .with_state(schema)
        .merge(static_files)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    if let Some(parent) = config.db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!(error = %e, path = %parent.display(), "Failed to create database directory");
            std::process::exit(1);
        }
    }
    let storage = match storage::Storage::open(&config.db_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open storage");
            std::process::exit(1);
        }
    };

    if let Some(dir) = &config.seed_dir {
        if let Err(e) = seed::Seed::load(dir).and_then(|s| s.apply(&storage)) {
            tracing::error!(error = %e, dir = %dir.display(), "Failed to load seed data");
            std::process::exit(1);
        }
    }

    let schema = graphql::build_schema(storage);
    let app = build_app(schema);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(port = config.port, "Server running at http://localhost:{}", config.port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, addr = %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}

async fn serve_index() -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match std::fs::read_to_string("dist/index.html") {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>GPS Tracker</title></head>
<body>
<h1>GPS Tracker</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the API.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::collections::HashMap;
    use tower::ServiceExt;

    /// Create a temp dir with a test file and return the dir path.
    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file_name), content).unwrap();
        dir
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("data/tracker.redb"));
        assert!(config.seed_dir.is_none());
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DB_PATH", "/tmp/x.redb"),
            ("SEED_DIR", "fixtures"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.redb"));
        assert_eq!(config.seed_dir, Some(PathBuf::from("fixtures")));
    }

    #[test]
    fn test_config_rejects_bad_port() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.contains("PORT"));
    }

    #[tokio::test]
    async fn test_dist_bundles_have_immutable_cache() {
        let dist_dir = temp_dir_with_file("app-abc123.js", "bundle()");
        let app = Router::new().nest("/dist", cached_static_router(dist_dir.path(), CACHE_IMMUTABLE));

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/dist/app-abc123.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );
    }

    #[tokio::test]
    async fn test_missing_static_file_returns_404() {
        let dist_dir = temp_dir_with_file("index.html", "<html></html>");
        let app = Router::new().nest("/dist", cached_static_router(dist_dir.path(), CACHE_IMMUTABLE));

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/dist/nonexistent.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_graphql_endpoint_answers_post() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage::Storage::open(&dir.path().join("app.redb")).unwrap();
        let app = build_app(graphql::build_schema(storage));

        let body = serde_json::json!({
            "query": "query($u: ID!) { restrictedLocations(userId: $u) { rows { id } } }",
            "variables": { "u": "u1" }
        });
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/graphql")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["restrictedLocations"]["rows"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_user_route_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage::Storage::open(&dir.path().join("app.redb")).unwrap();
        let app = build_app(graphql::build_schema(storage));

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/users/u1/2024-06-01/2024-06-07")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
