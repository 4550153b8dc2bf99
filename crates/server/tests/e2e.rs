use std::net::SocketAddr;

use configs::AppConfig;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use server::startup::{build_app, build_state, build_store};
use service::storage::{DocumentStore, JsonDocumentStore};

struct TestApp {
    base_url: String,
    data_dir: std::path::PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

/// Serve the full app on an ephemeral port, backed by a fresh file store seeded with `services`.
async fn start_server(services: usize) -> anyhow::Result<TestApp> {
    let data_dir = std::env::temp_dir().join(format!("hd_e2e_{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&data_dir).await?;
    let seed_path = data_dir.join("services.json");
    let items: Vec<Value> = (0..services).map(|i| json!({"name": format!("s{i}"), "price": i})).collect();
    tokio::fs::write(&seed_path, serde_json::to_vec(&items)?).await?;

    let mut cfg = AppConfig::default();
    cfg.auth.access_token_secret = "e2e-secret".into();
    cfg.store.data_dir = data_dir.to_string_lossy().into_owned();
    cfg.store.documents_file = data_dir.join("documents.json").to_string_lossy().into_owned();

    let store = build_store(&cfg).await?;
    service::seed::seed_services(store.as_ref(), &seed_path).await?;
    let app = build_app(build_state(&cfg, store));

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()), data_dir })
}

#[tokio::test]
async fn e2e_public_health_and_liveness() -> anyhow::Result<()> {
    let app = start_server(0).await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["status"], "ok");

    let res = c.get(format!("{}/", app.base_url)).send().await?;
    assert_eq!(res.text().await?, "Server running");
    Ok(())
}

#[tokio::test]
async fn e2e_seeded_catalog_preview() -> anyhow::Result<()> {
    let app = start_server(10).await?;
    let c = reqwest::Client::new();

    let preview: Vec<Value> = c.get(format!("{}/services", app.base_url)).send().await?.json().await?;
    assert_eq!(preview.len(), 3);
    let all: Vec<Value> = c.get(format!("{}/service-all", app.base_url)).send().await?.json().await?;
    assert_eq!(all.len(), 10);
    Ok(())
}

#[tokio::test]
async fn e2e_token_flow_for_review_list() -> anyhow::Result<()> {
    let app = start_server(0).await?;
    let c = reqwest::Client::new();

    let res = c.get(format!("{}/reviews", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    let res = c.get(format!("{}/reviews", app.base_url)).bearer_auth("not-a-token").send().await?;
    assert_eq!(res.status(), HttpStatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await?["message"], "Forbidden access");

    let token: Value = c
        .post(format!("{}/jwt", app.base_url))
        .json(&json!({"email": "a@x.com"}))
        .send()
        .await?
        .json()
        .await?;
    let token = token["token"].as_str().unwrap_or_default();

    c.post(format!("{}/reviews", app.base_url))
        .json(&json!({"user_email": "a@x.com", "product_id": "1", "review_message": "nice"}))
        .send()
        .await?;
    let res = c
        .get(format!("{}/reviews?user_email=a@x.com", app.base_url))
        .bearer_auth(token)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let reviews: Vec<Value> = res.json().await?;
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["review_message"], "nice");
    Ok(())
}

#[tokio::test]
async fn e2e_writes_persist_to_store_file() -> anyhow::Result<()> {
    let app = start_server(0).await?;
    let c = reqwest::Client::new();

    let res = c
        .put(format!("{}/my-service?user_email=a@x.com&product_id=7", app.base_url))
        .json(&json!({"_id": 7, "rating": 3, "name": "Dry", "user_email": "a@x.com"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let raw = tokio::fs::read(app.data_dir.join("documents.json")).await?;
    let persisted: Value = serde_json::from_slice(&raw)?;
    assert_eq!(persisted["myServices"][0]["product_id"], 7);
    assert_eq!(persisted["myServices"][0]["name"], "Dry");
    Ok(())
}

#[tokio::test]
async fn e2e_run_until_uses_given_config_and_stops_on_signal() -> anyhow::Result<()> {
    let data_dir = std::env::temp_dir().join(format!("hd_run_{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&data_dir).await?;
    let seed_path = data_dir.join("services.json");
    tokio::fs::write(&seed_path, serde_json::to_vec(&json!([{"name": "a"}, {"name": "b"}]))?).await?;
    let documents = data_dir.join("documents.json");

    let mut cfg = AppConfig::default();
    cfg.server.host = "127.0.0.1".into();
    cfg.server.port = 0;
    cfg.database.url = String::new();
    cfg.auth.access_token_secret = "run-secret".into();
    cfg.store.data_dir = data_dir.to_string_lossy().into_owned();
    cfg.store.documents_file = documents.to_string_lossy().into_owned();
    cfg.store.seed_services_file = Some(seed_path.to_string_lossy().into_owned());

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(server::run_until(cfg, async move {
        let _ = rx.await;
    }));
    let _ = tx.send(());
    tokio::time::timeout(std::time::Duration::from_secs(10), server).await???;

    // The store named by the passed config was opened and seeded.
    let store = JsonDocumentStore::new(&documents).await?;
    assert_eq!(store.count("services").await?, 2);

    let _ = std::fs::remove_dir_all(&data_dir);
    Ok(())
}
