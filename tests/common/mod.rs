#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

use devcamp_api::auth::{generate_jwt, Claims};
use devcamp_api::config::AppConfig;
use devcamp_api::geo::{GeocodeMatch, StaticGeocoder};
use devcamp_api::types::Role;
use devcamp_api::AppState;

pub const NEAR_90210: &str = "8440 Sunset Blvd, West Hollywood, CA 90069";
pub const DOWNTOWN_LA: &str = "200 N Spring St, Los Angeles, CA 90012";
pub const BOSTON: &str = "233 Bay State Rd, Boston, MA 02215";

/// Router running in-process on a free port, backed by the in-memory store
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub upload_dir: TempDir,
    secret: String,
}

fn place(lat: f64, lng: f64, city: &str, state: &str, zipcode: &str) -> GeocodeMatch {
    GeocodeMatch {
        latitude: lat,
        longitude: lng,
        formatted_address: Some(format!("{}, {} {}", city, state, zipcode)),
        street: None,
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        zipcode: Some(zipcode.to_string()),
        country: Some("US".to_string()),
    }
}

fn geocoder() -> StaticGeocoder {
    StaticGeocoder::default()
        .with_entry("90210", place(34.0901, -118.4065, "Beverly Hills", "CA", "90210"))
        .with_entry(NEAR_90210, place(34.0954, -118.3760, "West Hollywood", "CA", "90069"))
        .with_entry(DOWNTOWN_LA, place(34.0537, -118.2428, "Los Angeles", "CA", "90012"))
        .with_entry(BOSTON, place(42.3505, -71.1054, "Boston", "MA", "02215"))
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Start a server after adjusting the test configuration
    pub async fn spawn_with(tweak: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let upload_dir = tempfile::tempdir().context("failed to create upload dir")?;

        let mut config = AppConfig::development();
        config.upload.file_upload_path = upload_dir.path().to_path_buf();
        config.upload.max_file_upload = 1_000_000;
        tweak(&mut config);
        let secret = config.security.jwt_secret.clone();

        let state = AppState::in_memory(config, Arc::new(geocoder()));

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, devcamp_api::app(state)).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            upload_dir,
            secret,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Fresh identity with a signed bearer token
    pub fn actor(&self, role: Role) -> Actor {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, role, 1).expect("test token claims");
        let token = generate_jwt(&claims, &self.secret).expect("sign test token");
        Actor { id, token }
    }

    pub async fn create_bootcamp(&self, actor: &Actor, name: &str, address: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/bootcamps"))
            .bearer_auth(&actor.token)
            .json(&bootcamp_body(name, address))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create bootcamp failed: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }
}

pub struct Actor {
    pub id: Uuid,
    pub token: String,
}

pub fn bootcamp_body(name: &str, address: &str) -> Value {
    json!({
        "name": name,
        "description": format!("{} teaches full stack web development", name),
        "website": "https://example.com",
        "phone": "(111) 111-1111",
        "email": "enroll@example.com",
        "address": address,
        "careers": ["Web Development", "UI/UX"],
        "averageCost": 10000,
        "housing": true,
        "jobAssistance": true
    })
}
