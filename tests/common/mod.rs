#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::{ApplicationSettings, DatabaseSettings, JwtSettings, Settings};
use chirpy::db::MemoryStore;
use chirpy::startup::run;
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            in_memory: true,
            ..DatabaseSettings::default()
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_dir: "./public".to_string(),
        },
        jwt: JwtSettings {
            secret: TEST_SECRET.to_string(),
            issuer: "chirpy".to_string(),
            access_token_expiry: 3600,
            max_access_token_expiry: 3600,
            refresh_token_expiry: 60 * 24 * 3600,
        },
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_settings("dev"))
}

pub fn spawn_app_with(settings: Settings) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, Arc::new(MemoryStore::new()), &settings)
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str, expires_in: Option<i64>) -> reqwest::Response {
        let mut body = json!({ "email": email, "password": password });
        if let Some(seconds) = expires_in {
            body["expires_in_seconds"] = json!(seconds);
        }

        self.client
            .post(self.url("/api/login"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in, returning the login response body
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        assert_eq!(201, self.create_user(email, password).await.status().as_u16());

        let response = self.login(email, password, None).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
