#![allow(dead_code)]

use actix_web::{
    middleware::NormalizePath,
    web, App, HttpRequest, HttpResponse, HttpServer,
};
use hotel_gateway::{
    handlers::home::not_found,
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use parking_lot::Mutex;
use reqwest::Client;
use std::{collections::HashMap, net::TcpListener, sync::Arc, time::Duration};

#[derive(Clone)]
pub struct TestApp {
    pub state: web::Data<AppState>,
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn spawn(config: AppConfig) -> Self {
        let state = web::Data::new(AppState::new(&config).expect("Failed to build app state"));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state_clone = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(state_clone.clone())
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
                .default_service(web::to(not_found))
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&address).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            state,
            address,
            client,
            config,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
    }
}

pub fn test_config(upstream: &str) -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Hotel Gateway Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        cors_allowed_origins: vec!["*".to_string()],
        cms_base_url: Some(upstream.to_string()),
        cms_page_size: 50,
        cms_cache_ttl_secs: 0,
        booking_service_url: Some(format!("{}/api", upstream)),
        contact_service_url: Some(format!("{}/api", upstream)),
        recaptcha_secret_key: Some("test-recaptcha-secret".to_string()),
        recaptcha_min_score: 0.5,
        recaptcha_verify_url: format!("{}/recaptcha/api/siteverify", upstream),
        recaptcha_rate_limit: 10,
        rate_limit_window_secs: 60,
        redis_url: None,
        upstream_timeout_secs: 2,
        trust_forwarded_for: true,
    }
}

/// An address nothing listens on.
pub fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[derive(Clone, Debug)]
pub struct Scripted {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub delay: Option<Duration>,
}

impl Scripted {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "application/json",
            delay: None,
        }
    }

    pub fn html(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "text/html; charset=UTF-8",
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            content_type: "text/plain",
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub content_type: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Recorded body is not JSON")
    }

    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(self.body.as_bytes())
            .into_owned()
            .collect()
    }
}

#[derive(Default)]
struct FakeState {
    routes: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Scripted stand-in for the CMS, the PHP scripts and siteverify.
///
/// Replies are keyed by path, or by `path?page=N` for paginated CMS
/// reads. Unscripted paths answer 404 JSON.
pub struct FakeUpstream {
    pub address: String,
    state: Arc<FakeState>,
}

impl FakeUpstream {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState::default());

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let data = web::Data::from(state.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .app_data(web::PayloadConfig::new(1024 * 1024))
                .default_service(web::to(respond))
        })
        .listen(listener)
        .expect("Failed to bind fake upstream")
        .workers(1)
        .run();

        tokio::spawn(server);

        Self { address, state }
    }

    pub fn script(&self, key: &str, reply: Scripted) {
        self.state.routes.lock().insert(key.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

async fn respond(req: HttpRequest, body: web::Bytes, state: web::Data<FakeState>) -> HttpResponse {
    let path = req.path().to_string();
    let query = req.query_string().to_string();

    state.requests.lock().push(RecordedRequest {
        method: req.method().to_string(),
        path: path.clone(),
        query: query.clone(),
        content_type: req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    let page = url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned());

    let scripted = {
        let routes = state.routes.lock();
        page.and_then(|p| routes.get(&format!("{}?page={}", path, p)).cloned())
            .or_else(|| routes.get(&path).cloned())
    };

    let Some(reply) = scripted else {
        return HttpResponse::NotFound()
            .json(serde_json::json!({ "code": "rest_no_route", "message": "No route was found" }));
    };

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    HttpResponse::build(actix_web::http::StatusCode::from_u16(reply.status).unwrap())
        .content_type(reply.content_type)
        .body(reply.body)
}

pub fn valid_booking() -> serde_json::Value {
    let check_in = chrono::Utc::now().date_naive() + chrono::Duration::days(10);
    let check_out = check_in + chrono::Duration::days(3);

    serde_json::json!({
        "fullName": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "+1 (555) 010-2030",
        "checkIn": check_in.to_string(),
        "checkOut": check_out.to_string(),
        "adults": 2,
        "children": 1,
        "roomType": "deluxe-king",
        "specialRequests": "Late arrival"
    })
}

pub fn valid_contact() -> serde_json::Value {
    serde_json::json!({
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "message": "Do you have parking on site?",
        "recaptchaToken": "03AGdBq24PBCbwiDRaS_MJ7Z"
    })
}

pub fn recaptcha_token() -> String {
    "03AGdBq24PBCbwiDRaS_MJ7Z-".repeat(4)
}
