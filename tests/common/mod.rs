#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use ai_review::config::ServerConfig;
use ai_review::core::ai::{AIProvider, PromptBuilder};
use ai_review::infrastructure::{Result, ReviewError};
use ai_review::review::ReviewService;
use ai_review::web::{self, AppState, PageRenderer};

pub const BOUNDARY: &str = "ai-review-test-boundary";

/// Provider stub that records prompts and returns a canned reply.
pub struct StubProvider {
    reply: std::result::Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl AIProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .map_err(|message| ReviewError::request("stub", message))
    }
}

pub fn service(provider: Arc<StubProvider>) -> Arc<ReviewService> {
    Arc::new(ReviewService::new(provider, PromptBuilder::new()))
}

pub fn build_test_app(provider: Arc<StubProvider>) -> Router {
    build_test_app_with(provider, ServerConfig::default())
}

pub fn build_test_app_with(provider: Arc<StubProvider>, config: ServerConfig) -> Router {
    let state = AppState::new(service(provider), PageRenderer::new().unwrap(), config);
    web::router(state)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub enum Part<'a> {
    File { filename: &'a str, content: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { filename, content } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_review(app: Router, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::post("/review")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
