use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::infrastructure::error::ReviewError;
use crate::review::{ModelResponse, ReviewRequest};
use crate::web::state::AppState;
use crate::web::templates::PageContext;

pub const NO_CODE_MESSAGE: &str = "No code provided!";

fn page(state: &AppState, context: &PageContext) -> Response {
    match state.pages.render(context) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error = %err, "failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
    }
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Response {
    page(&state, &PageContext::default())
}

/// Raw form fields of one submission.
#[derive(Debug, Default)]
struct ReviewForm {
    upload: Option<(String, Vec<u8>)>,
    edited_code: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<ReviewForm, String> {
    let mut form = ReviewForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| e.body_text())?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| e.body_text())?;
                form.upload = Some((filename, data.to_vec()));
            }
            Some("edited_code") => {
                form.edited_code = Some(field.text().await.map_err(|e| e.body_text())?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /review
///
/// Every outcome is a 200 page; failures show up as the inline error.
pub async fn review(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let form = match multipart {
        Ok(multipart) => read_form(multipart).await,
        Err(rejection) => Err(rejection.body_text()),
    };
    let form = match form {
        Ok(form) => form,
        Err(message) => {
            warn!(%message, "rejected review form");
            return page(
                &state,
                &PageContext::with_error(format!("Invalid form submission: {message}")),
            );
        }
    };

    let request = match ReviewRequest::from_form(
        form.upload,
        form.edited_code,
        &state.config.file_type,
    ) {
        Ok(request) => request,
        Err(ReviewError::EmptyInput) => {
            return page(&state, &PageContext::with_error(NO_CODE_MESSAGE));
        }
        Err(err) => return page(&state, &PageContext::with_error(err.to_string())),
    };
    info!(origin = ?request.origin(), chars = request.source_text().len(), "review submitted");

    let context = match state.service.review(&request).await {
        Ok(outcome) => PageContext::reviewed(request.source_text(), outcome),
        Err(err) => PageContext::failed(
            request.source_text(),
            ModelResponse::Failed(err).raw_text(),
        ),
    };

    page(&state, &context)
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
