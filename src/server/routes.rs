use crate::config::DispatchConfig;
use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            content_type: "application/json",
            body,
        }
    }
}

/// Strip the query string and any trailing slash; `/optimise/` and `/optimise` are one route.
fn normalize_path(path: &str) -> &str {
    let path = path.split('?').next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

pub fn route_request(
    config: &DispatchConfig,
    method: &str,
    path: &str,
    body: &str,
) -> HttpResponse {
    match (method, normalize_path(path)) {
        ("GET", "/") => match api::root_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "internal_error", &err.to_string()),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "internal_error", &err.to_string()),
        },
        ("GET", "/api/config") => match api::config_payload(config) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "internal_error", &err.to_string()),
        },
        ("POST", "/optimise") | ("POST", "/api/optimize") => {
            match api::optimize_payload(body, config) {
                Ok(payload) => HttpResponse::json(payload),
                Err(err) => optimize_error_response(err),
            }
        }
        _ => error_response(404, "not_found", "Route not found"),
    }
}

fn optimize_error_response(err: api::OptimizePayloadError) -> HttpResponse {
    match err {
        api::OptimizePayloadError::Parse(err) => error_response(
            400,
            "invalid_body",
            &format!("Invalid request body: {err}"),
        ),
        api::OptimizePayloadError::Validation(validation) => validation_error_response(validation),
        api::OptimizePayloadError::CostProvider(err) => {
            error_response(502, err.code(), &err.to_string())
        }
        api::OptimizePayloadError::Serialize(err) => {
            tracing::error!(%err, "failed to serialize optimize response");
            error_response(500, "internal_error", &err.to_string())
        }
    }
}

fn validation_error_response(payload: api::ValidationErrorResponse) -> HttpResponse {
    let fallback = "{\n  \"status\": \"error\",\n  \"code\": \"validation_error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code: 400,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(status_code: u16, code: &'static str, message: &str) -> HttpResponse {
    let payload = api::ProviderErrorResponse {
        status: "error",
        code,
        message: message.to_string(),
    };
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|_| "{\"status\": \"error\"}".to_string()),
    }
}
