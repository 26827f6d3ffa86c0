//! HTTP middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{Level, info, warn};

use super::responses::EXECUTION_TIME_HEADER;

const FAVICON_ROUTE_PREFIX: &str = "/favicon/";

/// Per-request log line fields
#[derive(Debug, Default, PartialEq, Eq)]
struct RequestSummary {
    domain: Option<String>,
    execution_time: Option<String>,
}

impl RequestSummary {
    fn new(path: &str, response: &Response) -> Self {
        let domain = path
            .strip_prefix(FAVICON_ROUTE_PREFIX)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
        let execution_time = response
            .headers()
            .get(EXECUTION_TIME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self {
            domain,
            execution_time,
        }
    }
}

/// Completion level for a status code
///
/// 4xx and 5xx go to `warn`, which includes placeholder glyphs served with 404.
fn completion_level(status: u16) -> Level {
    if status >= 400 { Level::WARN } else { Level::INFO }
}

/// Logs each request with a request id, the favicon domain it asked for,
/// the resolver's own execution time and the total duration
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let summary = RequestSummary::new(&path, &response);
    let duration_ms = start.elapsed().as_millis();

    let domain = summary.domain.as_deref().unwrap_or("-");
    let execution_time = summary.execution_time.as_deref().unwrap_or("-");

    if completion_level(status) == Level::WARN {
        warn!(
            %request_id,
            %method,
            path = %path,
            domain,
            status,
            execution_time,
            duration_ms,
            "Request failed"
        );
    } else {
        info!(
            %request_id,
            %method,
            path = %path,
            domain,
            status,
            execution_time,
            duration_ms,
            "Request served"
        );
    }

    response
}
