//! Middleware feeding the request log.

use crate::LOG_PATH;
use api_shared::{RequestLog, RequestLogEntry};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Records every inbound request in the request log before dispatching it.
///
/// Reads of the log itself are not recorded, otherwise a polling reader would fill the log
/// with its own requests.
pub(crate) async fn record_request(
    State(request_log): State<RequestLog>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() != LOG_PATH {
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok());
        let entry = RequestLogEntry::new(
            request.method().as_str(),
            request.uri().path(),
            user_agent,
        );
        request_log.append(entry).await;
    }

    next.run(request).await
}
