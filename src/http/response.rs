//! Caller-facing responses.
//!
//! | Result                        | Status              | Body                               |
//! |-------------------------------|---------------------|------------------------------------|
//! | delivered                     | 200                 | `Message sent to Discord`          |
//! | destination rejected          | destination's status| `Failed to send to Discord: {text}`|
//! | read/format/transport failure | 500                 | `Error: {message}`                 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::relay::{DispatchOutcome, RelayError};

pub const DELIVERED_BODY: &str = "Message sent to Discord";

impl IntoResponse for DispatchOutcome {
    fn into_response(self) -> Response {
        match self {
            DispatchOutcome::Delivered => (StatusCode::OK, DELIVERED_BODY).into_response(),
            DispatchOutcome::Rejected {
                status,
                status_text,
            } => (status, format!("Failed to send to Discord: {}", status_text)).into_response(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", self)).into_response()
    }
}
