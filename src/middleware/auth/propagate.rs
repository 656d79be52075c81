//! Renewal propagation.
//!
//! Wraps the inner service (gate + handler) and, when the gate staged a
//! `RenewalOutcome` on the response, hands the new credential to the caller
//! through the route family's delivery channels. The outcome is removed from
//! the response as it is read, so it is applied at most once.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::AppError;
use crate::middleware::auth::credential::DeliveryChannels;
use crate::services::auth::{cookies::CookiePolicy, renewal::RenewalOutcome, token::Credential};

/// Field name merged into JSON bodies on families that deliver through the body.
pub const TOKEN_FIELD: &str = "token";

#[derive(Clone, Copy, Debug)]
pub struct PropagateState {
    pub delivery: DeliveryChannels,
    pub cookies: CookiePolicy,
}

pub async fn propagate_renewal(
    State(propagate): State<PropagateState>,
    req: Request,
    next: Next,
) -> Response {
    let mut res = next.run(req).await;

    let Some(credential) = res
        .extensions_mut()
        .remove::<RenewalOutcome>()
        .and_then(|outcome| outcome.credential)
    else {
        return res;
    };

    attach(res, &credential, propagate).await
}

async fn attach(mut res: Response, credential: &Credential, propagate: PropagateState) -> Response {
    let delivery = propagate.delivery;

    if delivery.header {
        match HeaderValue::try_from(format!("Bearer {}", credential.as_str())) {
            Ok(value) => {
                res.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => tracing::warn!(error = %e, "renewed credential is not a valid header value"),
        }
    }

    if delivery.cookie {
        propagate
            .cookies
            .append_session_cookies(res.headers_mut(), credential);
    }

    if delivery.json_body && is_json(res.headers()) {
        res = merge_token_field(res, credential.as_str()).await;
    }

    res
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("application/json"))
}

/// Bodies that are not JSON objects are passed through byte-for-byte.
async fn merge_token_field(res: Response, token: &str) -> Response {
    let (mut parts, body) = res.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to buffer response body for token merge");
            return AppError::Internal.into_response();
        }
    };

    let merged = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) => {
            map.insert(TOKEN_FIELD.to_string(), Value::String(token.to_string()));
            serde_json::to_vec(&map).ok()
        }
        _ => None,
    };

    match merged {
        Some(body) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}
