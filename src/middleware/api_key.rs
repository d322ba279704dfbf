use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::AppState;

/// Extractor that checks `Authorization: Bearer <key>` against
/// `config.provision_api_key`. The scheme is case-insensitive, the token is
/// compared as sent. Passes everything through when no key is set.
pub struct ProvisionAuth;

impl FromRequestParts<AppState> for ProvisionAuth {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.provision_api_key.as_deref() else {
            return Ok(ProvisionAuth);
        };

        let provided = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token)
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing bearer token" })),
            ))?;

        if provided != expected {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid bearer token" })),
            ));
        }

        Ok(ProvisionAuth)
    }
}
