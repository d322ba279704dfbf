use axum::{body::Bytes, extract::State, Json};
use tracing::{error, info};

use crate::{
    error::ProvisionError,
    middleware::api_key::ProvisionAuth,
    models::company::{ProvisionRequest, ProvisionResponse},
    AppState,
};

/// POST /provision-free-bot with body `{ "company_id": "..." }`.
/// The body is parsed as JSON whatever `Content-Type` says.
pub async fn provision_free_bot(
    State(state): State<AppState>,
    _auth: ProvisionAuth,
    payload: Bytes,
) -> Result<Json<ProvisionResponse>, ProvisionError> {
    let body: ProvisionRequest = serde_json::from_slice(&payload)
        .map_err(|e| ProvisionError::InvalidInput(format!("Invalid JSON body: {e}")))?;
    let company_id = body.company_id.unwrap_or_default();

    let outcome = state.provisioner.provision(&company_id).await.map_err(|e| {
        error!(company_id = %company_id, error_kind = e.kind(), "provisioning failed: {e}");
        e
    })?;

    let message = if outcome.reused {
        "Bot already provisioned"
    } else {
        "Bot provisioned and deployment triggered"
    };
    info!(company_id = %company_id, service_url = %outcome.service_url, "{message}");

    Ok(Json(ProvisionResponse {
        message: message.to_string(),
        service_id: outcome.service_id,
        service_url: outcome.service_url,
    }))
}
