use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Raw `companies` row as stored by the dashboard. Channel credentials are
/// nullable until the tenant fills in their settings.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyRow {
    pub id: String,
    pub owner_id: Option<String>,
    pub name: String,
    pub whatsapp_api_token: Option<String>,
    pub whatsapp_phone_id: Option<String>,
    pub whatsapp_verify_token: Option<String>,
    pub service_id: Option<String>,
    pub service_url: Option<String>,
}

/// A tenant with everything provisioning needs.
#[derive(Clone, PartialEq, Eq)]
pub struct Company {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub whatsapp_api_token: String,
    pub whatsapp_phone_id: String,
    pub whatsapp_verify_token: String,
    pub existing_service: Option<ExistingService>,
}

impl std::fmt::Debug for Company {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Company")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("name", &self.name)
            .field("whatsapp_phone_id", &self.whatsapp_phone_id)
            .field("existing_service", &self.existing_service)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingService {
    pub service_id: String,
    pub service_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProvisionRequest {
    #[serde(default)]
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionResponse {
    pub message: String,
    pub service_id: String,
    pub service_url: String,
}
