use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::{ProvisionError, Result},
    models::company::{Company, CompanyRow, ExistingService},
};

/// System-of-record access for tenants.
///
/// Implementations must return `NotFound` for a missing row and
/// `StoreUnavailable` for any infrastructure failure, so callers can tell a
/// permanent absence from something worth retrying.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn fetch_company(&self, company_id: &str) -> Result<CompanyRow>;

    /// Persist the provisioned endpoint. Errors are `Persistence`.
    async fn record_service(&self, company_id: &str, service_id: &str, service_url: &str)
        -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct TenantResolver {
    store: Arc<dyn TenantStore>,
}

impl TenantResolver {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    /// Checks a raw trigger value without touching the store.
    pub fn validate_id(company_id: &str) -> Result<&str> {
        let id = company_id.trim();
        if id.is_empty() {
            return Err(ProvisionError::InvalidInput("company_id is required".into()));
        }
        Ok(id)
    }

    pub async fn resolve(&self, company_id: &str) -> Result<Company> {
        let id = Self::validate_id(company_id)?;
        let row = self.store.fetch_company(id).await?;
        into_company(row)
    }
}

fn into_company(row: CompanyRow) -> Result<Company> {
    let id = row.id;
    let field = |value: Option<String>, name: &str| {
        value
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ProvisionError::InvalidInput(format!("company {id} has no {name}")))
    };

    let owner_id = field(row.owner_id, "owner_id")?;
    let whatsapp_api_token = field(row.whatsapp_api_token, "whatsapp_api_token")?;
    let whatsapp_phone_id = field(row.whatsapp_phone_id, "whatsapp_phone_id")?;
    let whatsapp_verify_token = field(row.whatsapp_verify_token, "whatsapp_verify_token")?;

    let existing_service = match (row.service_id, row.service_url) {
        (Some(service_id), Some(service_url)) if !service_url.is_empty() => Some(ExistingService {
            service_id,
            service_url,
        }),
        _ => None,
    };

    Ok(Company {
        id,
        owner_id,
        name: row.name,
        whatsapp_api_token,
        whatsapp_phone_id,
        whatsapp_verify_token,
        existing_service,
    })
}
