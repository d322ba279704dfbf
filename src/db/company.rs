use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::{ProvisionError, Result},
    models::company::CompanyRow,
    services::resolver::TenantStore,
};

/// `companies` table access. Ids are compared as text so callers can pass
/// any opaque identifier.
#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn fetch_company(&self, company_id: &str) -> Result<CompanyRow> {
        sqlx::query_as::<_, CompanyRow>(
            "SELECT id::TEXT AS id, owner_id::TEXT AS owner_id, name,
                    whatsapp_api_token, whatsapp_phone_id, whatsapp_verify_token,
                    service_id, service_url
             FROM public.companies
             WHERE id::TEXT = $1",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ProvisionError::StoreUnavailable(e.to_string()))?
        .ok_or_else(|| ProvisionError::NotFound(company_id.to_string()))
    }

    async fn record_service(
        &self,
        company_id: &str,
        service_id: &str,
        service_url: &str,
    ) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE public.companies
             SET service_id = $2, service_url = $3, service_provisioned_at = NOW()
             WHERE id::TEXT = $1",
        )
        .bind(company_id)
        .bind(service_id)
        .bind(service_url)
        .execute(&self.pool)
        .await
        .map_err(|e| ProvisionError::Persistence(e.to_string()))?;

        if updated.rows_affected() == 0 {
            return Err(ProvisionError::Persistence(format!(
                "no company row for {company_id}"
            )));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| ProvisionError::StoreUnavailable(e.to_string()))
    }
}
