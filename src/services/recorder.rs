use std::sync::Arc;

use tracing::{info, warn};

use crate::{error::Result, services::metrics, services::resolver::TenantStore};

/// Writes the resolved endpoint back onto the company.
#[derive(Clone)]
pub struct OutcomeRecorder {
    store: Arc<dyn TenantStore>,
}

impl OutcomeRecorder {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    pub async fn record(&self, company_id: &str, service_id: &str, service_url: &str) -> Result<()> {
        self.store
            .record_service(company_id, service_id, service_url)
            .await?;
        info!(company_id, service_id, service_url, "service endpoint recorded");
        Ok(())
    }

    /// Like `record`, but a failure is logged and counted instead of
    /// returned: the deployment exists either way. Returns whether the write
    /// landed.
    pub async fn record_or_warn(&self, company_id: &str, service_id: &str, service_url: &str) -> bool {
        match self.record(company_id, service_id, service_url).await {
            Ok(()) => true,
            Err(e) => {
                metrics::PERSISTENCE_FAILURES_COUNTER.inc();
                warn!(
                    company_id,
                    service_id,
                    service_url,
                    error_kind = e.kind(),
                    error = %e,
                    "service deployed but endpoint was not recorded"
                );
                false
            }
        }
    }
}
