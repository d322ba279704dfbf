//! Shared fakes and fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Response, Router};
use serde::de::DeserializeOwned;

use zappybot_provisioner::{
    config::Config,
    create_app,
    models::{
        company::CompanyRow,
        deployment::{CreatedService, ProvisioningStep, ServiceSpec},
    },
    services::{
        provisioner::{ProvisioningSettings, Provisioner, StepTimeouts},
        railway::DeploymentProvider,
        resolver::TenantStore,
        secrets::{SecretBundle, SharedSecrets},
    },
    AppState, ProvisionError, Result,
};

// ─── Tenant store ────────────────────────────────────────────────────────────

/// In-memory `companies` table with call counting and failure switches.
#[derive(Default)]
pub struct MemoryStore {
    companies: Mutex<HashMap<String, CompanyRow>>,
    fetch_calls: AtomicUsize,
    unavailable: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn with_company(row: CompanyRow) -> Self {
        let store = Self::default();
        store.companies.lock().unwrap().insert(row.id.clone(), row);
        store
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn company(&self, id: &str) -> Option<CompanyRow> {
        self.companies.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn fetch_company(&self, company_id: &str) -> Result<CompanyRow> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(ProvisionError::StoreUnavailable("connection refused".into()));
        }
        self.company(company_id)
            .ok_or_else(|| ProvisionError::NotFound(company_id.to_string()))
    }

    async fn record_service(
        &self,
        company_id: &str,
        service_id: &str,
        service_url: &str,
    ) -> Result<()> {
        if self.fail_writes {
            return Err(ProvisionError::Persistence("write rejected".into()));
        }
        let mut companies = self.companies.lock().unwrap();
        let row = companies
            .get_mut(company_id)
            .ok_or_else(|| ProvisionError::Persistence(format!("no company row for {company_id}")))?;
        row.service_id = Some(service_id.to_string());
        row.service_url = Some(service_url.to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        if self.unavailable {
            return Err(ProvisionError::StoreUnavailable("connection refused".into()));
        }
        Ok(())
    }
}

// ─── Deployment provider ─────────────────────────────────────────────────────

/// Provider double that records every call and fails or hangs on demand.
pub struct ScriptedProvider {
    service_id: String,
    domains: Vec<String>,
    fail_at: Vec<ProvisioningStep>,
    hang_at: Option<ProvisioningStep>,
    calls: Mutex<Vec<ProvisioningStep>>,
    specs: Mutex<Vec<ServiceSpec>>,
    variables: Mutex<Option<SecretBundle>>,
    deleted: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(service_id: &str) -> Self {
        Self {
            service_id: service_id.to_string(),
            domains: Vec::new(),
            fail_at: Vec::new(),
            hang_at: None,
            calls: Mutex::new(Vec::new()),
            specs: Mutex::new(Vec::new()),
            variables: Mutex::new(None),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_domains(mut self, domains: &[&str]) -> Self {
        self.domains = domains.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Fails every call to `step`. Chain to fail several steps.
    pub fn failing_at(mut self, step: ProvisioningStep) -> Self {
        self.fail_at.push(step);
        self
    }

    pub fn hanging_at(mut self, step: ProvisioningStep) -> Self {
        self.hang_at = Some(step);
        self
    }

    pub fn calls(&self) -> Vec<ProvisioningStep> {
        self.calls.lock().unwrap().clone()
    }

    pub fn specs(&self) -> Vec<ServiceSpec> {
        self.specs.lock().unwrap().clone()
    }

    pub fn variables(&self) -> Option<SecretBundle> {
        self.variables.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    async fn enter(&self, step: ProvisioningStep) -> Result<()> {
        self.calls.lock().unwrap().push(step);
        if self.hang_at == Some(step) {
            std::future::pending::<()>().await;
        }
        if self.fail_at.contains(&step) {
            return Err(ProvisionError::external(step, format!("{step} rejected by provider")));
        }
        Ok(())
    }
}

#[async_trait]
impl DeploymentProvider for ScriptedProvider {
    async fn create_service(&self, spec: &ServiceSpec) -> Result<CreatedService> {
        self.enter(ProvisioningStep::CreateService).await?;
        self.specs.lock().unwrap().push(spec.clone());
        Ok(CreatedService {
            id: self.service_id.clone(),
            name: spec.name.clone(),
            domains: self.domains.clone(),
        })
    }

    async fn set_variables(&self, _service_id: &str, variables: &SecretBundle) -> Result<()> {
        self.enter(ProvisioningStep::SetVariables).await?;
        *self.variables.lock().unwrap() = Some(variables.clone());
        Ok(())
    }

    async fn trigger_deploy(&self, _service_id: &str) -> Result<()> {
        self.enter(ProvisioningStep::TriggerDeploy).await
    }

    async fn delete_service(&self, service_id: &str) -> Result<()> {
        self.enter(ProvisioningStep::DeleteService).await?;
        self.deleted.lock().unwrap().push(service_id.to_string());
        Ok(())
    }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub fn elite_renovations() -> CompanyRow {
    CompanyRow {
        id: "abc123".into(),
        owner_id: Some("u1".into()),
        name: "Elite Renovations".into(),
        whatsapp_api_token: Some("tok".into()),
        whatsapp_phone_id: Some("pid".into()),
        whatsapp_verify_token: Some("vtok".into()),
        service_id: None,
        service_url: None,
    }
}

pub fn test_settings() -> ProvisioningSettings {
    ProvisioningSettings {
        service_name_prefix: "zappybot".into(),
        repo: "zappy/bot-template".into(),
        branch: "main".into(),
        private_repo: true,
        platform_domain_suffix: "up.railway.app".into(),
        webhook_path: "/webhook".into(),
        timeouts: StepTimeouts::uniform(Duration::from_secs(5)),
        shared: SharedSecrets {
            openai_api_key: "sk-test".into(),
            supabase_url: "https://db.example.co".into(),
            supabase_key: "service-role".into(),
        },
        reuse_existing_service: false,
        rollback_on_failure: false,
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://localhost/zappy_test"),
        ("RAILWAY_API_TOKEN", "rw-token"),
        ("RAILWAY_PROJECT_ID", "proj-1"),
        ("RAILWAY_ENVIRONMENT_ID", "env-1"),
        ("TEMPLATE_REPO_URL", "https://github.com/zappy/bot-template.git"),
        ("OPENAI_API_KEY", "sk-test"),
        ("SUPABASE_URL", "https://db.example.co"),
        ("SUPABASE_SERVICE_ROLE_KEY", "service-role"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|k| env.get(k).cloned()).expect("test config")
}

pub fn provisioner(
    store: &Arc<MemoryStore>,
    provider: &Arc<ScriptedProvider>,
    settings: ProvisioningSettings,
) -> Provisioner {
    Provisioner::new(store.clone(), provider.clone(), settings)
}

/// Router wired to the given fakes, as `main` wires the real collaborators.
pub fn test_app(
    config: Config,
    store: &Arc<MemoryStore>,
    provider: &Arc<ScriptedProvider>,
) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: store.clone(),
        provisioner: Arc::new(provisioner(store, provider, test_settings())),
    };
    create_app(state)
}

pub async fn extract_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Failed to parse JSON body")
}
