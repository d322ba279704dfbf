use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{ProvisionError, Result},
    models::{
        company::Company,
        deployment::{
            ProvisionOutcome, ProvisioningPlan, ProvisioningState, ProvisioningStep, ServiceSpec,
        },
    },
    services::{
        metrics,
        naming::{derive_repo_path, derive_service_name, resolve_endpoint},
        railway::DeploymentProvider,
        recorder::OutcomeRecorder,
        resolver::{TenantResolver, TenantStore},
        secrets::{SecretBundle, SharedSecrets},
    },
};

#[derive(Debug, Clone, Copy)]
pub struct StepTimeouts {
    pub create_service: Duration,
    pub set_variables: Duration,
    pub trigger_deploy: Duration,
}

impl StepTimeouts {
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            create_service: timeout,
            set_variables: timeout,
            trigger_deploy: timeout,
        }
    }

    pub fn for_step(&self, step: ProvisioningStep) -> Duration {
        match step {
            ProvisioningStep::CreateService | ProvisioningStep::DeleteService => self.create_service,
            ProvisioningStep::SetVariables => self.set_variables,
            ProvisioningStep::TriggerDeploy => self.trigger_deploy,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    pub service_name_prefix: String,
    /// `owner/repo` of the bot template.
    pub repo: String,
    pub branch: String,
    pub private_repo: bool,
    pub platform_domain_suffix: String,
    pub webhook_path: String,
    pub timeouts: StepTimeouts,
    pub shared: SharedSecrets,
    /// Return the stored service instead of creating another one.
    pub reuse_existing_service: bool,
    /// Delete the created service when a later step fails.
    pub rollback_on_failure: bool,
}

impl ProvisioningSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let repo = derive_repo_path(&config.template_repo_url).ok_or_else(|| {
            ProvisionError::Config(format!(
                "TEMPLATE_REPO_URL does not name an owner/repo: {}",
                config.template_repo_url
            ))
        })?;

        if derive_service_name(&config.service_name_prefix, "").is_empty() {
            return Err(ProvisionError::Config(
                "SERVICE_NAME_PREFIX must contain at least one alphanumeric character".into(),
            ));
        }

        Ok(Self {
            service_name_prefix: config.service_name_prefix.clone(),
            repo,
            branch: config.template_branch.clone(),
            private_repo: config.template_repo_private,
            platform_domain_suffix: config.platform_domain_suffix.clone(),
            webhook_path: config.webhook_path.clone(),
            timeouts: StepTimeouts {
                create_service: config.create_service_timeout(),
                set_variables: config.set_variables_timeout(),
                trigger_deploy: config.trigger_deploy_timeout(),
            },
            shared: SharedSecrets {
                openai_api_key: config.openai_api_key.clone(),
                supabase_url: config.supabase_url.clone(),
                supabase_key: config.supabase_service_role_key.clone(),
            },
            reuse_existing_service: config.reuse_existing_service,
            rollback_on_failure: config.rollback_on_failure,
        })
    }
}

/// Drives a tenant's bot deployment: resolve the company, create the service,
/// inject its variables, deploy, then record the webhook URL.
///
/// Every run creates a new service unless `reuse_existing_service` is set.
/// Nothing is retried. A run dropped mid-flight leaves whatever the provider
/// already created.
#[derive(Clone)]
pub struct Provisioner {
    resolver: TenantResolver,
    recorder: OutcomeRecorder,
    provider: Arc<dyn DeploymentProvider>,
    settings: ProvisioningSettings,
}

impl Provisioner {
    pub fn new(
        store: Arc<dyn TenantStore>,
        provider: Arc<dyn DeploymentProvider>,
        settings: ProvisioningSettings,
    ) -> Self {
        Self {
            resolver: TenantResolver::new(store.clone()),
            recorder: OutcomeRecorder::new(store),
            provider,
            settings,
        }
    }

    pub fn service_spec(&self, company: &Company) -> ServiceSpec {
        ServiceSpec {
            name: derive_service_name(&self.settings.service_name_prefix, &company.name),
            repo: self.settings.repo.clone(),
            branch: self.settings.branch.clone(),
            private: self.settings.private_repo,
        }
    }

    /// Resolves the company and reports what a run would create, without
    /// calling the provider.
    pub async fn plan(&self, company_id: &str) -> Result<ProvisioningPlan> {
        let company = self.resolver.resolve(company_id).await?;
        let bundle = SecretBundle::for_company(&company, &self.settings.shared);

        Ok(ProvisioningPlan {
            company_id: company.id.clone(),
            service: self.service_spec(&company),
            variables: bundle.keys().map(str::to_string).collect(),
            existing_service_url: company.existing_service.map(|s| s.service_url),
        })
    }

    pub async fn provision(&self, company_id: &str) -> Result<ProvisionOutcome> {
        let span = info_span!(
            "provision",
            company_id = %company_id.trim(),
            run_id = %Uuid::new_v4()
        );
        let result = self.run(company_id).instrument(span).await;

        let outcome = match &result {
            Ok(o) if o.reused => "reused",
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::PROVISION_RUNS_COUNTER.with_label_values(&[outcome]).inc();
        result
    }

    async fn run(&self, company_id: &str) -> Result<ProvisionOutcome> {
        let company = self.resolver.resolve(company_id).await?;

        if let Some(existing) = &company.existing_service {
            if self.settings.reuse_existing_service {
                info!(service_id = %existing.service_id, "company already provisioned, reusing service");
                return Ok(ProvisionOutcome {
                    service_id: existing.service_id.clone(),
                    service_url: existing.service_url.clone(),
                    reused: true,
                    recorded: true,
                });
            }
            warn!(
                previous_service_id = %existing.service_id,
                "company already provisioned, creating another service"
            );
        }

        let spec = self.service_spec(&company);
        let bundle = SecretBundle::for_company(&company, &self.settings.shared);
        info!(service_name = %spec.name, repo = %spec.repo, "provisioning started");

        let mut state = ProvisioningState::Idle;
        let (service_id, service_url) = loop {
            let advanced = self.advance(&state, &spec, &bundle).await;
            let next = match advanced {
                Ok(next) => next,
                Err(err) => return Err(self.fail(state, err).await),
            };

            info!(
                from = state.label(),
                to = next.label(),
                service_id = next.service().map(|s| s.id.as_str()),
                "provisioning transition"
            );

            if let ProvisioningState::Completed {
                service_id,
                service_url,
            } = next
            {
                break (service_id, service_url);
            }
            state = next;
        };

        let recorded = self
            .recorder
            .record_or_warn(&company.id, &service_id, &service_url)
            .await;

        Ok(ProvisionOutcome {
            service_id,
            service_url,
            reused: false,
            recorded,
        })
    }

    async fn advance(
        &self,
        state: &ProvisioningState,
        spec: &ServiceSpec,
        bundle: &SecretBundle,
    ) -> Result<ProvisioningState> {
        match state {
            ProvisioningState::Idle => {
                let created = self
                    .call(ProvisioningStep::CreateService, self.provider.create_service(spec))
                    .await?;
                Ok(ProvisioningState::ServiceCreated(created))
            }
            ProvisioningState::ServiceCreated(service) => {
                self.call(
                    ProvisioningStep::SetVariables,
                    self.provider.set_variables(&service.id, bundle),
                )
                .await?;
                Ok(ProvisioningState::VariablesSet(service.clone()))
            }
            ProvisioningState::VariablesSet(service) => {
                self.call(
                    ProvisioningStep::TriggerDeploy,
                    self.provider.trigger_deploy(&service.id),
                )
                .await?;
                Ok(ProvisioningState::DeployTriggered(service.clone()))
            }
            ProvisioningState::DeployTriggered(service) => {
                if service.domains.is_empty() {
                    warn!(
                        service_id = %service.id,
                        "no public domain assigned yet, using platform hostname"
                    );
                }
                Ok(ProvisioningState::Completed {
                    service_id: service.id.clone(),
                    service_url: resolve_endpoint(
                        &service.domains,
                        &service.id,
                        &self.settings.platform_domain_suffix,
                        &self.settings.webhook_path,
                    ),
                })
            }
            ProvisioningState::Completed { .. } | ProvisioningState::Failed { .. } => {
                Ok(state.clone())
            }
        }
    }

    /// Runs one provider call under its step deadline. Whatever comes back is
    /// attributed to `step`.
    async fn call<T, F>(&self, step: ProvisioningStep, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let after = self.settings.timeouts.for_step(step);
        match tokio::time::timeout(after, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.step() == Some(step) => Err(e),
            Ok(Err(e)) => Err(ProvisionError::external(step, e.to_string())),
            Err(_) => Err(ProvisionError::Timeout { step, after }),
        }
    }

    async fn fail(&self, state: ProvisioningState, err: ProvisionError) -> ProvisionError {
        let Some(step) = err.step() else {
            return err;
        };
        metrics::STEP_FAILURES_COUNTER
            .with_label_values(&[step.label()])
            .inc();

        let failed = ProvisioningState::Failed {
            step,
            cause: err.to_string(),
        };
        error!(
            from = state.label(),
            to = failed.label(),
            step = step.label(),
            error_kind = err.kind(),
            error = %err,
            "provisioning step failed"
        );

        if let Some(service) = state.service() {
            if self.settings.rollback_on_failure {
                self.rollback(&service.id).await;
            } else {
                warn!(
                    service_id = %service.id,
                    resume_from = step.label(),
                    "service left partially provisioned"
                );
            }
        }
        err
    }

    async fn rollback(&self, service_id: &str) {
        match self
            .call(ProvisioningStep::DeleteService, self.provider.delete_service(service_id))
            .await
        {
            Ok(()) => info!(service_id, "rolled back partially provisioned service"),
            Err(e) => error!(
                service_id,
                error_kind = e.kind(),
                error = %e,
                "rollback failed, service must be removed manually"
            ),
        }
    }
}
