use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    config::Config,
    error::{ProvisionError, Result},
    models::deployment::{CreatedService, ProvisioningStep, ServiceSpec},
    services::secrets::SecretBundle,
};

/// The hosting platform that runs tenant bots.
#[async_trait]
pub trait DeploymentProvider: Send + Sync {
    async fn create_service(&self, spec: &ServiceSpec) -> Result<CreatedService>;

    async fn set_variables(&self, service_id: &str, variables: &SecretBundle) -> Result<()>;

    async fn trigger_deploy(&self, service_id: &str) -> Result<()>;

    async fn delete_service(&self, service_id: &str) -> Result<()>;
}

const SERVICE_CREATE: &str = r#"
mutation serviceCreate($input: ServiceCreateInput!) {
  serviceCreate(input: $input) {
    id
    name
    domains { serviceDomains { domain } }
  }
}"#;

const VARIABLES_UPSERT: &str = r#"
mutation variableCollectionUpsert($input: VariableCollectionUpsertInput!) {
  variableCollectionUpsert(input: $input)
}"#;

const SERVICE_DEPLOY: &str = r#"
mutation serviceInstanceDeploy($serviceId: String!, $environmentId: String!) {
  serviceInstanceDeploy(serviceId: $serviceId, environmentId: $environmentId)
}"#;

const SERVICE_DELETE: &str = r#"
mutation serviceDelete($id: String!) {
  serviceDelete(id: $id)
}"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceCreateData {
    service_create: ServiceNode,
}

#[derive(Deserialize)]
struct ServiceNode {
    id: String,
    name: String,
    #[serde(default)]
    domains: Option<ServiceDomains>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceDomains {
    #[serde(default)]
    service_domains: Vec<ServiceDomain>,
}

#[derive(Deserialize)]
struct ServiceDomain {
    domain: String,
}

/// GraphQL client for the Railway public API.
#[derive(Clone)]
pub struct RailwayClient {
    client: Client,
    api_url: String,
    api_token: String,
    project_id: String,
    environment_id: String,
}

impl RailwayClient {
    pub fn new(
        api_url: impl Into<String>,
        api_token: impl Into<String>,
        project_id: impl Into<String>,
        environment_id: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            api_token: api_token.into(),
            project_id: project_id.into(),
            environment_id: environment_id.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.railway_api_url.clone(),
            config.railway_api_token.clone(),
            config.railway_project_id.clone(),
            config.railway_environment_id.clone(),
        )
    }

    /// Single request primitive: a transport failure (non-2xx) and a remote
    /// `errors` payload both come back as `ExternalService` for `step`.
    async fn request<T: DeserializeOwned>(
        &self,
        step: ProvisioningStep,
        query: &str,
        variables: Value,
    ) -> Result<T> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| ProvisionError::external(step, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Railway {} returned {}: {}", step, status, text);
            return Err(ProvisionError::external(step, format!("HTTP {status}: {text}")));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| ProvisionError::external(step, format!("invalid response body: {e}")))?;

        if !body.errors.is_empty() {
            let message = body
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ProvisionError::external(step, message));
        }

        body.data
            .ok_or_else(|| ProvisionError::external(step, "response contained no data"))
    }
}

#[async_trait]
impl DeploymentProvider for RailwayClient {
    async fn create_service(&self, spec: &ServiceSpec) -> Result<CreatedService> {
        let variables = json!({
            "input": {
                "projectId": self.project_id,
                "name": spec.name,
                "branch": spec.branch,
                "source": {
                    "type": "github",
                    "repo": spec.repo,
                    "isPrivate": spec.private,
                },
            }
        });

        let data: ServiceCreateData = self
            .request(ProvisioningStep::CreateService, SERVICE_CREATE, variables)
            .await?;
        let node = data.service_create;

        Ok(CreatedService {
            id: node.id,
            name: node.name,
            domains: node
                .domains
                .map(|d| d.service_domains.into_iter().map(|s| s.domain).collect())
                .unwrap_or_default(),
        })
    }

    async fn set_variables(&self, service_id: &str, variables: &SecretBundle) -> Result<()> {
        let payload = json!({
            "input": {
                "projectId": self.project_id,
                "environmentId": self.environment_id,
                "serviceId": service_id,
                "variables": variables,
            }
        });

        let _: Value = self
            .request(ProvisioningStep::SetVariables, VARIABLES_UPSERT, payload)
            .await?;
        Ok(())
    }

    async fn trigger_deploy(&self, service_id: &str) -> Result<()> {
        let payload = json!({
            "serviceId": service_id,
            "environmentId": self.environment_id,
        });

        let _: Value = self
            .request(ProvisioningStep::TriggerDeploy, SERVICE_DEPLOY, payload)
            .await?;
        Ok(())
    }

    async fn delete_service(&self, service_id: &str) -> Result<()> {
        let _: Value = self
            .request(ProvisioningStep::DeleteService, SERVICE_DELETE, json!({ "id": service_id }))
            .await?;
        Ok(())
    }
}
