use std::fmt;

use serde::{Serialize, Serializer};

/// The remote calls made against the deployment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisioningStep {
    CreateService,
    SetVariables,
    TriggerDeploy,
    DeleteService,
}

impl ProvisioningStep {
    pub fn label(self) -> &'static str {
        match self {
            Self::CreateService => "create service",
            Self::SetVariables => "set variables",
            Self::TriggerDeploy => "trigger deploy",
            Self::DeleteService => "delete service",
        }
    }
}

impl fmt::Display for ProvisioningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for ProvisioningStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// What the provider needs to create a tenant's service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSpec {
    pub name: String,
    /// `owner/repo` path of the bot template.
    pub repo: String,
    pub branch: String,
    pub private: bool,
}

/// A service as returned by the create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedService {
    pub id: String,
    pub name: String,
    pub domains: Vec<String>,
}

/// Workflow position. `Failed` absorbs; nothing leaves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningState {
    Idle,
    ServiceCreated(CreatedService),
    VariablesSet(CreatedService),
    DeployTriggered(CreatedService),
    Completed {
        service_id: String,
        service_url: String,
    },
    Failed {
        step: ProvisioningStep,
        cause: String,
    },
}

impl ProvisioningState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ServiceCreated(_) => "service_created",
            Self::VariablesSet(_) => "variables_set",
            Self::DeployTriggered(_) => "deploy_triggered",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn service(&self) -> Option<&CreatedService> {
        match self {
            Self::ServiceCreated(s) | Self::VariablesSet(s) | Self::DeployTriggered(s) => Some(s),
            _ => None,
        }
    }
}

/// Dry-run view of what a provisioning run would do.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningPlan {
    pub company_id: String,
    pub service: ServiceSpec,
    pub variables: Vec<String>,
    pub existing_service_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub service_id: String,
    pub service_url: String,
    /// True when an already-provisioned service was returned without provider calls.
    pub reused: bool,
    /// False when the endpoint could not be written back to the company.
    pub recorded: bool,
}
