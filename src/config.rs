use std::env;
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    // Deployment provider
    pub railway_api_url: String,
    pub railway_api_token: String,
    pub railway_project_id: String,
    pub railway_environment_id: String,
    // Bot template
    pub template_repo_url: String,
    pub template_branch: String,
    pub template_repo_private: bool,
    pub service_name_prefix: String,
    pub platform_domain_suffix: String,
    pub webhook_path: String,
    // Shared secrets injected into every bot
    pub openai_api_key: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    // Step deadlines
    pub create_service_timeout_secs: u64,
    pub set_variables_timeout_secs: u64,
    pub trigger_deploy_timeout_secs: u64,
    pub reuse_existing_service: bool,
    pub rollback_on_failure: bool,
    pub provision_api_key: Option<String>,
}

const REQUIRED: &[&str] = &[
    "DATABASE_URL",
    "RAILWAY_API_TOKEN",
    "RAILWAY_PROJECT_ID",
    "RAILWAY_ENVIRONMENT_ID",
    "TEMPLATE_REPO_URL",
    "OPENAI_API_KEY",
    "SUPABASE_URL",
    "SUPABASE_SERVICE_ROLE_KEY",
];

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Every missing required
    /// key is reported at once so a cold start fails with one clear message.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&str> = REQUIRED.iter().copied().filter(|k| get(*k).is_none()).collect();
        if !missing.is_empty() {
            anyhow::bail!("Missing required env var(s): {}", missing.join(", "));
        }
        let required = |key: &str| get(key).unwrap_or_default();
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.into());

        Ok(Self {
            database_url: required("DATABASE_URL"),
            host: or("HOST", "0.0.0.0"),
            port: or("PORT", "8080").parse()?,
            railway_api_url: or("RAILWAY_API_URL", "https://backboard.railway.app/graphql/v2"),
            railway_api_token: required("RAILWAY_API_TOKEN"),
            railway_project_id: required("RAILWAY_PROJECT_ID"),
            railway_environment_id: required("RAILWAY_ENVIRONMENT_ID"),
            template_repo_url: required("TEMPLATE_REPO_URL"),
            template_branch: or("TEMPLATE_BRANCH", "main"),
            template_repo_private: parse_bool(&or("TEMPLATE_REPO_PRIVATE", "true"))?,
            service_name_prefix: or("SERVICE_NAME_PREFIX", "zappybot"),
            platform_domain_suffix: or("PLATFORM_DOMAIN_SUFFIX", "up.railway.app"),
            webhook_path: or("WEBHOOK_PATH", "/webhook"),
            openai_api_key: required("OPENAI_API_KEY"),
            supabase_url: required("SUPABASE_URL"),
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY"),
            create_service_timeout_secs: or("CREATE_SERVICE_TIMEOUT_SECS", "30").parse()?,
            set_variables_timeout_secs: or("SET_VARIABLES_TIMEOUT_SECS", "30").parse()?,
            trigger_deploy_timeout_secs: or("TRIGGER_DEPLOY_TIMEOUT_SECS", "60").parse()?,
            reuse_existing_service: parse_bool(&or("REUSE_EXISTING_SERVICE", "false"))?,
            rollback_on_failure: parse_bool(&or("ROLLBACK_ON_FAILURE", "false"))?,
            provision_api_key: get("PROVISION_API_KEY"),
        })
    }

    pub fn create_service_timeout(&self) -> Duration {
        Duration::from_secs(self.create_service_timeout_secs)
    }

    pub fn set_variables_timeout(&self) -> Duration {
        Duration::from_secs(self.set_variables_timeout_secs)
    }

    pub fn trigger_deploy_timeout(&self) -> Duration {
        Duration::from_secs(self.trigger_deploy_timeout_secs)
    }
}

/// Credentials and the database URL stay out of `Debug` output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("railway_api_url", &self.railway_api_url)
            .field("railway_project_id", &self.railway_project_id)
            .field("railway_environment_id", &self.railway_environment_id)
            .field("template_repo_url", &self.template_repo_url)
            .field("template_branch", &self.template_branch)
            .field("template_repo_private", &self.template_repo_private)
            .field("service_name_prefix", &self.service_name_prefix)
            .field("platform_domain_suffix", &self.platform_domain_suffix)
            .field("webhook_path", &self.webhook_path)
            .field("supabase_url", &self.supabase_url)
            .field("create_service_timeout_secs", &self.create_service_timeout_secs)
            .field("set_variables_timeout_secs", &self.set_variables_timeout_secs)
            .field("trigger_deploy_timeout_secs", &self.trigger_deploy_timeout_secs)
            .field("reuse_existing_service", &self.reuse_existing_service)
            .field("rollback_on_failure", &self.rollback_on_failure)
            .field("provision_api_key_set", &self.provision_api_key.is_some())
            .finish_non_exhaustive()
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid boolean value: {}", other)),
    }
}
