use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::company::Company;

/// Process-wide values that every tenant's bot receives.
#[derive(Clone)]
pub struct SharedSecrets {
    pub openai_api_key: String,
    pub supabase_url: String,
    pub supabase_key: String,
}

impl fmt::Debug for SharedSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecrets")
            .field("supabase_url", &self.supabase_url)
            .finish_non_exhaustive()
    }
}

/// Environment variables injected into a tenant's service. Built fresh for
/// every run; values never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SecretBundle(BTreeMap<String, String>);

impl SecretBundle {
    pub fn for_company(company: &Company, shared: &SharedSecrets) -> Self {
        let vars = [
            ("WHATSAPP_API_TOKEN", company.whatsapp_api_token.as_str()),
            ("WHATSAPP_PHONE_ID", company.whatsapp_phone_id.as_str()),
            ("WHATSAPP_VERIFY_TOKEN", company.whatsapp_verify_token.as_str()),
            ("OPENAI_API_KEY", shared.openai_api_key.as_str()),
            ("SUPABASE_URL", shared.supabase_url.as_str()),
            ("SUPABASE_KEY", shared.supabase_key.as_str()),
            ("COMPANY_ID", company.id.as_str()),
            ("COMPANY_NAME", company.name.as_str()),
            ("OWNER_ID", company.owner_id.as_str()),
            ("NODE_ENV", "production"),
            ("PORT", "3000"),
        ];

        Self(
            vars.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
