/// Provider-safe service name: prefix + tenant name, lowercased, ASCII
/// alphanumerics only. "Elite Renovations!" → `zappyboteliterenovations`.
pub fn derive_service_name(prefix: &str, company_name: &str) -> String {
    format!("{prefix}{company_name}")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Turns a template repository URL into the `owner/repo` path the provider
/// expects. Accepts `https://host/owner/repo(.git)`, `git@host:owner/repo.git`
/// and bare `owner/repo`.
pub fn derive_repo_path(repo_url: &str) -> Option<String> {
    let trimmed = repo_url.trim();

    let path = if let Some(idx) = trimmed.find("://") {
        let after_scheme = &trimmed[idx + 3..];
        after_scheme.split_once('/').map(|(_, p)| p)?
    } else if let Some(rest) = trimmed.strip_prefix("git@") {
        rest.split_once(':').map(|(_, p)| p)?
    } else {
        trimmed
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut segments = path.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
            Some(format!("{owner}/{repo}"))
        }
        _ => None,
    }
}

/// Public webhook URL for a freshly created service. A domain assigned by the
/// provider wins; otherwise the platform's default hostname for the service
/// is synthesized.
pub fn resolve_endpoint(
    domains: &[String],
    service_id: &str,
    platform_suffix: &str,
    webhook_path: &str,
) -> String {
    let host = domains
        .iter()
        .map(|d| d.trim())
        .find(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{service_id}.{}", platform_suffix.trim_start_matches('.')));

    let path = webhook_path.trim_start_matches('/');
    format!("https://{host}/{path}")
}
