/// Default base URL of the hosted weather agent.
pub const DEFAULT_BASE_URL: &str = "https://millions-screeching-vultur.mastra.cloud";
/// Default agent identifier.
pub const DEFAULT_AGENT_ID: &str = "weatherAgent";

/// Normalize a base URL to the agent streaming endpoint.
///
/// Normalization rules:
/// 1) keep `/agents/{agent}/stream` unchanged
/// 2) append `/agents/{agent}/stream` when path ends in `/api`
/// 3) append `/api/agents/{agent}/stream` otherwise
pub fn normalize_stream_url(input: &str, agent_id: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_BASE_URL
    } else {
        input.trim()
    };
    let agent_id = if agent_id.trim().is_empty() {
        DEFAULT_AGENT_ID
    } else {
        agent_id.trim()
    };

    let trimmed = base.trim_end_matches('/');
    let suffix = format!("/agents/{agent_id}/stream");
    if trimmed.ends_with(&suffix) {
        return trimmed.to_string();
    }
    if trimmed.ends_with("/api") {
        return format!("{trimmed}{suffix}");
    }
    format!("{trimmed}/api{suffix}")
}
