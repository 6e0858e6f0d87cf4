//! Shared User-Agent string for upstream HTTP requests.

/// Default User-Agent for list and metadata requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("media-catalog/{version} (catalog-aggregator)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_identifies_tool_and_version() {
        let ua = default_user_agent();
        assert!(ua.starts_with("media-catalog/"), "UA must name the tool");
        assert!(ua.contains(env!("CARGO_PKG_VERSION")), "UA must carry the crate version");
    }
}
