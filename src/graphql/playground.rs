//! GraphQL Playground page.

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};

use crate::config::PlaygroundConfig;

/// Render the Playground HTML pointed at `endpoint`.
pub fn render_playground(endpoint: &str, config: &PlaygroundConfig) -> String {
    let mut playground = GraphQLPlaygroundConfig::new(endpoint);
    if let Some(title) = &config.title {
        playground = playground.title(title);
    }
    for (name, value) in &config.settings {
        playground = playground.with_setting(name, value.clone());
    }
    playground_source(playground)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_endpoint_and_title() {
        let config = PlaygroundConfig {
            title: Some("Vercel GraphQL".into()),
            ..PlaygroundConfig::default()
        };
        let html = render_playground("/api/graphql", &config);

        assert!(html.contains("/api/graphql"));
        assert!(html.contains("Vercel GraphQL"));
    }
}
