//! Test helpers shared by the Auric SDK crates.

use auric_api::Configuration;

/// Helper for testing against the identity provider API using wiremock.
///
/// Warning: when using `Mock::expect` ensure the returned server is not
/// dropped before the test completes, or the expectation never runs.
pub async fn start_api_mock(mocks: Vec<wiremock::Mock>) -> (wiremock::MockServer, Configuration) {
    let server = wiremock::MockServer::start().await;

    for mock in mocks {
        server.register(mock).await;
    }

    let configuration = Configuration {
        base_path: server.uri(),
        user_agent: Some("test-agent".to_string()),
        ..Default::default()
    };

    (server, configuration)
}
