use crate::{ApiError, Configuration, error::error_for_response, models::LogoutFlow};

/// `GET /self-service/logout/browser` — obtain the logout token (or URL).
pub async fn logout_flow(configuration: &Configuration) -> Result<LogoutFlow, ApiError> {
    let url = format!("{}/self-service/logout/browser", configuration.base_path);
    let response = configuration.get(url).send().await?;

    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_for_response(response).await)
}

/// `GET /self-service/logout?token=` — invalidate the session. 200 and 204
/// are both success; the body is ignored. A 401 means the session is
/// already gone, which is a completed logout.
pub async fn submit_logout(configuration: &Configuration, token: &str) -> Result<(), ApiError> {
    let url = format!("{}/self-service/logout", configuration.base_path);
    let response = configuration
        .get(url)
        .query(&[("token", token)])
        .send()
        .await?;

    if response.status().is_success() || response.status() == reqwest::StatusCode::UNAUTHORIZED {
        return Ok(());
    }
    Err(error_for_response(response).await)
}

#[cfg(test)]
mod tests {
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    use super::*;

    #[tokio::test]
    async fn logout_round_trip() {
        let server = MockServer::start().await;
        server
            .register(
                Mock::given(matchers::method("GET"))
                    .and(matchers::path("/self-service/logout/browser"))
                    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                        "logout_url":
                            "https://id.example.com/self-service/logout?token=tok-1"
                    }))),
            )
            .await;
        server
            .register(
                Mock::given(matchers::method("GET"))
                    .and(matchers::path("/self-service/logout"))
                    .and(matchers::query_param("token", "tok-1"))
                    .respond_with(ResponseTemplate::new(204)),
            )
            .await;
        let configuration = Configuration {
            base_path: server.uri(),
            ..Default::default()
        };

        let flow = logout_flow(&configuration)
            .await
            .expect("logout flow should succeed");
        let token = flow.token().expect("token should be extracted");
        submit_logout(&configuration, &token)
            .await
            .expect("logout should succeed");
    }

    #[tokio::test]
    async fn an_already_gone_session_counts_as_logged_out() {
        let server = MockServer::start().await;
        server
            .register(
                Mock::given(matchers::method("GET"))
                    .and(matchers::path("/self-service/logout"))
                    .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                        "error": {"id": "session_inactive", "message": "no active session"}
                    }))),
            )
            .await;
        let configuration = Configuration {
            base_path: server.uri(),
            ..Default::default()
        };

        submit_logout(&configuration, "tok-stale")
            .await
            .expect("an already-invalidated session is a completed logout");
    }
}
