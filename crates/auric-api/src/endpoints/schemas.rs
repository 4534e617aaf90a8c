use crate::{ApiError, Configuration, error::error_for_response, models::RemoteSchema};

/// `GET /schemas/{id}` — the JSON-schema fragment for an identity schema,
/// merged by the flow layer into the locally-authored validation schema.
pub async fn traits_schema(
    configuration: &Configuration,
    schema_id: &str,
) -> Result<RemoteSchema, ApiError> {
    let url = format!("{}/schemas/{schema_id}", configuration.base_path);
    let response = configuration.get(url).send().await?;

    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_for_response(response).await)
}

#[cfg(test)]
mod tests {
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    use super::*;

    #[tokio::test]
    async fn schema_is_fetched_by_id() {
        let server = MockServer::start().await;
        server
            .register(
                Mock::given(matchers::method("GET"))
                    .and(matchers::path("/schemas/default"))
                    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                        "properties": {"email": {"type": "string", "format": "email"}},
                        "required": ["email"]
                    }))),
            )
            .await;
        let configuration = Configuration {
            base_path: server.uri(),
            ..Default::default()
        };

        let schema = traits_schema(&configuration, "default")
            .await
            .expect("schema fetch should succeed");
        assert!(schema.properties().expect("properties").contains_key("email"));
    }
}
