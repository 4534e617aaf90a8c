use crate::{ApiError, Configuration, error::error_for_response, models::Session};

/// `GET /sessions/whoami` — the session backing the current cookie/token,
/// or an error (401 for no session).
pub async fn whoami(configuration: &Configuration) -> Result<Session, ApiError> {
    let url = format!("{}/sessions/whoami", configuration.base_path);
    let response = configuration.get(url).send().await?;

    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_for_response(response).await)
}
