use reqwest::header::HeaderValue;

/// Connection settings for the identity provider's public endpoint.
///
/// The provider's browser-based flows are cookie-bound (the CSRF cookie
/// issued with a flow must accompany its submission), so the embedded
/// reqwest client always carries a cookie store.
#[derive(Debug, Clone)]
pub struct Configuration {
    /// Base URL of the identity provider's public API, without a trailing slash.
    pub base_path: String,
    /// User agent sent with every request, if set.
    pub user_agent: Option<String>,
    /// The HTTP client used for all requests.
    pub client: reqwest::Client,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            base_path: "https://id.auric.dev".to_owned(),
            user_agent: Some("Auric Rust-SDK".to_owned()),
            client: new_http_client(),
        }
    }
}

impl Configuration {
    pub(crate) fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.apply_headers(self.client.get(url))
    }

    pub(crate) fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.apply_headers(self.client.post(url))
    }

    fn apply_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(reqwest::header::ACCEPT, "application/json");
        match &self.user_agent {
            Some(user_agent) => builder.header(
                reqwest::header::USER_AGENT,
                HeaderValue::from_str(user_agent)
                    .unwrap_or_else(|_| HeaderValue::from_static("Auric Rust-SDK")),
            ),
            None => builder,
        }
    }
}

/// Build the HTTP client used by [`Configuration::default`].
pub fn new_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("HTTP client build should not fail")
}
