/// In-application routing surface.
pub trait Navigator: Send + Sync {
    /// Navigate to an application path with optional query parameters.
    fn navigate(&self, path: &str, query: &[(String, String)]);

    /// Full browser navigation to an absolute URL, leaving the application.
    fn browser_redirect(&self, url: &str);
}

/// Navigator that only logs. Default for headless contexts.
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, path: &str, query: &[(String, String)]) {
        log::debug!("navigate: {path} {query:?}");
    }

    fn browser_redirect(&self, url: &str) {
        log::debug!("browser redirect: {url}");
    }
}
