use std::{future::Future, pin::Pin};

use auric_api::models::{ErrorId, FlowKind, ProviderError};
use auric_core::{Client, collaborators::NoticeKind};

use crate::FlowError;

/// Authenticated landing page.
pub const DEFAULT_LANDING_PATH: &str = "/profile";
/// Step-up (second factor) entry screen.
pub const STEP_UP_PATH: &str = "/mfa";
/// Sign-in entry screen.
pub const SIGN_IN_PATH: &str = "/signin";

/// A boxed future, used for the retry continuation.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Retry continuation for actions interrupted by `session_refresh_required`.
/// Invoked at most once, and only after a successful step-up.
pub type RetryThunk<'a> = Box<dyn FnOnce() -> BoxFuture<'a, ()> + Send + 'a>;

/// Maps structured flow errors to recovery actions.
///
/// The provider conflates transport, validation and security errors into a
/// single channel; this is the one place that stays exhaustive over its
/// error identifiers. Every branch performs exactly one primitive action:
/// navigate, reset-and-notify, reset silently, or notify.
pub struct Dispatcher {
    client: Client,
}

impl Dispatcher {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Route `error` to its recovery action.
    ///
    /// `comment` is the call-site description used for unclassified errors,
    /// `current_path` feeds the `redirect_to` parameter of the step-up
    /// detour for settings flows, `reset_flow` discards the caller's stale
    /// flow, and `on_session_refreshed` is the caller's retry continuation.
    pub async fn dispatch(
        &self,
        error: &FlowError,
        kind: FlowKind,
        comment: &str,
        current_path: Option<&str>,
        reset_flow: impl FnOnce(),
        on_session_refreshed: Option<RetryThunk<'_>>,
    ) {
        match error {
            FlowError::InvalidCredentials => {
                // Rewritten fixed message; the flow survives for a retry.
                self.notify_error("Sign in failed", &error.to_string());
            }
            FlowError::Validation(violations) => {
                // Field-level failures are rendered inline, never routed here.
                log::debug!("validation errors reached the dispatcher: {violations:?}");
            }
            FlowError::Api(api) => match error.provider() {
                Some(provider) => {
                    self.dispatch_provider(
                        provider,
                        kind,
                        comment,
                        current_path,
                        reset_flow,
                        on_session_refreshed,
                    )
                    .await;
                }
                None => {
                    log::error!("unclassified flow error ({comment}): {api}");
                    self.notify_error("Something went wrong", comment);
                }
            },
        }
    }

    async fn dispatch_provider(
        &self,
        provider: &ProviderError,
        kind: FlowKind,
        comment: &str,
        current_path: Option<&str>,
        reset_flow: impl FnOnce(),
        on_session_refreshed: Option<RetryThunk<'_>>,
    ) {
        let navigator = self.client.internal.navigator();
        match provider.id {
            Some(ErrorId::SessionAlreadyAvailable) => {
                navigator.navigate(DEFAULT_LANDING_PATH, &[]);
            }
            Some(ErrorId::SessionAal2Required) => {
                let query = match (kind, current_path) {
                    (FlowKind::Settings, Some(path)) => {
                        vec![("redirect_to".to_owned(), path.to_owned())]
                    }
                    _ => Vec::new(),
                };
                navigator.navigate(STEP_UP_PATH, &query);
            }
            Some(ErrorId::SessionRefreshRequired) => {
                if self.client.session().request_step_up().await {
                    if let Some(retry) = on_session_refreshed {
                        retry().await;
                    }
                } else {
                    log::info!("step-up declined or failed; action not retried");
                }
            }
            Some(ErrorId::BrowserLocationChangeRequired) => {
                match provider.redirect_browser_to.as_deref() {
                    Some(url) if is_step_up_destination(url) => {
                        navigator.navigate(STEP_UP_PATH, &[]);
                    }
                    Some(url) => navigator.browser_redirect(url),
                    None => {
                        log::warn!("location change requested without a redirect URL");
                        self.notify_error("Something went wrong", comment);
                    }
                }
            }
            Some(ErrorId::SelfServiceFlowExpired) => {
                self.notify_error("Session expired", "your session expired, please retry");
                reset_flow();
            }
            Some(ErrorId::SelfServiceFlowReturnToForbidden) => {
                self.notify_error("Return address not allowed", "the return address is not allowed");
                reset_flow();
            }
            Some(ErrorId::SecurityCsrfViolation) => {
                self.notify_error("Security check failed", "security check failed, please retry");
                reset_flow();
            }
            Some(ErrorId::SecurityIdentityMismatch) => {
                log::debug!("identity mismatch; resetting the flow silently");
                reset_flow();
            }
            Some(ErrorId::SessionInactive) => {
                navigator.navigate(SIGN_IN_PATH, &[]);
            }
            Some(ErrorId::Unknown) | None => {
                log::error!("unrecognized provider error ({comment}): {provider}");
                self.notify_error("Something went wrong", comment);
            }
        }
    }

    fn notify_error(&self, title: &str, description: &str) {
        self.client
            .internal
            .notifier()
            .notify(title, description, NoticeKind::Error);
    }
}

/// Whether a provider redirect denotes the step-up entry rather than an
/// external destination: either a flow URL carrying `aal=aal2`, or an
/// application URL whose whole path is the step-up screen. Lookalike
/// segments (`/mfaq`, `/docs/mfa/setup`) stay browser redirects.
fn is_step_up_destination(url: &str) -> bool {
    let trimmed = url.split('#').next().unwrap_or(url);
    let (rest, query) = match trimmed.split_once('?') {
        Some((rest, query)) => (rest, Some(query)),
        None => (trimmed, None),
    };
    if query.is_some_and(|query| query.split('&').any(|pair| pair == "aal=aal2")) {
        return true;
    }

    let path = match rest.split_once("://") {
        Some((_, authority)) => authority.split_once('/').map_or("", |(_, path)| path),
        None => rest,
    };
    let segments = path.split('/').filter(|segment| !segment.is_empty());
    segments.eq(STEP_UP_PATH.split('/').filter(|segment| !segment.is_empty()))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    use auric_api::ApiError;
    use auric_test::start_api_mock;

    use super::*;
    use crate::test_support::recording_client;

    #[test]
    fn aal2_redirects_are_recognized() {
        assert!(is_step_up_destination(
            "https://id.example.com/self-service/login/browser?aal=aal2"
        ));
        assert!(is_step_up_destination("https://app.example.com/mfa"));
        assert!(is_step_up_destination("/mfa"));
        assert!(is_step_up_destination("https://app.example.com/mfa?return_to=%2Fsettings"));
        assert!(!is_step_up_destination(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id=x"
        ));
        // Substring lookalikes are external destinations.
        assert!(!is_step_up_destination("https://partner.example.com/mfaq"));
        assert!(!is_step_up_destination(
            "https://partner.example.com/docs/mfa/setup"
        ));
    }

    fn provider_error(id: Option<ErrorId>) -> FlowError {
        FlowError::Api(Arc::new(ApiError::Provider(ProviderError {
            id,
            code: None,
            status: None,
            reason: None,
            message: "from the provider".to_owned(),
            redirect_browser_to: None,
        })))
    }

    /// What one dispatch did, reduced to the four primitive actions.
    #[derive(Debug, PartialEq)]
    struct Effects {
        navigations: usize,
        redirects: usize,
        notices: usize,
        reset: bool,
    }

    async fn effects_of(error: FlowError) -> Effects {
        let (_server, configuration) = start_api_mock(vec![]).await;
        let (client, notifier, navigator) = recording_client(configuration);
        let reset = AtomicBool::new(false);

        Dispatcher::new(client)
            .dispatch(
                &error,
                FlowKind::Login,
                "test action failed",
                None,
                || reset.store(true, Ordering::SeqCst),
                None,
            )
            .await;

        Effects {
            navigations: navigator.navigations().len(),
            redirects: navigator.redirects().len(),
            notices: notifier.notices().len(),
            reset: reset.load(Ordering::SeqCst),
        }
    }

    #[tokio::test]
    async fn every_error_id_maps_to_exactly_one_action() {
        // navigate only
        for id in [ErrorId::SessionAlreadyAvailable, ErrorId::SessionInactive] {
            assert_eq!(
                effects_of(provider_error(Some(id))).await,
                Effects { navigations: 1, redirects: 0, notices: 0, reset: false },
                "{id:?}"
            );
        }
        assert_eq!(
            effects_of(provider_error(Some(ErrorId::SessionAal2Required))).await,
            Effects { navigations: 1, redirects: 0, notices: 0, reset: false }
        );

        // notify and reset
        for id in [
            ErrorId::SelfServiceFlowExpired,
            ErrorId::SelfServiceFlowReturnToForbidden,
            ErrorId::SecurityCsrfViolation,
        ] {
            assert_eq!(
                effects_of(provider_error(Some(id))).await,
                Effects { navigations: 0, redirects: 0, notices: 1, reset: true },
                "{id:?}"
            );
        }

        // reset silently
        assert_eq!(
            effects_of(provider_error(Some(ErrorId::SecurityIdentityMismatch))).await,
            Effects { navigations: 0, redirects: 0, notices: 0, reset: true }
        );

        // default: notify only
        for error in [
            provider_error(Some(ErrorId::Unknown)),
            provider_error(None),
            FlowError::InvalidCredentials,
        ] {
            assert_eq!(
                effects_of(error).await,
                Effects { navigations: 0, redirects: 0, notices: 1, reset: false }
            );
        }

        // field-level violations never act at all
        assert_eq!(
            effects_of(FlowError::Validation(Vec::new())).await,
            Effects { navigations: 0, redirects: 0, notices: 0, reset: false }
        );
    }

    #[tokio::test]
    async fn refresh_required_without_provider_confirmation_does_not_retry() {
        // recording_client wires an accepting prompt, but with no whoami
        // mock the aal2 confirmation fails, so the retry stays uninvoked.
        let (_server, configuration) = start_api_mock(vec![]).await;
        let (client, notifier, navigator) = recording_client(configuration);
        let retried = Arc::new(AtomicBool::new(false));

        let retried_flag = retried.clone();
        Dispatcher::new(client)
            .dispatch(
                &provider_error(Some(ErrorId::SessionRefreshRequired)),
                FlowKind::Settings,
                "test action failed",
                Some("/settings"),
                || {},
                Some(Box::new(move || {
                    Box::pin(async move {
                        retried_flag.store(true, Ordering::SeqCst);
                    })
                })),
            )
            .await;

        assert!(!retried.load(Ordering::SeqCst));
        assert!(navigator.navigations().is_empty());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn location_change_with_aal2_destination_stays_in_the_application() {
        let (_server, configuration) = start_api_mock(vec![]).await;
        let (client, _notifier, navigator) = recording_client(configuration);

        let error = FlowError::Api(Arc::new(ApiError::Provider(ProviderError {
            id: Some(ErrorId::BrowserLocationChangeRequired),
            code: None,
            status: None,
            reason: None,
            message: "redirect".to_owned(),
            redirect_browser_to: Some(
                "https://id.example.com/self-service/login/browser?aal=aal2".to_owned(),
            ),
        })));
        Dispatcher::new(client)
            .dispatch(&error, FlowKind::Login, "test action failed", None, || {}, None)
            .await;

        assert_eq!(navigator.navigations(), vec![(STEP_UP_PATH.to_owned(), vec![])]);
        assert!(navigator.redirects().is_empty());
    }
}
