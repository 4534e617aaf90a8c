//! Recording collaborator doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use auric_api::Configuration;
use auric_core::{
    Client,
    collaborators::{Collaborators, Navigator, NoticeKind, Notifier, StepUpPrompt},
};

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notices: Mutex<Vec<(String, String, NoticeKind)>>,
}

impl RecordingNotifier {
    pub(crate) fn notices(&self) -> Vec<(String, String, NoticeKind)> {
        self.notices.lock().expect("Mutex should not be poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, description: &str, kind: NoticeKind) {
        self.notices
            .lock()
            .expect("Mutex should not be poisoned")
            .push((title.to_owned(), description.to_owned(), kind));
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    navigations: Mutex<Vec<(String, Vec<(String, String)>)>>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn navigations(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.navigations
            .lock()
            .expect("Mutex should not be poisoned")
            .clone()
    }

    pub(crate) fn redirects(&self) -> Vec<String> {
        self.redirects.lock().expect("Mutex should not be poisoned").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, query: &[(String, String)]) {
        self.navigations
            .lock()
            .expect("Mutex should not be poisoned")
            .push((path.to_owned(), query.to_vec()));
    }

    fn browser_redirect(&self, url: &str) {
        self.redirects
            .lock()
            .expect("Mutex should not be poisoned")
            .push(url.to_owned());
    }
}

/// A prompt that immediately reports success, for retry-path tests. The
/// session manager still verifies the refreshed session with the provider.
#[derive(Debug)]
pub(crate) struct AcceptingStepUpPrompt;

#[async_trait::async_trait]
impl StepUpPrompt for AcceptingStepUpPrompt {
    async fn authenticate(&self, _client: &Client) -> bool {
        true
    }
}

/// A client pointed at the mock server, with recording notifier and
/// navigator doubles.
pub(crate) fn recording_client(
    configuration: Configuration,
) -> (Client, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    recording_client_with_prompt(configuration, Arc::new(AcceptingStepUpPrompt))
}

pub(crate) fn recording_client_with_prompt(
    configuration: Configuration,
    prompt: Arc<dyn StepUpPrompt>,
) -> (Client, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = Client::with_collaborators(
        None,
        Collaborators {
            notifier: notifier.clone(),
            navigator: navigator.clone(),
            step_up_prompt: prompt,
            ..Collaborators::default()
        },
    );
    client.internal.set_api_configuration(configuration);
    (client, notifier, navigator)
}
