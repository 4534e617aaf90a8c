/// Reader for the small persisted UI preference "selected profile id"
/// (a cookie or local storage entry owned by the embedder).
///
/// The session manager clears it together with the session so a later
/// login cannot observe another identity's selection.
pub trait ProfileIdStore: Send + Sync {
    /// The previously selected profile id, if any.
    fn selected_profile(&self) -> Option<String>;

    /// Forget the stored selection.
    fn clear(&self);
}

/// Store that holds nothing. Default for headless contexts.
pub struct NullProfileIdStore;

impl ProfileIdStore for NullProfileIdStore {
    fn selected_profile(&self) -> Option<String> {
        None
    }

    fn clear(&self) {}
}
