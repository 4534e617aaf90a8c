use std::sync::RwLock;

use crate::FlowError;

/// Snapshot of one flow-client operation.
#[derive(Debug, Clone)]
pub struct OperationState<T> {
    /// Last successful payload, if any.
    pub data: Option<T>,
    /// True strictly between issuing the call and receiving its response.
    pub loading: bool,
    /// Failure of the most recent call, if any.
    pub error: Option<FlowError>,
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Per-operation `{data, loading, error}` container.
///
/// Created once per orchestrator instance and mutated only by that
/// orchestrator's calls. `error` and `data` are mutually exclusive for a
/// given call: a new call clears both before the request is issued.
pub struct Operation<T> {
    state: RwLock<OperationState<T>>,
}

impl<T: Clone> Operation<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(OperationState::default()),
        }
    }

    /// A snapshot of the container.
    pub fn state(&self) -> OperationState<T> {
        self.state
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Drive the container through one call.
    ///
    /// The returned error is also stored in the container: callers are
    /// required to be able to read the failure from the operation state
    /// even when they drop the returned `Result`.
    pub(crate) async fn run<F>(&self, call: F) -> Result<T, FlowError>
    where
        F: std::future::Future<Output = Result<T, FlowError>>,
    {
        self.begin();
        match call.await {
            Ok(value) => {
                self.complete(value.clone());
                Ok(value)
            }
            Err(error) => {
                self.fail(error.clone());
                Err(error)
            }
        }
    }

    pub(crate) fn begin(&self) {
        let mut state = self.state.write().expect("RwLock should not be poisoned");
        state.data = None;
        state.error = None;
        state.loading = true;
    }

    pub(crate) fn complete(&self, value: T) {
        let mut state = self.state.write().expect("RwLock should not be poisoned");
        state.data = Some(value);
        state.error = None;
        state.loading = false;
    }

    pub(crate) fn fail(&self, error: FlowError) {
        let mut state = self.state.write().expect("RwLock should not be poisoned");
        state.data = None;
        state.error = Some(error);
        state.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_stores_data_and_clears_error() {
        let operation: Operation<u32> = Operation::new();
        operation.fail(FlowError::InvalidCredentials);

        let result = operation.run(async { Ok(7) }).await;
        assert_eq!(result.ok(), Some(7));

        let state = operation.state();
        assert_eq!(state.data, Some(7));
        assert!(state.error.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn failure_is_stored_and_returned() {
        let operation: Operation<u32> = Operation::new();
        let result = operation
            .run(async { Err(FlowError::InvalidCredentials) })
            .await;
        assert!(result.is_err());

        let state = operation.state();
        assert!(state.data.is_none());
        assert!(matches!(state.error, Some(FlowError::InvalidCredentials)));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn a_new_call_clears_both_fields_first() {
        let operation: Operation<u32> = Operation::new();
        operation.complete(3);

        // Observe the cleared state from inside the in-flight call.
        operation.begin();
        let state = operation.state();
        assert!(state.data.is_none() && state.error.is_none() && state.loading);
        operation.complete(4);
        assert_eq!(operation.state().data, Some(4));
    }
}
