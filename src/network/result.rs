use super::error::NetworkError;

/// Outcome of a network operation.
///
/// `Loading` is a placeholder for UI state while a call is in flight; a
/// finished call always yields `Success` or `Error`.
#[derive(Debug, Clone)]
pub enum NetworkResult<T> {
    Success(T),
    Error(NetworkError),
    Loading,
}

impl<T> NetworkResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, NetworkResult::Success(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, NetworkResult::Loading)
    }

    pub fn success(self) -> Option<T> {
        match self {
            NetworkResult::Success(data) => Some(data),
            NetworkResult::Error(_) | NetworkResult::Loading => None,
        }
    }

    pub fn error(&self) -> Option<&NetworkError> {
        match self {
            NetworkResult::Error(err) => Some(err),
            NetworkResult::Success(_) | NetworkResult::Loading => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NetworkResult<U> {
        match self {
            NetworkResult::Success(data) => NetworkResult::Success(f(data)),
            NetworkResult::Error(err) => NetworkResult::Error(err),
            NetworkResult::Loading => NetworkResult::Loading,
        }
    }

    /// Collapse into a plain `Result` for callers that want `?`.
    ///
    /// A `Loading` value is not a valid final state and becomes an
    /// `Unknown` error.
    pub fn into_result(self) -> Result<T, NetworkError> {
        match self {
            NetworkResult::Success(data) => Ok(data),
            NetworkResult::Error(err) => Err(err),
            NetworkResult::Loading => {
                Err(NetworkError::unknown().with_message("Unexpected loading state"))
            }
        }
    }
}

impl<T> From<Result<T, NetworkError>> for NetworkResult<T> {
    fn from(result: Result<T, NetworkError>) -> Self {
        match result {
            Ok(data) => NetworkResult::Success(data),
            Err(err) => NetworkResult::Error(err),
        }
    }
}
