/// Classified outcome of a transfer step.
///
/// Returned as a value so callers can branch on not-authorized or
/// not-found without treating them as faults. Faults (the call could not
/// be made at all) are [`crate::Error`]s instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamResult<T> {
    Success(T),
    NotAuthorized,
    NotFound,
    Error(String),
}

impl<T> StreamResult<T> {
    pub fn success(value: T) -> Self {
        StreamResult::Success(value)
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamResult::Error(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StreamResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StreamResult<U> {
        match self {
            StreamResult::Success(value) => StreamResult::Success(f(value)),
            StreamResult::NotAuthorized => StreamResult::NotAuthorized,
            StreamResult::NotFound => StreamResult::NotFound,
            StreamResult::Error(message) => StreamResult::Error(message),
        }
    }

    pub fn into_success(self) -> Option<T> {
        match self {
            StreamResult::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Human-readable reason for a failed outcome.
    pub fn failure_detail(&self) -> Option<String> {
        match self {
            StreamResult::Success(_) => None,
            StreamResult::NotAuthorized => Some("not authorized".to_string()),
            StreamResult::NotFound => Some("not found".to_string()),
            StreamResult::Error(message) => Some(message.clone()),
        }
    }
}
