/// How a response status is treated by a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    NotAuthorized,
    NotFound,
    Failed,
}

/// Classify an HTTP status code.
///
/// 2xx succeeds, 401 and 403 are not-authorized, 404 is not-found and
/// every other code is a generic failure.
pub fn classify(status: u16) -> ResponseClass {
    match status {
        200..=299 => ResponseClass::Success,
        401 | 403 => ResponseClass::NotAuthorized,
        404 => ResponseClass::NotFound,
        _ => ResponseClass::Failed,
    }
}
