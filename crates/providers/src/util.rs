use cs_domain::error::Error;

/// Map a reqwest error onto the domain error type, keeping timeouts
/// distinguishable from other transport failures.
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
