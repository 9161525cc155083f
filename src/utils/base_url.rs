//! Base URL parsing for the remote region API.
//!
//! Produces a canonical base that endpoint paths can be joined onto without
//! losing a path prefix (`https://host/prefix` → `https://host/prefix/`).

use url::Url;

/// Errors that can occur while parsing the region API base URL.
#[derive(Debug, thiserror::Error)]
pub enum BaseUrlError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Base URL must not carry a query string or credentials")]
    UnexpectedComponent,
}

/// Parses and canonicalizes the region API base URL.
///
/// # Rules
///
/// 1. **Protocol**: Only HTTP and HTTPS are allowed
/// 2. **Hostname**: Lowercased, default ports dropped (done by [`Url::parse`])
/// 3. **Fragment**: Removed
/// 4. **Query / credentials**: Rejected
/// 5. **Path**: Always ends with `/` so relative joins append to it
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     parse_base_url("HTTPS://API.EXAMPLE.COM:443/v1").unwrap().as_str(),
///     "https://api.example.com/v1/"
/// );
/// ```
pub fn parse_base_url(input: &str) -> Result<Url, BaseUrlError> {
    let mut url = Url::parse(input).map_err(|e| BaseUrlError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(BaseUrlError::UnsupportedProtocol),
    }

    if url.query().is_some() || !url.username().is_empty() || url.password().is_some() {
        return Err(BaseUrlError::UnexpectedComponent);
    }

    url.set_fragment(None);

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
