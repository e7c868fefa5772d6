//! Web-app payload extraction.
//!
//! The webview open call returns a launch URL whose fragment carries the
//! signed init data between `tgWebAppData=` and `&tgWebAppVersion`. This
//! is an explicit parser with typed failures rather than blind slicing:
//! a URL without both delimiters is a malformed payload, not a panic.

use percent_encoding::percent_decode_str;

const DATA_MARKER: &str = "tgWebAppData=";
const VERSION_DELIMITER: &str = "&tgWebAppVersion";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("webview url carries no `tgWebAppData=` fragment")]
    MissingData,
    #[error("webview data fragment is not terminated by `&tgWebAppVersion`")]
    MissingVersionDelimiter,
    #[error("webview data fragment is not valid utf-8 after decoding")]
    BadEncoding,
}

/// Extract and percent-decode the signed init data from a launch URL.
pub fn extract_init_data(url: &str) -> Result<String, PayloadError> {
    let start = url.find(DATA_MARKER).ok_or(PayloadError::MissingData)? + DATA_MARKER.len();
    let rest = &url[start..];
    let end = rest
        .find(VERSION_DELIMITER)
        .ok_or(PayloadError::MissingVersionDelimiter)?;
    percent_decode_str(&rest[..end])
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| PayloadError::BadEncoding)
}
