//! HTTP cache control module
//!
//! Controller availability and CSV contents change between polls, so every
//! successful response is sent with `no-cache`.

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Client must revalidate before reuse
    #[default]
    NoCache,
    /// Client must not store the response at all
    NoStore,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub const fn to_header_value(self) -> &'static str {
        match self {
            Self::NoCache => "no-cache",
            Self::NoStore => "no-store",
        }
    }
}
