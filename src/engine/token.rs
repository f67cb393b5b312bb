use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Cache-busting value appended to asset URLs as `?t=<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheToken(u64);

impl CacheToken {
    /// Replace any existing query on `url` with this token.
    pub fn decorate(self, url: &str) -> String {
        let bare = url.split('?').next().unwrap_or(url);
        format!("{bare}?t={}", self.0)
    }

    /// Extract the token from a decorated URL.
    pub fn parse_from(url: &str) -> Option<CacheToken> {
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .find_map(|kv| kv.strip_prefix("t="))
            .and_then(|v| v.parse().ok())
            .map(CacheToken)
    }
}

impl fmt::Display for CacheToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues strictly increasing tokens based on wall-clock milliseconds.
#[derive(Debug, Default)]
pub struct TokenMint {
    last: AtomicU64,
}

impl TokenMint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self) -> CacheToken {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        // Same millisecond (or a clock step backwards) still yields a fresh value.
        let prev = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|v| v);
        CacheToken(now.max(prev + 1))
    }
}
