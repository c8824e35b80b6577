//! Browser identities used for outbound requests.

/// User agent sent by the direct strategy.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Accept-Language matching the Korean airline sites we watch.
pub const ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

/// A browser family the impersonation strategies can pose as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserProfile {
    Chrome,
    Safari,
}

impl BrowserProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Safari => "safari",
        }
    }

    /// Look up a profile by its configured name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Some(Self::Chrome),
            "safari" | "safari15_5" => Some(Self::Safari),
            _ => None,
        }
    }

    pub fn user_agent(&self) -> &'static str {
        match self {
            Self::Chrome => "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
            Self::Safari => "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.5 Safari/605.1.15",
        }
    }

    /// The Accept header this browser family sends for navigations.
    pub fn accept(&self) -> &'static str {
        match self {
            Self::Chrome => "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            Self::Safari => "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        }
    }
}

/// Resolve configured profile names, dropping unknown ones.
pub fn resolve_profiles<S: AsRef<str>>(names: &[S]) -> Vec<BrowserProfile> {
    names
        .iter()
        .filter_map(|name| {
            let profile = BrowserProfile::from_str(name.as_ref());
            if profile.is_none() {
                tracing::warn!("Unknown impersonation profile: {}", name.as_ref());
            }
            profile
        })
        .collect()
}
