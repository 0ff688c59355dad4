//! Guard configuration, resolved once per process

use std::env;

use regex::Regex;

/// Sign-in entry point
pub const SIGN_IN_PATH: &str = "/auth/sign-in";

/// OAuth callback; always passed through, it issues its own redirects
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Path prefixes that need a plausible session
pub const DEFAULT_PROTECTED_PREFIXES: &[&str] = &["/profile", "/stats"];

/// Legacy session cookie names
pub const FALLBACK_COOKIES: &[&str] = &["sb-access-token", "sb-refresh-token"];

lazy_static::lazy_static! {
    static ref PROJECT_REF: Regex =
        Regex::new(r"(?i)https://([^.]+)\.supabase\.co").expect("valid project ref regex");
}

/// Derive the SSR session cookie name (`sb-<project-ref>-auth-token`) from the
/// auth backend's base URL
///
/// Returns `None` if the URL does not look like `https://<project-ref>.supabase.co`.
pub fn derive_session_cookie(backend_url: &str) -> Option<String> {
    let caps = PROJECT_REF.captures(backend_url)?;
    Some(format!("sb-{}-auth-token", &caps[1]))
}

/// Static inputs to [`RouteGuard`](crate::RouteGuard)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub protected_prefixes: Vec<String>,
    /// Derived session cookie; `None` when the backend URL is unset or unrecognised
    pub session_cookie: Option<String>,
    pub fallback_cookies: Vec<String>,
    pub sign_in_path: String,
    pub callback_path: String,
}

impl GuardConfig {
    /// Default configuration for the given auth backend URL
    pub fn for_backend_url(backend_url: Option<&str>) -> Self {
        Self {
            protected_prefixes: DEFAULT_PROTECTED_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            session_cookie: backend_url.and_then(derive_session_cookie),
            fallback_cookies: FALLBACK_COOKIES.iter().map(|s| s.to_string()).collect(),
            sign_in_path: SIGN_IN_PATH.to_string(),
            callback_path: CALLBACK_PATH.to_string(),
        }
    }

    /// Read configuration from the environment
    ///
    /// - `SUPABASE_URL` (or `NEXT_PUBLIC_SUPABASE_URL`): auth backend base URL
    /// - `PROTECTED_PREFIXES`: comma-separated path prefixes (optional)
    pub fn from_env() -> Self {
        let backend_url = env::var("SUPABASE_URL")
            .or_else(|_| env::var("NEXT_PUBLIC_SUPABASE_URL"))
            .ok();
        let config = Self::for_backend_url(backend_url.as_deref());

        match env::var("PROTECTED_PREFIXES") {
            Ok(raw) => config.with_protected_prefixes(
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| p.starts_with('/')),
            ),
            Err(_) => config,
        }
    }

    pub fn with_protected_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::for_backend_url(None)
    }
}
