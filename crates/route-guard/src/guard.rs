//! The per-request decision

use tracing::trace;
use url::form_urlencoded;

use crate::config::GuardConfig;
use crate::decision::{is_safe_redirect, RouteDecision, REDIRECT_PARAM};

/// Prefix shared by all auth backend cookies
const SESSION_COOKIE_PREFIX: &str = "sb-";

/// Stateless route protection
///
/// Build once per process and share; [`decide`](Self::decide) is a pure
/// function of its inputs and the configuration.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    config: GuardConfig,
}

impl RouteGuard {
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Decide what to do with a request
    ///
    /// `query` is the raw query string, with or without the leading `?`.
    /// `cookies` are `(name, value)` pairs; malformed or missing cookies simply
    /// count as "no session".
    pub fn decide<'c, I>(&self, path: &str, query: &str, cookies: I) -> RouteDecision
    where
        I: IntoIterator<Item = (&'c str, &'c str)>,
    {
        let path = if path.is_empty() { "/" } else { path };
        let query = query.strip_prefix('?').unwrap_or(query);

        if path.starts_with(&self.config.callback_path) {
            trace!(path, "Auth callback, passing through");
            return RouteDecision::Allow;
        }

        let authenticated = self.has_plausible_session(cookies);

        if !authenticated && self.is_protected(path) {
            let original = if query.is_empty() {
                path.to_string()
            } else {
                format!("{path}?{query}")
            };
            let return_to =
                (original != "/" && original != self.config.sign_in_path).then_some(original);
            trace!(path, "No session on protected path, redirecting to sign-in");
            return RouteDecision::RedirectToSignIn {
                sign_in_path: self.config.sign_in_path.clone(),
                return_to,
            };
        }

        if authenticated && path.starts_with(&self.config.sign_in_path) {
            let requested = form_urlencoded::parse(query.as_bytes())
                .find(|(k, _)| k == REDIRECT_PARAM)
                .map(|(_, v)| v.into_owned());
            let path = match requested {
                Some(target) if is_safe_redirect(&target) => target,
                _ => "/".to_string(),
            };
            trace!(target = %path, "Session present on sign-in page, redirecting");
            return RouteDecision::RedirectToTarget { path };
        }

        RouteDecision::Allow
    }

    /// Cookie-presence check for a session; does not validate anything
    ///
    /// True if the derived session cookie has a non-empty value, or any cookie
    /// named `sb-*` mentions `auth` or `token`, or a fallback cookie is present.
    pub fn has_plausible_session<'c, I>(&self, cookies: I) -> bool
    where
        I: IntoIterator<Item = (&'c str, &'c str)>,
    {
        let derived = self.config.session_cookie.as_deref();

        cookies.into_iter().any(|(name, value)| {
            if derived == Some(name) && !value.is_empty() {
                return true;
            }
            if name.starts_with(SESSION_COOKIE_PREFIX)
                && (name.contains("auth") || name.contains("token"))
            {
                return true;
            }
            self.config.fallback_cookies.iter().any(|f| f == name)
        })
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.config
            .protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTH: [(&str, &str); 1] = [("sb-test-project-auth-token", "test-token")];
    const NONE: [(&str, &str); 0] = [];

    fn guard() -> RouteGuard {
        RouteGuard::new(GuardConfig::for_backend_url(Some(
            "https://test-project.supabase.co",
        )))
    }

    fn sign_in(return_to: Option<&str>) -> RouteDecision {
        RouteDecision::RedirectToSignIn {
            sign_in_path: "/auth/sign-in".into(),
            return_to: return_to.map(String::from),
        }
    }

    fn target(path: &str) -> RouteDecision {
        RouteDecision::RedirectToTarget { path: path.into() }
    }

    #[test]
    fn test_unauthenticated_protected_redirects_with_return_path() {
        let decision = guard().decide("/profile", "", NONE);
        assert_eq!(decision, sign_in(Some("/profile")));
        assert_eq!(
            decision.location().as_deref(),
            Some("/auth/sign-in?redirectTo=/profile")
        );

        assert_eq!(guard().decide("/stats", "", NONE), sign_in(Some("/stats")));
    }

    #[test]
    fn test_return_path_keeps_query() {
        let decision = guard().decide("/profile", "?tab=settings", NONE);
        assert_eq!(decision, sign_in(Some("/profile?tab=settings")));

        // Leading `?` is optional
        let decision = guard().decide("/profile", "tab=settings", NONE);
        assert_eq!(decision, sign_in(Some("/profile?tab=settings")));
    }

    #[test]
    fn test_nested_protected_paths() {
        assert_eq!(
            guard().decide("/profile/settings", "", NONE),
            sign_in(Some("/profile/settings"))
        );
        assert_eq!(
            guard().decide("/profile//settings", "", NONE),
            sign_in(Some("/profile//settings"))
        );
    }

    #[test]
    fn test_sign_in_as_protected_prefix_omits_return_path() {
        let guard = RouteGuard::new(
            GuardConfig::default().with_protected_prefixes(["/auth/sign-in", "/"]),
        );
        assert_eq!(guard.decide("/auth/sign-in", "", NONE), sign_in(None));
        assert_eq!(guard.decide("/", "", NONE), sign_in(None));
        assert_eq!(guard.decide("", "", NONE), sign_in(None));
    }

    #[test]
    fn test_public_routes_allowed_without_session() {
        assert_eq!(guard().decide("/", "", NONE), RouteDecision::Allow);
        assert_eq!(guard().decide("/daily", "", NONE), RouteDecision::Allow);
        assert_eq!(guard().decide("/auth/sign-in", "", NONE), RouteDecision::Allow);
    }

    #[test]
    fn test_empty_path_is_root() {
        assert_eq!(guard().decide("", "", NONE), RouteDecision::Allow);
    }

    #[test]
    fn test_authenticated_protected_allowed() {
        assert_eq!(guard().decide("/profile", "", AUTH), RouteDecision::Allow);
        assert_eq!(guard().decide("/stats", "", AUTH), RouteDecision::Allow);
    }

    #[test]
    fn test_sign_in_bounce_to_safe_target() {
        let decision = guard().decide("/auth/sign-in", "redirectTo=/stats%3Ftab%3Doverview", AUTH);
        assert_eq!(decision, target("/stats?tab=overview"));
        assert_eq!(decision.location().as_deref(), Some("/stats?tab=overview"));

        assert_eq!(
            guard().decide("/auth/sign-in", "?redirectTo=/profile", AUTH),
            target("/profile")
        );
    }

    #[test]
    fn test_sign_in_bounce_defaults_home() {
        assert_eq!(guard().decide("/auth/sign-in", "", AUTH), target("/"));
        assert_eq!(
            guard().decide("/auth/sign-in", "redirectTo=", AUTH),
            target("/")
        );
        assert_eq!(
            guard().decide("/auth/sign-in", "other=1", AUTH),
            target("/")
        );
    }

    #[test]
    fn test_open_redirect_rejected() {
        assert_eq!(
            guard().decide("/auth/sign-in", "redirectTo=evil.com", AUTH),
            target("/")
        );
        assert_eq!(
            guard().decide("/auth/sign-in", "redirectTo=https://evil.com", AUTH),
            target("/")
        );
        assert_eq!(
            guard().decide("/auth/sign-in", "redirectTo=//evil.com", AUTH),
            target("/")
        );
        assert_eq!(
            guard().decide("/auth/sign-in", "redirectTo=%2F%2Fevil.com", AUTH),
            target("/")
        );
    }

    #[test]
    fn test_first_redirect_param_wins() {
        assert_eq!(
            guard().decide("/auth/sign-in", "redirectTo=/stats&redirectTo=/profile", AUTH),
            target("/stats")
        );
    }

    #[test]
    fn test_callback_always_allowed() {
        assert_eq!(
            guard().decide("/auth/callback", "code=123", NONE),
            RouteDecision::Allow
        );
        assert_eq!(
            guard().decide("/auth/callback", "code=123&next=/profile", NONE),
            RouteDecision::Allow
        );
        assert_eq!(
            guard().decide("/auth/callback", "code=123", AUTH),
            RouteDecision::Allow
        );
    }

    #[test]
    fn test_cookie_detection() {
        let g = guard();
        assert!(g.has_plausible_session([("sb-test-project-auth-token", "t")]));
        assert!(g.has_plausible_session([("sb-access-token", "t")]));
        assert!(g.has_plausible_session([("sb-refresh-token", "t")]));
        assert!(g.has_plausible_session([("sb-other-ref-auth-token.0", "chunk")]));
        assert!(!g.has_plausible_session([("other-cookie", "v")]));
        assert!(!g.has_plausible_session([("sb-theme", "dark")]));
        assert!(!g.has_plausible_session(NONE));
    }

    #[test]
    fn test_fallback_cookies_without_derived_name() {
        let g = RouteGuard::new(GuardConfig::default());
        assert_eq!(
            g.decide("/profile", "", [("sb-access-token", "t")]),
            RouteDecision::Allow
        );
        assert_eq!(
            g.decide("/profile", "", [("session", "t")]),
            sign_in(Some("/profile"))
        );
    }

    #[test]
    fn test_derived_cookie_requires_value() {
        let g = RouteGuard::new(GuardConfig {
            fallback_cookies: vec![],
            session_cookie: Some("custom-session".into()),
            ..GuardConfig::default()
        });
        assert!(!g.has_plausible_session([("custom-session", "")]));
        assert!(g.has_plausible_session([("custom-session", "v")]));
    }

    #[test]
    fn test_decisions_are_idempotent() {
        let g = guard();
        let cases: [(&str, &str, &[(&str, &str)]); 4] = [
            ("/profile", "", &NONE),
            ("/profile", "", &AUTH),
            ("/auth/sign-in", "redirectTo=/stats", &AUTH),
            ("/auth/callback", "code=1", &NONE),
        ];
        for (path, query, cookies) in cases {
            let first = g.decide(path, query, cookies.iter().copied());
            for _ in 0..3 {
                assert_eq!(g.decide(path, query, cookies.iter().copied()), first);
            }
        }
    }
}
