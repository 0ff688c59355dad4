//! Route protection for the edge request layer
//!
//! Decides, before any page logic runs, whether a request continues, is sent
//! to the sign-in page, or (when already signed in) is bounced off the
//! sign-in page to where it was going.
//!
//! The session check is a cookie-presence heuristic only. Validating and
//! refreshing the session is the job of the auth provider's SDK, which runs
//! after this decision.
//!
//! # Example
//!
//! ```
//! use route_guard::{GuardConfig, RouteDecision, RouteGuard};
//!
//! let guard = RouteGuard::new(GuardConfig::for_backend_url(Some(
//!     "https://test-project.supabase.co",
//! )));
//!
//! let decision = guard.decide("/profile", "", std::iter::empty());
//! assert_eq!(decision.location().as_deref(), Some("/auth/sign-in?redirectTo=/profile"));
//!
//! let cookies = [("sb-test-project-auth-token", "x")];
//! assert_eq!(guard.decide("/profile", "", cookies), RouteDecision::Allow);
//! ```

mod config;
mod decision;
mod guard;

pub use config::{
    derive_session_cookie, GuardConfig, CALLBACK_PATH, DEFAULT_PROTECTED_PREFIXES,
    FALLBACK_COOKIES, SIGN_IN_PATH,
};
pub use decision::{is_safe_redirect, RouteDecision, REDIRECT_PARAM};
pub use guard::RouteGuard;
