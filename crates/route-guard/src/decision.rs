//! Guard outcomes

/// Query parameter carrying the post-sign-in destination
pub const REDIRECT_PARAM: &str = "redirectTo";

/// What to do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Continue to the session refresh stage and the page
    Allow,
    /// Protected path without a session: go to sign-in, then come back
    RedirectToSignIn {
        sign_in_path: String,
        /// Original path and query; omitted when it would point back at `/`
        /// or at the sign-in page itself
        return_to: Option<String>,
    },
    /// Signed-in visitor on the sign-in page: send them on
    RedirectToTarget { path: String },
}

impl RouteDecision {
    pub fn is_redirect(&self) -> bool {
        !matches!(self, Self::Allow)
    }

    /// Value for the `Location` header, or `None` for [`RouteDecision::Allow`]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToSignIn {
                sign_in_path,
                return_to: Some(return_to),
            } => Some(format!(
                "{sign_in_path}?{REDIRECT_PARAM}={}",
                encode_return_path(return_to)
            )),
            Self::RedirectToSignIn {
                sign_in_path,
                return_to: None,
            } => Some(sign_in_path.clone()),
            Self::RedirectToTarget { path } => Some(path.clone()),
        }
    }
}

/// Percent-encode a return path for use as a query value. `/` stays literal
/// so the parameter still reads as a path.
fn encode_return_path(path: &str) -> String {
    urlencoding::encode(path).replace("%2F", "/")
}

/// Whether `target` is a same-origin path that is safe to redirect to
///
/// Requires a leading `/`, and rejects protocol-relative forms (`//host`,
/// `/\host`) and control characters.
pub fn is_safe_redirect(target: &str) -> bool {
    target.starts_with('/')
        && !target.starts_with("//")
        && !target.starts_with("/\\")
        && !target.chars().any(char::is_control)
}
