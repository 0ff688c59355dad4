//! Placeholder pages. The UI is served elsewhere; these exist so the guard's
//! behavior is visible end to end.

use axum::response::Html;

/// GET /profile
pub async fn profile() -> Html<&'static str> {
    Html("<!doctype html><title>Profile</title><h1>Profile</h1>")
}

/// GET /stats
pub async fn stats() -> Html<&'static str> {
    Html("<!doctype html><title>Stats</title><h1>Stats</h1>")
}

/// GET /auth/sign-in
pub async fn sign_in() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}

/// GET /auth/callback
pub async fn auth_callback() -> Html<&'static str> {
    Html("<!doctype html><title>Signing in</title><p>Signing in&hellip;</p>")
}
