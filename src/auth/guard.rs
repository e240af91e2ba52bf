// Login gate for author-only routes

use crate::config::AppState;
use crate::handler::{HandlerResult, RequestContext};
use crate::session::Severity;

const LOGIN_PATH: &str = "/login";

/// Run `handler` only for a logged-in session.
///
/// Otherwise flash "Unauthorized! Please login" and redirect to the login
/// page without invoking `handler`.
pub fn require_login<F>(ctx: &mut RequestContext, state: &AppState, handler: F) -> HandlerResult
where
    F: FnOnce(&mut RequestContext, &AppState) -> HandlerResult,
{
    if ctx.session.is_logged_in() {
        return handler(ctx, state);
    }
    tracing::debug!(method = %ctx.method, "login required");
    ctx.flash(Severity::Danger, "Unauthorized! Please login");
    Ok(ctx.redirect(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FormData;
    use crate::session::Session;
    use hyper::{Method, StatusCode};

    fn context(session: Session) -> RequestContext {
        RequestContext::new(Method::GET, FormData::default(), None, session)
    }

    #[test]
    fn test_anonymous_is_redirected_without_running_handler() {
        let state = AppState::for_tests();
        let mut ctx = context(Session::default());
        let mut called = false;
        let resp = require_login(&mut ctx, &state, |ctx, _| {
            called = true;
            Ok(ctx.redirect("/dashboard"))
        })
        .expect("guard result");

        assert!(!called);
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()["Location"], LOGIN_PATH);
        let flashes = ctx.session.take_flashes();
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].severity, Severity::Danger);
        assert_eq!(flashes[0].message, "Unauthorized! Please login");
    }

    #[test]
    fn test_logged_in_runs_handler() {
        let state = AppState::for_tests();
        let mut session = Session::default();
        session.log_in("alice");
        let mut ctx = context(session);
        let resp = require_login(&mut ctx, &state, |ctx, _| Ok(ctx.redirect("/dashboard")))
            .expect("guard result");

        assert_eq!(resp.headers()["Location"], "/dashboard");
        assert!(ctx.session.take_flashes().is_empty());
    }
}
