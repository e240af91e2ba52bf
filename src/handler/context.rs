//! Per-request context passed explicitly into every handler

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};

use crate::http::{self, FormData};
use crate::session::{Session, Severity};
use crate::templates::{self, Layout, Page};

/// Username attached to a response for access logging
#[derive(Debug, Clone)]
pub struct RemoteUser(pub String);

/// Everything a handler may read or mutate for one request
pub struct RequestContext {
    pub method: Method,
    pub form: FormData,
    pub session: Session,
    is_head: bool,
    session_token: Option<String>,
    rotate_session: bool,
}

impl RequestContext {
    pub fn new(method: Method, form: FormData, session_token: Option<String>, session: Session) -> Self {
        let is_head = method == Method::HEAD;
        let method = if is_head { Method::GET } else { method };
        Self {
            method,
            form,
            session,
            is_head,
            session_token,
            rotate_session: false,
        }
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    pub fn flash(&mut self, severity: Severity, message: &str) {
        self.session.flash(severity, message);
    }

    /// Issue a fresh session token when the response is committed
    pub fn rotate_session(&mut self) {
        self.rotate_session = true;
    }

    /// Render `page` at 200, consuming pending flashes
    pub fn render(&mut self, page: &Page<'_>) -> Response<Full<Bytes>> {
        self.render_with_status(StatusCode::OK, page)
    }

    pub fn render_with_status(
        &mut self,
        status: StatusCode,
        page: &Page<'_>,
    ) -> Response<Full<Bytes>> {
        let flashes = self.session.take_flashes();
        let username = if self.session.is_logged_in() {
            self.session.username()
        } else {
            None
        };
        let html = templates::render(
            page,
            &Layout {
                username,
                flashes: &flashes,
            },
        );
        http::build_html_response(status, html, self.is_head)
    }

    /// Redirect, leaving pending flashes for the next page
    pub fn redirect(&self, target: &str) -> Response<Full<Bytes>> {
        http::build_redirect_response(target)
    }

    /// Hand the session back for committing
    pub fn into_session(self) -> (Option<String>, Session, bool) {
        (self.session_token, self.session, self.rotate_session)
    }
}
