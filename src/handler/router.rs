//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body limits, session loading,
//! route matching, method validation, the login gate and dispatch.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body as _, Bytes, Incoming};
use hyper::header::{HeaderName, HeaderValue, COOKIE, REFERER, SERVER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Response, StatusCode, Version};

use super::accounts;
use super::articles;
use super::pages;
use super::{HandlerError, HandlerResult, RemoteUser, RequestContext};
use crate::auth;
use crate::config::AppState;
use crate::http::{self, cookie, FormData};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Endpoint};
use crate::session::CookieUpdate;
use crate::templates::{self, Layout, Page};

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let max_body_size = state.config.http.max_body_size;

    let mut entry = state.access_log_enabled().then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            parts.method.to_string(),
            parts.uri.path().to_string(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = http_version(parts.version).to_string();
        entry.referer = header_string(&parts.headers, &REFERER);
        entry.user_agent = header_string(&parts.headers, &USER_AGENT);
        entry
    });

    let response = if let Some(resp) = check_body_size(&parts.headers, max_body_size) {
        resp
    } else {
        match read_body(&parts.method, body, max_body_size).await {
            Ok(bytes) => {
                let session_cookie = parts
                    .headers
                    .get_all(COOKIE)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .find_map(|header| cookie::find_cookie(header, &state.config.session.cookie_name))
                    .map(ToString::to_string);
                respond_blocking(
                    Arc::clone(&state),
                    parts.method.clone(),
                    parts.uri.path().to_string(),
                    session_cookie,
                    bytes,
                )
                .await
            }
            Err(resp) => resp,
        }
    };

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.remote_user = response
            .extensions()
            .get::<RemoteUser>()
            .map(|user| user.0.clone());
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect a POST body, bounded by `max_body_size`. Other methods ignore the body.
async fn read_body(
    method: &Method,
    body: Incoming,
    max_body_size: u64,
) -> Result<Bytes, Response<Full<Bytes>>> {
    if *method != Method::POST {
        return Ok(Bytes::new());
    }
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response())
        }
    }
}

/// Run [`respond`] on the blocking pool.
///
/// Password hashing and SQLite calls block, so they stay off the async
/// workers. A response not produced within `performance.write_timeout`, or
/// a panicked handler, becomes the 500 page.
pub async fn respond_blocking(
    state: Arc<AppState>,
    method: Method,
    path: String,
    session_cookie: Option<String>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let is_head = method == Method::HEAD;
    let limit = Duration::from_secs(state.config.performance.write_timeout);
    let server = HeaderValue::from_str(&state.config.http.server_name).ok();
    let task = tokio::task::spawn_blocking(move || {
        respond(&state, &method, &path, session_cookie.as_deref(), &body)
    });

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            logger::log_error(&format!("Request handler failed: {e}"));
            server_error_page(is_head, server)
        }
        Err(_) => {
            logger::log_error(&format!("Request handler exceeded {}s", limit.as_secs()));
            server_error_page(is_head, server)
        }
    }
}

/// Bare 500 page for failures outside any session
fn server_error_page(is_head: bool, server: Option<HeaderValue>) -> Response<Full<Bytes>> {
    let html = templates::render(
        &Page::ServerError,
        &Layout {
            username: None,
            flashes: &[],
        },
    );
    let mut response = http::build_html_response(StatusCode::INTERNAL_SERVER_ERROR, html, is_head);
    if let Some(server) = server {
        response.headers_mut().insert(SERVER, server);
    }
    response
}

/// Produce the response for one request.
///
/// `session_cookie` is the raw value of the session cookie, if the client sent
/// one. Store and hashing failures become a 500 page; the session is still
/// committed so pending flashes survive.
pub fn respond(
    state: &AppState,
    method: &Method,
    path: &str,
    session_cookie: Option<&str>,
    body: &[u8],
) -> Response<Full<Bytes>> {
    let mut response = route(state, method, path, session_cookie, body);
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }
    response
}

fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    session_cookie: Option<&str>,
    body: &[u8],
) -> Response<Full<Bytes>> {
    let (token, session) = state.sessions.load(session_cookie);

    let Some(endpoint) = routing::match_path(path) else {
        tracing::debug!(%path, "no route");
        let mut ctx = RequestContext::new(method.clone(), FormData::default(), token, session);
        let response = ctx.render_with_status(StatusCode::NOT_FOUND, &Page::NotFound);
        return finish(state, ctx, response);
    };

    if !endpoint.allows(method) {
        logger::log_warning(&format!("Method not allowed: {method} {path}"));
        return http::build_405_response(endpoint.allow_header());
    }

    let form = if *method == Method::POST {
        FormData::parse(body)
    } else {
        FormData::default()
    };
    let mut ctx = RequestContext::new(method.clone(), form, token, session);

    let result = if endpoint.requires_login() {
        auth::require_login(&mut ctx, state, |ctx, state| dispatch(&endpoint, ctx, state))
    } else {
        dispatch(&endpoint, &mut ctx, state)
    };

    let response = result.unwrap_or_else(|e| {
        log_handler_error(method, path, &e);
        ctx.render_with_status(StatusCode::INTERNAL_SERVER_ERROR, &Page::ServerError)
    });
    finish(state, ctx, response)
}

/// Call the handler for `endpoint`
fn dispatch(endpoint: &Endpoint, ctx: &mut RequestContext, state: &AppState) -> HandlerResult {
    let post = ctx.is_post();
    match endpoint {
        Endpoint::Home => pages::home(ctx, state),
        Endpoint::About => pages::about(ctx, state),
        Endpoint::Articles => pages::articles(ctx, state),
        Endpoint::Article(id) => pages::article(ctx, state, id),
        Endpoint::Register if post => accounts::register_submit(ctx, state),
        Endpoint::Register => accounts::register_form(ctx, state),
        Endpoint::Login if post => accounts::login_submit(ctx, state),
        Endpoint::Login => accounts::login_form(ctx, state),
        Endpoint::Logout => accounts::logout(ctx, state),
        Endpoint::Dashboard => articles::dashboard(ctx, state),
        Endpoint::AddArticle if post => articles::add_submit(ctx, state),
        Endpoint::AddArticle => articles::add_form(ctx, state),
        Endpoint::EditArticle(id) if post => articles::edit_submit(ctx, state, id),
        Endpoint::EditArticle(id) => articles::edit_form(ctx, state, id),
        Endpoint::DeleteArticle(id) => articles::delete(ctx, state, id),
        Endpoint::Health => Ok(http::build_health_response("ok")),
    }
}

/// Commit the session and attach the resulting cookie
fn finish(
    state: &AppState,
    ctx: RequestContext,
    mut response: Response<Full<Bytes>>,
) -> Response<Full<Bytes>> {
    let (token, session, rotate) = ctx.into_session();
    if session.is_logged_in() {
        if let Some(username) = session.username() {
            response
                .extensions_mut()
                .insert(RemoteUser(username.to_string()));
        }
    }

    let session_config = &state.config.session;
    match state.sessions.commit(token, session, rotate) {
        CookieUpdate::Keep => {}
        CookieUpdate::Set(value) => http::append_set_cookie(
            &mut response,
            &cookie::session_cookie(&session_config.cookie_name, &value, session_config.secure),
        ),
        CookieUpdate::Clear => http::append_set_cookie(
            &mut response,
            &cookie::expired_cookie(&session_config.cookie_name, session_config.secure),
        ),
    }
    response
}

fn log_handler_error(method: &Method, path: &str, error: &HandlerError) {
    logger::log_error(&format!("{method} {path} failed: {error}"));
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
