// Registration, login and logout

use super::{HandlerResult, RequestContext};
use crate::config::AppState;
use crate::forms::{self, ValidationReport, REGISTER_FORM};
use crate::http::FormData;
use crate::session::Severity;
use crate::store::{NewUser, StoreError};
use crate::templates::Page;

pub fn register_form(ctx: &mut RequestContext, _state: &AppState) -> HandlerResult {
    Ok(ctx.render(&Page::Register {
        form: &FormData::default(),
        report: &ValidationReport::default(),
    }))
}

pub fn register_submit(ctx: &mut RequestContext, state: &AppState) -> HandlerResult {
    let form = std::mem::take(&mut ctx.form);
    let mut report = forms::validate(&REGISTER_FORM, &form);

    if report.is_valid() {
        let password_hash = state.passwords.hash(form.value("password"))?;
        let user = NewUser {
            name: form.value("name"),
            email: form.value("email"),
            username: form.value("username"),
            password_hash: &password_hash,
        };
        match state.store.insert_user(&user) {
            Ok(id) => {
                tracing::info!(user_id = id, username = user.username, "user registered");
                ctx.flash(Severity::Success, "You are now registered and can log in");
                return Ok(ctx.redirect("/login"));
            }
            Err(StoreError::Duplicate(username)) => {
                tracing::debug!(%username, "registration rejected, username taken");
                report.push("username", "Username is already taken");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(ctx.render(&Page::Register {
        form: &form,
        report: &report,
    }))
}

pub fn login_form(ctx: &mut RequestContext, _state: &AppState) -> HandlerResult {
    Ok(ctx.render(&Page::Login { username: "" }))
}

pub fn login_submit(ctx: &mut RequestContext, state: &AppState) -> HandlerResult {
    let form = std::mem::take(&mut ctx.form);
    let username = form.value("username");

    let Some(user) = state.store.find_user_by_username(username)? else {
        tracing::debug!(username, "login failed, unknown username");
        ctx.flash(Severity::Danger, "Username not found");
        return Ok(ctx.render(&Page::Login { username }));
    };

    if !state
        .passwords
        .verify(form.value("password"), &user.password_hash)
    {
        tracing::debug!(username, "login failed, wrong password");
        ctx.flash(Severity::Danger, "Invalid login credentials");
        return Ok(ctx.render(&Page::Login { username }));
    }

    ctx.rotate_session();
    ctx.session.log_in(&user.username);
    tracing::info!(
        user_id = user.id,
        username = %user.username,
        registered = %user.register_date,
        "user logged in"
    );
    tracing::debug!(name = %user.name, email = %user.email, "account details");
    ctx.flash(Severity::Success, "You are now logged in");
    Ok(ctx.redirect("/dashboard"))
}

pub fn logout(ctx: &mut RequestContext, _state: &AppState) -> HandlerResult {
    if let Some(username) = ctx.session.username() {
        tracing::info!(username, "user logged out");
    }
    ctx.session.clear();
    ctx.flash(Severity::Success, "You are now logged out");
    Ok(ctx.redirect("/login"))
}
