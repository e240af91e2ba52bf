// Author dashboard and article editing. Every handler here runs behind the
// login gate, so the session always carries a username.

use super::{parse_id, HandlerResult, RequestContext};
use crate::config::AppState;
use crate::forms::{self, ValidationReport, ARTICLE_FORM};
use crate::http::FormData;
use crate::session::Severity;
use crate::templates::Page;

const DASHBOARD: &str = "/dashboard";

fn author(ctx: &RequestContext) -> String {
    ctx.session.username().unwrap_or_default().to_string()
}

pub fn dashboard(ctx: &mut RequestContext, state: &AppState) -> HandlerResult {
    let articles = state.store.articles_by_author(&author(ctx))?;
    Ok(ctx.render(&Page::Dashboard(&articles)))
}

pub fn add_form(ctx: &mut RequestContext, _state: &AppState) -> HandlerResult {
    Ok(ctx.render(&Page::AddArticle {
        form: &FormData::default(),
        report: &ValidationReport::default(),
    }))
}

pub fn add_submit(ctx: &mut RequestContext, state: &AppState) -> HandlerResult {
    let form = std::mem::take(&mut ctx.form);
    let report = forms::validate(&ARTICLE_FORM, &form);
    if !report.is_valid() {
        return Ok(ctx.render(&Page::AddArticle {
            form: &form,
            report: &report,
        }));
    }

    let author = author(ctx);
    let id = state
        .store
        .insert_article(form.value("title"), form.value("body"), &author)?;
    tracing::info!(article_id = id, %author, "article created");
    ctx.flash(Severity::Success, "Article Created");
    Ok(ctx.redirect(DASHBOARD))
}

pub fn edit_form(ctx: &mut RequestContext, state: &AppState, raw_id: &str) -> HandlerResult {
    let found = match parse_id(raw_id) {
        Some(id) => state.store.find_article(id)?,
        None => None,
    };
    let Some(article) = found else {
        ctx.flash(Severity::Danger, "Article not found");
        return Ok(ctx.redirect(DASHBOARD));
    };

    let form = FormData::from_pairs([
        ("title", article.title.as_str()),
        ("body", article.body.as_str()),
    ]);
    Ok(ctx.render(&Page::EditArticle {
        id: article.id,
        form: &form,
        report: &ValidationReport::default(),
    }))
}

pub fn edit_submit(ctx: &mut RequestContext, state: &AppState, raw_id: &str) -> HandlerResult {
    let found = match parse_id(raw_id) {
        Some(id) => state.store.find_article(id)?,
        None => None,
    };
    let Some(article) = found else {
        ctx.flash(Severity::Danger, "Article not found");
        return Ok(ctx.redirect(DASHBOARD));
    };

    let form = std::mem::take(&mut ctx.form);
    let report = forms::validate(&ARTICLE_FORM, &form);
    if !report.is_valid() {
        return Ok(ctx.render(&Page::EditArticle {
            id: article.id,
            form: &form,
            report: &report,
        }));
    }

    state
        .store
        .update_article(article.id, form.value("title"), form.value("body"))?;
    tracing::info!(article_id = article.id, "article updated");
    ctx.flash(Severity::Success, "Article Updated");
    Ok(ctx.redirect(DASHBOARD))
}

/// Delete unconditionally. Unknown ids still report success.
pub fn delete(ctx: &mut RequestContext, state: &AppState, raw_id: &str) -> HandlerResult {
    if let Some(id) = parse_id(raw_id) {
        let removed = state.store.delete_article(id)?;
        tracing::info!(article_id = id, removed, "article deleted");
    }
    ctx.flash(Severity::Success, "Article Deleted");
    Ok(ctx.redirect(DASHBOARD))
}
