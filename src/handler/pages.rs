// Public pages

use super::{parse_id, HandlerResult, RequestContext};
use crate::config::AppState;
use crate::session::Severity;
use crate::templates::Page;

pub fn home(ctx: &mut RequestContext, _state: &AppState) -> HandlerResult {
    Ok(ctx.render(&Page::Home))
}

pub fn about(ctx: &mut RequestContext, _state: &AppState) -> HandlerResult {
    Ok(ctx.render(&Page::About))
}

pub fn articles(ctx: &mut RequestContext, state: &AppState) -> HandlerResult {
    let articles = state.store.all_articles()?;
    Ok(ctx.render(&Page::Articles(&articles)))
}

pub fn article(ctx: &mut RequestContext, state: &AppState, raw_id: &str) -> HandlerResult {
    let found = match parse_id(raw_id) {
        Some(id) => state.store.find_article(id)?,
        None => None,
    };
    match found {
        Some(article) => Ok(ctx.render(&Page::Article(&article))),
        None => {
            ctx.flash(Severity::Danger, "Article not found");
            Ok(ctx.redirect("/articles"))
        }
    }
}
