// Page bodies

use std::fmt::Write;

use super::escape_html;
use crate::forms::{FieldKind, FormSchema, ValidationReport, ARTICLE_FORM, REGISTER_FORM};
use crate::http::FormData;
use crate::store::Article;

const NO_ARTICLES: &str = "No Articles Found";

/// Every page the application renders, with its context
pub enum Page<'a> {
    Home,
    About,
    Articles(&'a [Article]),
    Article(&'a Article),
    Register {
        form: &'a FormData,
        report: &'a ValidationReport,
    },
    Login {
        username: &'a str,
    },
    Dashboard(&'a [Article]),
    AddArticle {
        form: &'a FormData,
        report: &'a ValidationReport,
    },
    EditArticle {
        id: i64,
        form: &'a FormData,
        report: &'a ValidationReport,
    },
    NotFound,
    ServerError,
}

impl Page<'_> {
    pub fn title(&self) -> &str {
        match self {
            Self::Home => "Home",
            Self::About => "About",
            Self::Articles(_) => "Articles",
            Self::Article(article) => &article.title,
            Self::Register { .. } => "Register",
            Self::Login { .. } => "Login",
            Self::Dashboard(_) => "Dashboard",
            Self::AddArticle { .. } => "Add Article",
            Self::EditArticle { .. } => "Edit Article",
            Self::NotFound => "Not Found",
            Self::ServerError => "Server Error",
        }
    }

    pub(super) fn write_body(&self, html: &mut String) {
        match self {
            Self::Home => html.push_str(
                "<h1>Welcome to ArticleBoard</h1>\n\
                 <p>Read what our authors have published, or register to write your own articles.</p>\n\
                 <p><a class=\"btn\" href=\"/register\">Register</a> <a class=\"btn\" href=\"/login\">Login</a></p>\n",
            ),
            Self::About => html.push_str(
                "<h1>About</h1>\n\
                 <p>ArticleBoard is a small publishing site. Registered authors write, \
                 edit and delete articles from their dashboard; everyone can read them.</p>\n",
            ),
            Self::Articles(articles) => write_article_list(html, articles),
            Self::Article(article) => write_article(html, article),
            Self::Register { form, report } => {
                html.push_str("<h1>Register</h1>\n");
                write_schema_form(html, &REGISTER_FORM, "/register", "Submit", form, report);
                html.push_str("<p>Already registered? <a href=\"/login\">Login</a></p>\n");
            }
            Self::Login { username } => write_login(html, username),
            Self::Dashboard(articles) => write_dashboard(html, articles),
            Self::AddArticle { form, report } => {
                html.push_str("<h1>Add Article</h1>\n");
                write_schema_form(html, &ARTICLE_FORM, "/add_article", "Submit", form, report);
            }
            Self::EditArticle { id, form, report } => {
                html.push_str("<h1>Edit Article</h1>\n");
                let action = format!("/edit_article/{id}");
                write_schema_form(html, &ARTICLE_FORM, &action, "Update", form, report);
            }
            Self::NotFound => html.push_str(
                "<h1>404 Not Found</h1>\n<p>The page you requested does not exist. \
                 <a href=\"/\">Back to the home page</a></p>\n",
            ),
            Self::ServerError => html.push_str(
                "<h1>Internal Server Error</h1>\n\
                 <p>Something went wrong while handling your request. Please try again later.</p>\n",
            ),
        }
    }
}

fn write_article_list(html: &mut String, articles: &[Article]) {
    html.push_str("<h1>Articles</h1>\n");
    if articles.is_empty() {
        let _ = writeln!(html, "<p class=\"msg\">{NO_ARTICLES}</p>");
        return;
    }
    html.push_str("<ul class=\"articles\">\n");
    for article in articles {
        let _ = writeln!(
            html,
            "<li><a href=\"/article/{}/\">{}</a> <small>by {} on {}</small></li>",
            article.id,
            escape_html(&article.title),
            escape_html(&article.author),
            escape_html(&article.create_date),
        );
    }
    html.push_str("</ul>\n");
}

fn write_article(html: &mut String, article: &Article) {
    let _ = write!(
        html,
        "<h1>{}</h1>\n<small>Written by {} on {}</small>\n<hr>\n<div class=\"article-body\">",
        escape_html(&article.title),
        escape_html(&article.author),
        escape_html(&article.create_date),
    );
    let body = article.body.replace("\r\n", "\n");
    for paragraph in body.split("\n\n") {
        let text = paragraph.trim();
        if !text.is_empty() {
            let _ = writeln!(html, "<p>{}</p>", escape_html(text).replace('\n', "<br>"));
        }
    }
    html.push_str("</div>\n");
}

fn write_dashboard(html: &mut String, articles: &[Article]) {
    html.push_str(
        "<h1>Dashboard</h1>\n<p><a class=\"btn\" href=\"/add_article\">Add Article</a></p>\n",
    );
    if articles.is_empty() {
        let _ = writeln!(html, "<p class=\"msg\">{NO_ARTICLES}</p>");
        return;
    }
    html.push_str(
        "<table>\n<tr><th>ID</th><th>Title</th><th>Author</th><th>Date</th><th></th><th></th></tr>\n",
    );
    for article in articles {
        let _ = writeln!(
            html,
            "<tr><td>{id}</td><td><a href=\"/article/{id}/\">{title}</a></td><td>{author}</td><td>{date}</td>\
             <td><a class=\"btn\" href=\"/edit_article/{id}\">Edit</a></td>\
             <td><form class=\"inline\" action=\"/delete_article/{id}\" method=\"post\">\
             <input class=\"btn btn-danger\" type=\"submit\" value=\"Delete\"></form></td></tr>",
            id = article.id,
            title = escape_html(&article.title),
            author = escape_html(&article.author),
            date = escape_html(&article.create_date),
        );
    }
    html.push_str("</table>\n");
}

fn write_login(html: &mut String, username: &str) {
    let _ = write!(
        html,
        "<h1>Login</h1>\n<form action=\"/login\" method=\"post\">\n\
         <div class=\"field\"><label for=\"username\">Username</label>\
         <input id=\"username\" type=\"text\" name=\"username\" value=\"{}\"></div>\n\
         <div class=\"field\"><label for=\"password\">Password</label>\
         <input id=\"password\" type=\"password\" name=\"password\"></div>\n\
         <input class=\"btn\" type=\"submit\" value=\"Login\">\n</form>\n\
         <p>No account yet? <a href=\"/register\">Register</a></p>\n",
        escape_html(username)
    );
}

/// Render every field of `schema` with its submitted value and errors.
/// Password fields are never echoed back.
fn write_schema_form(
    html: &mut String,
    schema: &FormSchema,
    action: &str,
    submit: &str,
    form: &FormData,
    report: &ValidationReport,
) {
    let _ = writeln!(html, "<form action=\"{}\" method=\"post\">", escape_html(action));
    for field in schema.fields {
        let value = escape_html(form.value(field.name));
        let _ = write!(
            html,
            "<div class=\"field\"><label for=\"{name}\">{label}</label>",
            name = field.name,
            label = field.label,
        );
        let _ = match field.kind {
            FieldKind::Text => write!(
                html,
                "<input id=\"{0}\" type=\"text\" name=\"{0}\" value=\"{value}\">",
                field.name
            ),
            FieldKind::Email => write!(
                html,
                "<input id=\"{0}\" type=\"email\" name=\"{0}\" value=\"{value}\">",
                field.name
            ),
            FieldKind::Password => write!(
                html,
                "<input id=\"{0}\" type=\"password\" name=\"{0}\">",
                field.name
            ),
            FieldKind::TextArea => write!(
                html,
                "<textarea id=\"{0}\" name=\"{0}\">{value}</textarea>",
                field.name
            ),
        };
        let mut errors = report.errors_for(field.name).peekable();
        if errors.peek().is_some() {
            html.push_str("<ul class=\"errors\">");
            for message in errors {
                let _ = write!(html, "<li>{}</li>", escape_html(message));
            }
            html.push_str("</ul>");
        }
        html.push_str("</div>\n");
    }
    let _ = writeln!(
        html,
        "<input class=\"btn\" type=\"submit\" value=\"{}\">\n</form>",
        escape_html(submit)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms;

    fn body(page: &Page<'_>) -> String {
        let mut html = String::new();
        page.write_body(&mut html);
        html
    }

    fn article(id: i64, title: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            author: "alice".to_string(),
            body: "First paragraph.\n\nSecond <paragraph>.".to_string(),
            create_date: "2024-01-01 10:00:00".to_string(),
        }
    }

    #[test]
    fn test_empty_lists_show_message() {
        assert!(body(&Page::Articles(&[])).contains(NO_ARTICLES));
        assert!(body(&Page::Dashboard(&[])).contains(NO_ARTICLES));
    }

    #[test]
    fn test_article_list_links() {
        let articles = vec![article(3, "Third"), article(7, "Seventh")];
        let html = body(&Page::Articles(&articles));
        assert!(html.contains("href=\"/article/3/\""));
        assert!(html.contains("Seventh"));
        assert!(!html.contains(NO_ARTICLES));
    }

    #[test]
    fn test_article_body_escaped_into_paragraphs() {
        let html = body(&Page::Article(&article(1, "T")));
        assert!(html.contains("<p>First paragraph.</p>"));
        assert!(html.contains("<p>Second &lt;paragraph&gt;.</p>"));
    }

    #[test]
    fn test_dashboard_has_delete_form() {
        let articles = vec![article(5, "Mine")];
        let html = body(&Page::Dashboard(&articles));
        assert!(html.contains("action=\"/delete_article/5\" method=\"post\""));
        assert!(html.contains("href=\"/edit_article/5\""));
    }

    #[test]
    fn test_register_form_echoes_values_but_not_passwords() {
        let form = FormData::from_pairs([
            ("name", "Alice"),
            ("username", "al"),
            ("email", "alice@example.com"),
            ("password", "secret-pw"),
            ("confirm", "secret-pw"),
        ]);
        let report = forms::validate(&REGISTER_FORM, &form);
        let html = body(&Page::Register {
            form: &form,
            report: &report,
        });
        assert!(html.contains("value=\"Alice\""));
        assert!(!html.contains("secret-pw"));
        assert!(html.contains("Field must be between 4 and 25 characters long."));
    }

    #[test]
    fn test_edit_form_prefilled() {
        let form = FormData::from_pairs([("title", "Old title"), ("body", "Old <body>")]);
        let html = body(&Page::EditArticle {
            id: 9,
            form: &form,
            report: &ValidationReport::default(),
        });
        assert!(html.contains("action=\"/edit_article/9\""));
        assert!(html.contains("value=\"Old title\""));
        assert!(html.contains(">Old &lt;body&gt;</textarea>"));
    }
}
