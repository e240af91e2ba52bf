// Path to endpoint matching

use hyper::Method;

/// Every route the application serves. Path parameters are kept raw; handlers
/// decide what a parameter that is not a valid id means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Home,
    About,
    Articles,
    Article(String),
    Register,
    Login,
    Logout,
    Dashboard,
    AddArticle,
    EditArticle(String),
    DeleteArticle(String),
    Health,
}

/// Resolve a request path. A single trailing slash is ignored.
pub fn match_path(path: &str) -> Option<Endpoint> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

    let endpoint = match segments.as_slice() {
        [] => Endpoint::Home,
        ["about"] => Endpoint::About,
        ["articles"] => Endpoint::Articles,
        ["article", id] if !id.is_empty() => Endpoint::Article((*id).to_string()),
        ["register"] => Endpoint::Register,
        ["login"] => Endpoint::Login,
        ["logout"] => Endpoint::Logout,
        ["dashboard"] => Endpoint::Dashboard,
        ["add_article"] => Endpoint::AddArticle,
        ["edit_article", id] if !id.is_empty() => Endpoint::EditArticle((*id).to_string()),
        ["delete_article", id] if !id.is_empty() => Endpoint::DeleteArticle((*id).to_string()),
        ["healthz"] => Endpoint::Health,
        _ => return None,
    };
    Some(endpoint)
}

impl Endpoint {
    const fn accepts_post(&self) -> bool {
        matches!(
            self,
            Self::Register | Self::Login | Self::AddArticle | Self::EditArticle(_) | Self::DeleteArticle(_)
        )
    }

    const fn accepts_get(&self) -> bool {
        !matches!(self, Self::DeleteArticle(_))
    }

    /// Whether `method` is served. HEAD follows GET.
    pub fn allows(&self, method: &Method) -> bool {
        match *method {
            Method::GET | Method::HEAD => self.accepts_get(),
            Method::POST => self.accepts_post(),
            _ => false,
        }
    }

    /// Value for the `Allow` header of a 405 response
    pub fn allow_header(&self) -> &'static str {
        match (self.accepts_get(), self.accepts_post()) {
            (true, true) => "GET, HEAD, POST",
            (false, true) => "POST",
            _ => "GET, HEAD",
        }
    }

    /// Author-only endpoints behind the login gate
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Dashboard
                | Self::AddArticle
                | Self::EditArticle(_)
                | Self::DeleteArticle(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_paths() {
        assert_eq!(match_path("/"), Some(Endpoint::Home));
        assert_eq!(match_path("/about"), Some(Endpoint::About));
        assert_eq!(match_path("/articles/"), Some(Endpoint::Articles));
        assert_eq!(match_path("/healthz"), Some(Endpoint::Health));
        assert_eq!(match_path("/nope"), None);
        assert_eq!(match_path("/about/more"), None);
    }

    #[test]
    fn test_article_trailing_slash() {
        assert_eq!(match_path("/article/7"), Some(Endpoint::Article("7".into())));
        assert_eq!(match_path("/article/7/"), Some(Endpoint::Article("7".into())));
        assert_eq!(match_path("/article/"), None);
        assert_eq!(match_path("/article//"), None);
    }

    #[test]
    fn test_id_kept_raw() {
        assert_eq!(
            match_path("/edit_article/abc"),
            Some(Endpoint::EditArticle("abc".into()))
        );
        assert_eq!(
            match_path("/delete_article/3"),
            Some(Endpoint::DeleteArticle("3".into()))
        );
    }

    #[test]
    fn test_methods() {
        let delete = Endpoint::DeleteArticle("1".into());
        assert!(delete.allows(&Method::POST));
        assert!(!delete.allows(&Method::GET));
        assert_eq!(delete.allow_header(), "POST");

        assert!(Endpoint::Register.allows(&Method::POST));
        assert!(Endpoint::Articles.allows(&Method::HEAD));
        assert!(!Endpoint::Articles.allows(&Method::POST));
        assert!(!Endpoint::Login.allows(&Method::PUT));
        assert_eq!(Endpoint::Login.allow_header(), "GET, HEAD, POST");
        assert_eq!(Endpoint::About.allow_header(), "GET, HEAD");
    }

    #[test]
    fn test_login_gate() {
        assert!(Endpoint::Dashboard.requires_login());
        assert!(Endpoint::EditArticle("1".into()).requires_login());
        assert!(!Endpoint::Logout.requires_login());
        assert!(!Endpoint::Articles.requires_login());
    }
}
