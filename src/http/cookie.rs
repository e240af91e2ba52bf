//! Cookie header parsing and `Set-Cookie` formatting

/// Find a cookie value by name in a `Cookie` request header
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}

/// Session cookie: host-only, script-inaccessible, sent on top-level navigation
pub fn session_cookie(name: &str, value: &str, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Cookie that instructs the client to drop `name`
pub fn expired_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_cookie() {
        let header = "theme=dark; session=abc.def; other=1";
        assert_eq!(find_cookie(header, "session"), Some("abc.def"));
        assert_eq!(find_cookie(header, "theme"), Some("dark"));
        assert_eq!(find_cookie(header, "missing"), None);
        assert_eq!(find_cookie("session=\"quoted\"", "session"), Some("quoted"));
        assert_eq!(find_cookie("sessionx=1", "session"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("session", "tok.sig", false);
        assert!(cookie.starts_with("session=tok.sig;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
        assert!(session_cookie("session", "v", true).ends_with("; Secure"));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = expired_cookie("session", false);
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
