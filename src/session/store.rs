//! In-process session store
//!
//! Cookies carry `<token>.<hex hmac-sha256(token)>`; the session payload
//! itself never leaves the server. A cookie that fails signature
//! verification, or names a token the store no longer holds, yields a fresh
//! empty session.
//!
//! Entries expire: logged-in sessions after `session.ttl_secs`, anonymous
//! flash-only ones after `session.anonymous_ttl_secs`. Expired entries are
//! dropped on load and swept from the map on commit.

use hmac::{Hmac, Mac};
use parking_lot::Mutex;
use sha2::Sha256;
use std::collections::HashMap;

use super::Session;
use crate::config::SessionConfig;

type HmacSha256 = Hmac<Sha256>;

/// What the response must do with the client's session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieUpdate {
    /// Cookie is still valid as sent
    Keep,
    /// Issue this signed cookie value
    Set(String),
    /// Expire the cookie
    Clear,
}

/// Seconds between sweeps of expired entries
const SWEEP_INTERVAL_SECS: i64 = 60;

struct Entry {
    session: Session,
    expires_at: i64,
}

struct Inner {
    entries: HashMap<String, Entry>,
    last_sweep: i64,
}

pub struct SessionStore {
    inner: Mutex<Inner>,
    key: Vec<u8>,
    ttl_secs: i64,
    anonymous_ttl_secs: i64,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                last_sweep: 0,
            }),
            key: config.secret.as_bytes().to_vec(),
            ttl_secs: i64::try_from(config.ttl_secs).unwrap_or(i64::MAX),
            anonymous_ttl_secs: i64::try_from(config.anonymous_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Resolve a cookie value to its token and a copy of the session.
    pub fn load(&self, cookie_value: Option<&str>) -> (Option<String>, Session) {
        self.load_at(cookie_value, chrono::Utc::now().timestamp())
    }

    /// Write a request's session back.
    ///
    /// `rotate` discards the old token and issues a new one (used on login).
    /// Empty sessions are not stored. Every stored write pushes the expiry
    /// forward by the session's TTL.
    pub fn commit(&self, token: Option<String>, session: Session, rotate: bool) -> CookieUpdate {
        self.commit_at(token, session, rotate, chrono::Utc::now().timestamp())
    }

    fn load_at(&self, cookie_value: Option<&str>, now: i64) -> (Option<String>, Session) {
        let Some(token) = cookie_value.and_then(|value| self.verify(value)) else {
            return (None, Session::default());
        };

        let mut inner = self.inner.lock();
        let expired = match inner.entries.get(token) {
            Some(entry) if entry.expires_at > now => {
                return (Some(token.to_string()), entry.session.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.entries.remove(token);
        }
        (None, Session::default())
    }

    fn commit_at(&self, token: Option<String>, session: Session, rotate: bool, now: i64) -> CookieUpdate {
        let mut inner = self.inner.lock();
        if now - inner.last_sweep >= SWEEP_INTERVAL_SECS {
            inner.entries.retain(|_, entry| entry.expires_at > now);
            inner.last_sweep = now;
        }

        let token = match token {
            Some(old) if rotate => {
                inner.entries.remove(&old);
                None
            }
            other => other,
        };

        match token {
            Some(token) if session.is_empty() => {
                inner.entries.remove(&token);
                CookieUpdate::Clear
            }
            Some(token) => {
                let entry = self.entry(session, now);
                inner.entries.insert(token, entry);
                CookieUpdate::Keep
            }
            None if session.is_empty() => {
                if rotate {
                    CookieUpdate::Clear
                } else {
                    CookieUpdate::Keep
                }
            }
            None => {
                let token = uuid::Uuid::new_v4().simple().to_string();
                let value = self.sign(&token);
                let entry = self.entry(session, now);
                inner.entries.insert(token, entry);
                CookieUpdate::Set(value)
            }
        }
    }

    fn entry(&self, session: Session, now: i64) -> Entry {
        let ttl = if session.is_logged_in() {
            self.ttl_secs
        } else {
            self.anonymous_ttl_secs
        };
        Entry {
            session,
            expires_at: now.saturating_add(ttl),
        }
    }

    /// Drop every entry expired as of `now`
    #[cfg(test)]
    pub fn sweep_at(&self, now: i64) {
        let mut inner = self.inner.lock();
        inner.entries.retain(|_, entry| entry.expires_at > now);
        inner.last_sweep = now;
    }

    /// Number of live sessions
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    fn mac(&self, token: &str) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .unwrap_or_else(|_| unreachable!("hmac accepts any key length"));
        mac.update(token.as_bytes());
        mac
    }

    fn sign(&self, token: &str) -> String {
        let signature = self.mac(token).finalize().into_bytes();
        format!("{token}.{}", hex::encode(signature))
    }

    /// Return the token if the signature matches (constant-time comparison)
    fn verify<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (token, signature) = value.rsplit_once('.')?;
        let expected = hex::decode(signature).ok()?;
        self.mac(token).verify_slice(&expected).ok()?;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Severity;

    fn store_with_secret(secret: &str) -> SessionStore {
        SessionStore::new(&SessionConfig {
            secret: secret.to_string(),
            cookie_name: "session".to_string(),
            secure: false,
            ttl_secs: 3600,
            anonymous_ttl_secs: 300,
        })
    }

    fn logged_in(username: &str) -> Session {
        let mut session = Session::default();
        session.log_in(username);
        session
    }

    fn issue(store: &SessionStore, session: Session) -> String {
        match store.commit(None, session, false) {
            CookieUpdate::Set(value) => value,
            other => panic!("expected a new cookie, got {other:?}"),
        }
    }

    #[test]
    fn test_issue_and_load() {
        let store = store_with_secret("secret");
        let cookie = issue(&store, logged_in("alice"));

        let (token, session) = store.load(Some(&cookie));
        assert!(token.is_some());
        assert_eq!(session.username(), Some("alice"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_tampered_cookie_is_ignored() {
        let store = store_with_secret("secret");
        let cookie = issue(&store, logged_in("alice"));

        let (token, signature) = cookie.rsplit_once('.').unwrap();
        let forged = format!("{token}x.{signature}");
        let (loaded, session) = store.load(Some(&forged));
        assert!(loaded.is_none());
        assert!(session.is_empty());

        assert!(store.load(Some("no-signature")).0.is_none());
        assert!(store.load(Some(&format!("{token}.zz"))).0.is_none());
    }

    #[test]
    fn test_cookie_signed_with_other_secret_is_ignored() {
        let issuer = store_with_secret("secret-a");
        let cookie = issue(&issuer, logged_in("alice"));
        let other = store_with_secret("secret-b");
        assert!(other.load(Some(&cookie)).0.is_none());
    }

    #[test]
    fn test_empty_session_is_not_stored() {
        let store = store_with_secret("secret");
        assert_eq!(
            store.commit(None, Session::default(), false),
            CookieUpdate::Keep
        );
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_emptied_session_clears_cookie() {
        let store = store_with_secret("secret");
        let mut session = Session::default();
        session.flash(Severity::Success, "registered");
        let cookie = issue(&store, session);

        let (token, mut session) = store.load(Some(&cookie));
        session.take_flashes();
        assert_eq!(store.commit(token, session, false), CookieUpdate::Clear);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_rotate_issues_new_token() {
        let store = store_with_secret("secret");
        let mut anonymous = Session::default();
        anonymous.flash(Severity::Danger, "Unauthorized! Please login");
        let old_cookie = issue(&store, anonymous);

        let (token, mut session) = store.load(Some(&old_cookie));
        session.take_flashes();
        session.log_in("alice");
        let CookieUpdate::Set(new_cookie) = store.commit(token, session, true) else {
            panic!("rotation must issue a new cookie");
        };

        assert_ne!(new_cookie, old_cookie);
        assert!(store.load(Some(&old_cookie)).0.is_none());
        assert_eq!(store.load(Some(&new_cookie)).1.username(), Some("alice"));
        assert_eq!(store.len(), 1);
    }

    fn flashed() -> Session {
        let mut session = Session::default();
        session.flash(Severity::Danger, "Unauthorized! Please login");
        session
    }

    #[test]
    fn test_expired_cookie_loads_empty_session() {
        let store = store_with_secret("secret");
        let CookieUpdate::Set(cookie) = store.commit_at(None, logged_in("alice"), false, 1_000) else {
            panic!("expected a new cookie");
        };

        assert_eq!(store.load_at(Some(&cookie), 4_599).1.username(), Some("alice"));
        let (token, session) = store.load_at(Some(&cookie), 4_600);
        assert!(token.is_none());
        assert!(session.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_anonymous_sessions_expire_sooner() {
        let store = store_with_secret("secret");
        let CookieUpdate::Set(anonymous) = store.commit_at(None, flashed(), false, 0) else {
            panic!("expected a new cookie");
        };
        let CookieUpdate::Set(author) = store.commit_at(None, logged_in("alice"), false, 0) else {
            panic!("expected a new cookie");
        };

        assert!(store.load_at(Some(&anonymous), 300).0.is_none());
        assert!(store.load_at(Some(&author), 300).0.is_some());
    }

    #[test]
    fn test_commit_refreshes_expiry() {
        let store = store_with_secret("secret");
        let CookieUpdate::Set(cookie) = store.commit_at(None, logged_in("alice"), false, 0) else {
            panic!("expected a new cookie");
        };

        let (token, session) = store.load_at(Some(&cookie), 3_000);
        assert_eq!(store.commit_at(token, session, false, 3_000), CookieUpdate::Keep);
        assert!(store.load_at(Some(&cookie), 6_000).0.is_some());
    }

    #[test]
    fn test_commit_sweeps_abandoned_sessions() {
        let store = store_with_secret("secret");
        for _ in 0..1000 {
            store.commit_at(None, flashed(), false, 0);
        }
        assert_eq!(store.len(), 1000);

        store.commit_at(None, logged_in("alice"), false, 301);
        assert_eq!(store.len(), 1);
    }
}
