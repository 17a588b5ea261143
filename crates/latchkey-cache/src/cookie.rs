//! Cookie mirror.
//!
//! The host exposes cookies as a single header-like string: reading it yields
//! `a=1; b=2`, writing `name=value;path=/;expires=<date>;` sets or replaces one
//! cookie. [`CookieJar`] captures exactly that surface so the rest of the
//! crate never touches a process-wide global directly.

use std::cell::RefCell;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use cookie::Cookie;
use tracing::{trace, warn};

/// Milliseconds in one day of cookie lifetime.
pub const COOKIE_LIFE_MULTIPLIER_MS: i64 = 24 * 60 * 60 * 1000;

/// HTTP date format used for the `expires` attribute.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The shared cookie header of the host environment.
pub trait CookieJar {
    /// The full cookie header, `name=value` pairs joined by `"; "`.
    fn read(&self) -> String;

    /// Apply one `Set-Cookie`-style assignment.
    fn write(&self, cookie: &str);
}

/// Write `name=value` into the jar.
///
/// Without `expiration_days` the cookie lives for the session. With it, an
/// absolute `expires` attribute is computed by [`cookie_expiration_time`];
/// a negative value expires the cookie immediately.
pub fn set_item_cookie(
    jar: &dyn CookieJar,
    name: &str,
    value: &str,
    expiration_days: Option<i64>,
) {
    let mut cookie = format!(
        "{}={};path=/;",
        urlencoding::encode(name),
        urlencoding::encode(value)
    );
    if let Some(days) = expiration_days {
        cookie.push_str(&format!("expires={};", cookie_expiration_time(days)));
    }
    trace!(cookie = %name, "Writing cookie");
    jar.write(&cookie);
}

/// Value of the first cookie named exactly `name`, or an empty string.
pub fn get_item_cookie(jar: &dyn CookieJar, name: &str) -> String {
    let prefix = format!("{}=", urlencoding::encode(name));
    let header = jar.read();

    for cookie in header.split(';') {
        let cookie = cookie.trim();
        if let Some(raw) = cookie.strip_prefix(prefix.as_str()) {
            return match urlencoding::decode(raw) {
                Ok(value) => value.into_owned(),
                Err(e) => {
                    warn!(cookie = %name, error = %e, "Cookie value is not valid UTF-8");
                    String::new()
                }
            };
        }
    }

    String::new()
}

/// Expire `name` so the host drops it.
pub fn clear_item_cookie(jar: &dyn CookieJar, name: &str) {
    set_item_cookie(jar, name, "", Some(-1));
}

/// Expire every cookie in the jar, whatever its name.
pub fn clear_all_cookies(jar: &dyn CookieJar) {
    let expires = cookie_expiration_time(-1);
    for name in cookie_names(jar) {
        trace!(cookie = %name, "Expiring cookie");
        jar.write(&format!("{name}=;path=/;expires={expires};"));
    }
}

/// Names in the cookie header, as stored (still encoded).
pub fn cookie_names(jar: &dyn CookieJar) -> Vec<String> {
    jar.read()
        .split(';')
        .filter_map(|pair| Cookie::parse(pair.trim()).ok())
        .map(|cookie| cookie.name().to_string())
        .collect()
}

/// HTTP date `days` days from now.
pub fn cookie_expiration_time(days: i64) -> String {
    cookie_expiration_time_from(Utc::now(), days)
}

/// HTTP date `days` days after `now`, i.e. `now + days * 86_400_000 ms`.
///
/// The result is clamped to the years an HTTP date can carry, 1970
/// through 9999.
pub fn cookie_expiration_time_from(now: DateTime<Utc>, days: i64) -> String {
    let (earliest, latest) = http_date_bounds();
    let delta = TimeDelta::try_milliseconds(days.saturating_mul(COOKIE_LIFE_MULTIPLIER_MS))
        .unwrap_or(if days < 0 {
            TimeDelta::MIN
        } else {
            TimeDelta::MAX
        });

    let expires = now
        .checked_add_signed(delta)
        .unwrap_or(if days < 0 { earliest } else { latest })
        .clamp(earliest, latest);

    expires.format(HTTP_DATE_FORMAT).to_string()
}

fn http_date_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    let latest = NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (DateTime::<Utc>::UNIX_EPOCH, latest)
}

/// In-memory cookie jar that behaves like a browser's `document.cookie`.
///
/// Writing an existing name replaces the cookie in place; writing an
/// `expires` date that is not in the future drops it. Attributes other than
/// `expires` are accepted and ignored.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RefCell<Vec<StoredCookie>>,
}

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
}

impl MemoryCookieJar {
    /// Create an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live cookies.
    pub fn len(&self) -> usize {
        self.cookies.borrow().len()
    }

    /// Whether the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.cookies.borrow().is_empty()
    }

    /// Drop every session cookie, keeping those with an `expires` date.
    pub fn end_session(&self) {
        self.cookies
            .borrow_mut()
            .retain(|cookie| cookie.expires.is_some());
    }
}

impl CookieJar for MemoryCookieJar {
    fn read(&self) -> String {
        self.cookies
            .borrow()
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write(&self, assignment: &str) {
        let parsed = match Cookie::parse(assignment) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(cookie = %assignment, error = %e, "Ignoring malformed cookie assignment");
                return;
            }
        };
        let name = parsed.name();
        let value = parsed.value();

        let expires = parsed
            .expires_datetime()
            .and_then(|at| DateTime::<Utc>::from_timestamp(at.unix_timestamp(), 0));
        let expired = expires.is_some_and(|expires| expires <= Utc::now());

        let mut cookies = self.cookies.borrow_mut();
        let existing = cookies.iter().position(|cookie| cookie.name == name);

        match (existing, expired) {
            (Some(index), true) => {
                cookies.remove(index);
            }
            (None, true) => {}
            (Some(index), false) => {
                cookies[index].value = value.to_string();
                cookies[index].expires = expires;
            }
            (None, false) => cookies.push(StoredCookie {
                name: name.to_string(),
                value: value.to_string(),
                expires,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_set_and_get() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "msal.client.request.state", "abc", None);
        set_item_cookie(&jar, "other", "1", Some(1));

        assert_eq!(get_item_cookie(&jar, "msal.client.request.state"), "abc");
        assert_eq!(get_item_cookie(&jar, "other"), "1");
        assert_eq!(get_item_cookie(&jar, "missing"), "");
    }

    #[test]
    fn test_names_and_values_are_encoded() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "msal.client.nonce.idtoken|abc", "a b;c=d", None);

        assert_eq!(
            jar.read(),
            "msal.client.nonce.idtoken%7Cabc=a%20b%3Bc%3Dd"
        );
        assert_eq!(
            get_item_cookie(&jar, "msal.client.nonce.idtoken|abc"),
            "a b;c=d"
        );
    }

    #[test]
    fn test_exact_name_match() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "state.extra", "wrong", None);
        set_item_cookie(&jar, "state", "right", None);

        assert_eq!(get_item_cookie(&jar, "state"), "right");
    }

    #[test]
    fn test_overwrite_replaces() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "a", "1", None);
        set_item_cookie(&jar, "a", "2", None);

        assert_eq!(jar.len(), 1);
        assert_eq!(get_item_cookie(&jar, "a"), "2");
    }

    #[test]
    fn test_clear_item_cookie() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "a", "1", None);
        set_item_cookie(&jar, "b", "2", None);

        clear_item_cookie(&jar, "a");
        assert_eq!(get_item_cookie(&jar, "a"), "");
        assert_eq!(jar.read(), "b=2");

        // Clearing a cookie that is not there is a no-op.
        clear_item_cookie(&jar, "a");
        assert_eq!(jar.read(), "b=2");
    }

    #[test]
    fn test_expiration_time_fixed_now() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();

        assert_eq!(
            cookie_expiration_time_from(now, 1),
            "Tue, 02 Jan 2024 12:30:00 GMT"
        );
        assert_eq!(
            cookie_expiration_time_from(now, -1),
            "Sun, 31 Dec 2023 12:30:00 GMT"
        );
    }

    #[test]
    fn test_expiration_time_saturates() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(
            cookie_expiration_time_from(now, i64::MAX),
            "Fri, 31 Dec 9999 23:59:59 GMT"
        );
        assert_eq!(
            cookie_expiration_time_from(now, 10_000_000),
            "Fri, 31 Dec 9999 23:59:59 GMT"
        );
        assert_eq!(
            cookie_expiration_time_from(now, i64::MIN),
            "Thu, 01 Jan 1970 00:00:00 GMT"
        );
    }

    #[test]
    fn test_far_future_cookie_is_kept() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "forever", "1", Some(i64::MAX));

        assert_eq!(get_item_cookie(&jar, "forever"), "1");
        jar.end_session();
        assert_eq!(jar.read(), "forever=1");
    }

    #[test]
    fn test_get_trims_both_ends() {
        struct RawHeader(&'static str);

        impl CookieJar for RawHeader {
            fn read(&self) -> String {
                self.0.to_string()
            }

            fn write(&self, _cookie: &str) {}
        }

        let jar = RawHeader(" a=1 ;  b=2\t; c=3");
        assert_eq!(get_item_cookie(&jar, "a"), "1");
        assert_eq!(get_item_cookie(&jar, "b"), "2");
        assert_eq!(get_item_cookie(&jar, "c"), "3");
    }

    #[test]
    fn test_write_reads_attributes_case_insensitively() {
        let jar = MemoryCookieJar::new();
        jar.write("a=1; Path=/; Expires=Fri, 31 Dec 9999 23:59:59 GMT");
        jar.write("b=2; path=/");
        jar.end_session();

        assert_eq!(jar.read(), "a=1");

        jar.write("a=; EXPIRES=Thu, 01 Jan 1970 00:00:00 GMT;");
        assert!(jar.is_empty());
    }

    #[test]
    fn test_clear_all_cookies() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "msal.client.request.state", "s", None);
        set_item_cookie(&jar, "msal.client.nonce.idtoken|abc", "n", None);
        set_item_cookie(&jar, "persistent", "1", Some(1));

        assert_eq!(cookie_names(&jar).len(), 3);
        clear_all_cookies(&jar);

        assert!(jar.is_empty());
        assert_eq!(jar.read(), "");
        // Already empty: nothing to do.
        clear_all_cookies(&jar);
        assert!(jar.is_empty());
    }

    #[test]
    fn test_end_session_keeps_persistent_cookies() {
        let jar = MemoryCookieJar::new();
        set_item_cookie(&jar, "session", "1", None);
        set_item_cookie(&jar, "persistent", "2", Some(7));

        jar.end_session();

        assert_eq!(jar.read(), "persistent=2");
    }

    #[test]
    fn test_malformed_assignment_ignored() {
        let jar = MemoryCookieJar::new();
        jar.write("no-equals-sign");
        assert!(jar.is_empty());
    }
}
