//! Cache key construction.
//!
//! Per-client entries are stored as `msal.<client-id>.<logical-key>`.
//! Per-request temporary entries use a logical key of
//! `<tag>|<correlation-id>`, which is then namespaced like any other key.
//! Keys are only ever recognized by prefix; nothing splits a namespaced key
//! back into its parts.

/// Library prefix shared by every key this crate writes.
pub const CACHE_PREFIX: &str = "msal";

/// Separates a temporary tag from the correlation id it is scoped to.
pub const RESOURCE_DELIMITER: &str = "|";

/// Logical keys for short-lived, per-request state.
pub mod temporary {
    pub const AUTHORITY: &str = "authority";
    pub const ACQUIRE_TOKEN_ACCOUNT: &str = "acquireToken.account";
    pub const SESSION_STATE: &str = "session.state";
    pub const REQUEST_STATE: &str = "request.state";
    pub const NONCE_IDTOKEN: &str = "nonce.idtoken";
    pub const ORIGIN_URI: &str = "request.origin";
    pub const RENEW_STATUS: &str = "token.renew.status";
    pub const URL_HASH: &str = "urlHash";
    pub const REQUEST_PARAMS: &str = "request.params";
    pub const SCOPES: &str = "scopes";
}

/// Logical keys for long-lived entries.
pub mod persistent {
    pub const ID_TOKEN: &str = "idtoken";
    pub const CLIENT_INFO: &str = "client.info";
    pub const ADAL_ID_TOKEN: &str = "adal.idtoken";
    pub const ERROR: &str = "error";
    pub const ERROR_DESC: &str = "error.description";
}

/// Tags that older releases stored under the bare `msal.<tag>` form.
pub const LEGACY_TAGS: [&str; 4] = [
    persistent::ID_TOKEN,
    persistent::CLIENT_INFO,
    persistent::ERROR,
    persistent::ERROR_DESC,
];

/// Whether `client_id` can scope a namespace.
///
/// An id containing `.` could be a dotted prefix of another (`app` and
/// `app.beta`), and `|` is the temporary-key delimiter, so both are
/// rejected along with the empty id.
pub fn is_valid_client_id(client_id: &str) -> bool {
    !client_id.is_empty() && !client_id.contains(['.', '|'])
}

/// `msal.<client_id>.<logical_key>`
pub fn namespace(client_id: &str, logical_key: &str) -> String {
    format!("{CACHE_PREFIX}.{client_id}.{logical_key}")
}

/// `msal.<client_id>.`, the prefix shared by every key of one client.
pub fn client_prefix(client_id: &str) -> String {
    format!("{CACHE_PREFIX}.{client_id}.")
}

/// `msal.<tag>`, the pre-namespacing form of a persistent key.
pub fn legacy_key(tag: &str) -> String {
    format!("{CACHE_PREFIX}.{tag}")
}

/// `authority|<correlation_id>`
pub fn generate_authority_key(correlation_id: &str) -> String {
    format!(
        "{}{RESOURCE_DELIMITER}{correlation_id}",
        temporary::AUTHORITY
    )
}

/// `nonce.idtoken|<correlation_id>`
pub fn generate_nonce_key(correlation_id: &str) -> String {
    format!(
        "{}{RESOURCE_DELIMITER}{correlation_id}",
        temporary::NONCE_IDTOKEN
    )
}

/// `acquireToken.account|<account_id>|<scope>`
pub fn generate_acquire_token_account_key(account_id: &str, scope: &str) -> String {
    format!(
        "{}{RESOURCE_DELIMITER}{account_id}{RESOURCE_DELIMITER}{scope}",
        temporary::ACQUIRE_TOKEN_ACCOUNT
    )
}

/// Whether a logical key carries request state that has to survive a
/// full-page redirect, and so is mirrored into cookies when enabled.
pub fn is_redirect_state_key(logical_key: &str) -> bool {
    logical_key == temporary::REQUEST_STATE
        || logical_key == temporary::ORIGIN_URI
        || is_tagged(logical_key, temporary::NONCE_IDTOKEN)
        || is_tagged(logical_key, temporary::AUTHORITY)
}

fn is_tagged(logical_key: &str, tag: &str) -> bool {
    logical_key
        .strip_prefix(tag)
        .is_some_and(|rest| rest.starts_with(RESOURCE_DELIMITER))
}

/// Generate a fresh correlation id for a request that has no caller-supplied
/// state.
pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_namespace_format() {
        assert_eq!(namespace("client-a", "idtoken"), "msal.client-a.idtoken");
        assert_eq!(client_prefix("client-a"), "msal.client-a.");
        assert!(namespace("client-a", "x").starts_with(&client_prefix("client-a")));
    }

    #[test]
    fn test_client_id_validation() {
        assert!(is_valid_client_id("0813e1d1-ad72-46a9-8665-399bba48c201"));
        assert!(is_valid_client_id("app"));

        assert!(!is_valid_client_id(""));
        assert!(!is_valid_client_id("app.beta"));
        assert!(!is_valid_client_id("app|beta"));

        // A dotted id would make these two keys indistinguishable.
        assert_eq!(namespace("a.b", "c"), namespace("a", "b.c"));
    }

    #[test]
    fn test_temporary_key_formats() {
        assert_eq!(generate_authority_key("abc"), "authority|abc");
        assert_eq!(generate_nonce_key("abc"), "nonce.idtoken|abc");
        assert_eq!(
            generate_acquire_token_account_key("home", "openid"),
            "acquireToken.account|home|openid"
        );
    }

    #[test]
    fn test_legacy_key() {
        assert_eq!(legacy_key(persistent::ID_TOKEN), "msal.idtoken");
        assert_eq!(
            legacy_key(persistent::ERROR_DESC),
            "msal.error.description"
        );
    }

    #[test]
    fn test_redirect_state_keys() {
        assert!(is_redirect_state_key(temporary::REQUEST_STATE));
        assert!(is_redirect_state_key(temporary::ORIGIN_URI));
        assert!(is_redirect_state_key(&generate_nonce_key("s")));
        assert!(is_redirect_state_key(&generate_authority_key("s")));

        assert!(!is_redirect_state_key(temporary::REQUEST_PARAMS));
        assert!(!is_redirect_state_key(temporary::NONCE_IDTOKEN));
        assert!(!is_redirect_state_key("authority.other"));
        assert!(!is_redirect_state_key(persistent::ID_TOKEN));
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = new_correlation_id();
        let b = new_correlation_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_namespace_is_deterministic(
            client_id in "[a-zA-Z0-9-]{1,36}",
            logical_key in "[a-zA-Z0-9.|-]{1,40}",
        ) {
            prop_assert_eq!(
                namespace(&client_id, &logical_key),
                namespace(&client_id, &logical_key)
            );
        }

        #[test]
        fn prop_namespace_separates_clients(
            client_a in "[a-zA-Z0-9._|-]{0,36}",
            client_b in "[a-zA-Z0-9._|-]{0,36}",
            key_a in "[a-zA-Z0-9.|-]{1,40}",
            key_b in "[a-zA-Z0-9.|-]{1,40}",
        ) {
            prop_assume!(is_valid_client_id(&client_a) && is_valid_client_id(&client_b));
            prop_assume!(client_a != client_b);
            prop_assert_ne!(
                namespace(&client_a, &key_a),
                namespace(&client_b, &key_b)
            );
            prop_assert!(!namespace(&client_a, &key_a).starts_with(&client_prefix(&client_b)));
        }
    }
}
