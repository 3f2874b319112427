use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire shape of the token payload.
///
/// Registered JWT claim names are used on the wire so any RS256 verifier can
/// read the token; `scope` is a single space-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "sub")]
    pub subject: String,
    pub scope: String,
}

/// A set of capability names such as `blueprints.read`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeSet(BTreeSet<String>);

impl ScopeSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse a space-separated scope claim. Repeated whitespace is ignored.
    pub fn parse(scope: &str) -> Self {
        scope.split_whitespace().map(str::to_string).collect()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn insert(&mut self, scope: impl Into<String>) -> bool {
        self.0.insert(scope.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Format as the value of the `scope` claim
    pub fn to_claim(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_claim())
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// What a successfully verified token tells the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub scopes: ScopeSet,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<Claims> for VerifiedClaims {
    fn from(claims: Claims) -> Self {
        Self {
            scopes: ScopeSet::parse(&claims.scope),
            subject: claims.subject,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}
