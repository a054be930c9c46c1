//! Token records and the query seam between a token source and its consumers.

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// A named bearer credential as it appears in the token file.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Token {
    pub name: String,
    #[serde(rename = "token")]
    pub secret: String,
    pub description: String,
    #[serde(rename = "is_disabled", deserialize_with = "deserialize_flag")]
    pub disabled: bool,
}

/// Accepts YAML 1.1 boolean spellings (`yes`/`no`, `on`/`off`) alongside
/// `true`/`false`, case-insensitively. A null value reads as `false`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean (true/false, yes/no, on/off)")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

impl Token {
    pub fn new(name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// True iff `secret` is this token's secret and the token is enabled.
    pub fn matches(&self, secret: &str) -> bool {
        let equal: bool = self.secret.as_bytes().ct_eq(secret.as_bytes()).into();
        equal && !self.disabled
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("description", &self.description)
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// An ordered list of tokens, replaced wholesale on every reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet(Vec<Token>);

impl TokenSet {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.0.iter()
    }

    /// Linear scan; token files are small and hand-curated.
    pub fn contains_valid(&self, secret: &str) -> bool {
        self.0.iter().any(|t| t.matches(secret))
    }
}

impl From<Vec<Token>> for TokenSet {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }
}

/// Answers whether a bearer secret is currently accepted.
pub trait TokenValidator: Send + Sync {
    fn is_token_valid(&self, secret: &str) -> bool;
}

impl<T: TokenValidator + ?Sized> TokenValidator for Arc<T> {
    fn is_token_valid(&self, secret: &str) -> bool {
        (**self).is_token_valid(secret)
    }
}

impl TokenValidator for TokenSet {
    fn is_token_valid(&self, secret: &str) -> bool {
        self.contains_valid(secret)
    }
}
