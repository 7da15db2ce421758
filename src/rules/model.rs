//! Rule types and their wire formats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Service value that applies a rule to every service.
pub const ANY_SERVICE: &str = "*";

/// Method or role token matching everything.
pub const WILDCARD: &str = "*";

/// The two independent rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Routes that require a validated identity.
    Authentication,
    /// Identities and roles allowed to use a route.
    Authorization,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Authentication => write!(f, "authentication"),
            RuleKind::Authorization => write!(f, "authorization"),
        }
    }
}

/// A stored access-control entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: u64,
    pub service: String,
    /// Wildcard URL pattern.
    #[serde(rename = "rule")]
    pub pattern: String,
    /// `None` means every method.
    pub methods: Option<Vec<String>>,
    /// `None` means every role. Only meaningful for authorization rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    /// True if the method set is unset, wildcard, or contains `method`.
    pub fn allows_method(&self, method: &str) -> bool {
        allows(self.methods.as_deref(), Some(method))
    }

    /// True if the role set is unset, wildcard, or contains `role`.
    ///
    /// An anonymous caller (`None`) is only allowed by unset or wildcard sets.
    pub fn allows_role(&self, role: Option<&str>) -> bool {
        allows(self.roles.as_deref(), role)
    }
}

fn allows(set: Option<&[String]>, value: Option<&str>) -> bool {
    match set {
        None => true,
        Some(set) => set.iter().any(|entry| {
            entry == WILDCARD
                || value.is_some_and(|value| entry.eq_ignore_ascii_case(value))
        }),
    }
}

/// Payload for creating a rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewRule {
    pub service: String,
    #[serde(rename = "rule")]
    pub pattern: String,
    #[serde(default, deserialize_with = "tokens")]
    pub methods: Option<Vec<String>>,
    #[serde(default, deserialize_with = "tokens")]
    pub roles: Option<Vec<String>>,
}

/// Partial update; absent fields are left untouched.
///
/// An explicit `null` for `methods` or `roles` resets the set to "all".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RulePatch {
    pub service: Option<String>,
    #[serde(rename = "rule")]
    pub pattern: Option<String>,
    #[serde(default, deserialize_with = "present_tokens")]
    pub methods: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present_tokens")]
    pub roles: Option<Option<Vec<String>>>,
}

impl RulePatch {
    /// Apply the present fields to `rule`.
    pub fn apply(self, rule: &mut Rule) {
        if let Some(service) = self.service {
            rule.service = service;
        }
        if let Some(pattern) = self.pattern {
            rule.pattern = pattern;
        }
        if let Some(methods) = self.methods {
            rule.methods = methods;
        }
        if let Some(roles) = self.roles {
            rule.roles = roles;
        }
    }
}

/// A string or number on the wire, normalised to a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Token {
    Text(String),
    Integer(i64),
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        match token {
            Token::Text(s) => s,
            Token::Integer(n) => n.to_string(),
        }
    }
}

/// Deserialize a list of method/role tokens that may be strings or integers.
fn tokens<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Token>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|list| list.into_iter().map(String::from).collect()))
}

/// Like [`tokens`], but keeps an explicit `null` apart from an absent field.
fn present_tokens<'de, D>(deserializer: D) -> Result<Option<Option<Vec<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    tokens(deserializer).map(Some)
}

/// Deserialize a single optional token (string or integer).
pub fn optional_token<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Token> = Option::deserialize(deserializer)?;
    Ok(raw.map(String::from))
}
