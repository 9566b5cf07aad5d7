//! Redaction of credential-bearing record fields
//!
//! A rule set is a list of dotted field paths (`*` matches any key at that
//! depth). Every value found at a listed path is censored before the
//! record is written:
//!
//! - paths rooted at `url` keep the URL and only mask `access_token=`
//! - paths whose second segment is `authorization` keep the scheme token
//! - anything else is replaced by `***`

use std::fmt;

use fwlog_core_types::schema::{CENSOR, PATH_REQ_AUTHORIZATION, PATH_URL};
use fwlog_errors::{invalid_config, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref ACCESS_TOKEN: Regex = Regex::new(r"access_token=[a-zA-Z0-9_-]*").unwrap();
}

const WILDCARD: &str = "*";
const AUTHORIZATION_FIELD: &str = "authorization";

/// A dotted field path such as `req.authorization`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactPath {
    segments: Vec<String>,
}

impl RedactPath {
    /// Parse a dotted path
    ///
    /// # Errors
    ///
    /// Returns `FwError::InvalidConfig` for an empty path or empty segment.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.trim().split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(invalid_config(
                "redact_paths",
                format!("malformed redaction path '{}'", path),
            ));
        }
        Ok(Self { segments })
    }

    fn from_static(path: &'static str) -> Self {
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for RedactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Ordered set of redaction paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionRules {
    paths: Vec<RedactPath>,
}

impl RedactionRules {
    /// Rules with no paths
    pub fn none() -> Self {
        Self { paths: Vec::new() }
    }

    /// The rules every default logger installs: `req.authorization` and `url`
    pub fn standard() -> Self {
        Self {
            paths: vec![
                RedactPath::from_static(PATH_REQ_AUTHORIZATION),
                RedactPath::from_static(PATH_URL),
            ],
        }
    }

    /// Append extra paths, skipping blank entries and ones already present
    ///
    /// # Errors
    ///
    /// Returns `FwError::InvalidConfig` if any path is malformed.
    pub fn with_paths<I, S>(mut self, paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in paths {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            let path = RedactPath::parse(raw)?;
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
        }
        Ok(self)
    }

    pub fn paths(&self) -> &[RedactPath] {
        &self.paths
    }

    /// Censor every listed path present in `fields`
    ///
    /// Missing paths are left missing; nothing is inserted.
    pub fn apply(&self, fields: &mut Map<String, Value>) {
        let mut trail = Vec::new();
        for path in &self.paths {
            redact_at(fields, path.segments(), &mut trail);
        }
    }
}

impl Default for RedactionRules {
    fn default() -> Self {
        Self::standard()
    }
}

fn redact_at(map: &mut Map<String, Value>, segments: &[String], trail: &mut Vec<String>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    let keys: Vec<String> = if head == WILDCARD {
        map.keys().cloned().collect()
    } else if map.contains_key(head) {
        vec![head.clone()]
    } else {
        return;
    };

    for key in keys {
        trail.push(key.clone());
        if let Some(value) = map.get_mut(&key) {
            if rest.is_empty() {
                *value = censor(value, trail);
            } else if let Value::Object(child) = value {
                redact_at(child, rest, trail);
            }
        }
        trail.pop();
    }
}

/// Censor a single value found at the concrete `path`
pub fn censor(value: &Value, path: &[String]) -> Value {
    let Value::String(text) = value else {
        return Value::String(CENSOR.to_string());
    };

    if path.first().map(String::as_str) == Some(PATH_URL) {
        Value::String(censor_url(text))
    } else if path.get(1).map(String::as_str) == Some(AUTHORIZATION_FIELD) {
        Value::String(censor_authorization(text))
    } else {
        Value::String(CENSOR.to_string())
    }
}

/// Mask the first `access_token=` query value, leaving the rest of the URL
pub fn censor_url(url: &str) -> String {
    ACCESS_TOKEN.replace(url, "access_token=***").into_owned()
}

/// Keep the scheme token, mask the credential after it
///
/// A value without a scheme is masked entirely.
pub fn censor_authorization(value: &str) -> String {
    let trimmed = value.trim_start();
    match trimmed.find(char::is_whitespace) {
        Some(end) => format!("{} {}", &trimmed[..end], CENSOR),
        None => CENSOR.to_string(),
    }
}
