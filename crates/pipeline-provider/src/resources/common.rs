//! Nested settings shared by several component kinds.

use provider_framework::schema::{attributes, Attribute, Validator};
use provider_framework::Diagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DECODINGS: [&str; 3] = ["json", "ndjson", "text"];

pub(crate) fn one_of(values: &[&str]) -> Validator {
    Validator::OneOf(values.iter().map(|v| v.to_string()).collect())
}

pub(crate) fn non_empty() -> Validator {
    Validator::LengthBetween {
        min: 1,
        max: 1024,
    }
}

/// Event field paths start with a dot, e.g. `.message` or `.metadata.host`.
pub(crate) fn field_path() -> Validator {
    Validator::Matches {
        pattern: r"^\.\S+$".to_string(),
        message: "must be a field path starting with \".\"".to_string(),
    }
}

/// Same rule as [`field_path`], for list elements the schema cannot reach.
pub(crate) fn validate_field_paths(attribute: &str, fields: &[String], diags: &mut Diagnostics) {
    for (i, field) in fields.iter().enumerate() {
        if !field.starts_with('.') || field.len() < 2 || field.contains(char::is_whitespace) {
            diags.attribute_error(
                format!("{attribute}[{i}]"),
                "Invalid Attribute Value Match",
                format!("Attribute {attribute}[{i}] must be a field path starting with \".\", got: \"{field}\""),
            );
        }
    }
}

/// A `host:port` pair of a Kafka broker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    pub host: String,
    pub port: i64,
}

pub fn broker_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        ("host", Attribute::required_string().with_validator(non_empty())),
        (
            "port",
            Attribute::required_int64().with_validator(Validator::Int64Between { min: 1, max: 65535 }),
        ),
    ])
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sasl {
    pub mechanism: String,
    pub username: String,
    pub password: String,
}

pub fn sasl_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        (
            "mechanism",
            Attribute::optional_string()
                .with_default("plain")
                .with_validator(one_of(&["plain", "scram-sha-256", "scram-sha-512"])),
        ),
        ("username", Attribute::required_string()),
        ("password", Attribute::required_string().sensitive()),
    ])
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsAuth {
    pub access_key_id: String,
    pub secret_access_key: String,
}

pub fn aws_auth_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        ("access_key_id", Attribute::required_string().with_validator(non_empty())),
        (
            "secret_access_key",
            Attribute::required_string().sensitive().with_validator(non_empty()),
        ),
    ])
}

/// One comparison inside a [`Conditional`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub value_string: Option<String>,
    #[serde(default)]
    pub value_number: Option<f64>,
}

const STRING_OPERATORS: [&str; 4] = ["contains", "starts_with", "ends_with", "regex"];
const NUMBER_OPERATORS: [&str; 4] = ["greater", "greater_or_equal", "less", "less_or_equal"];
const EITHER_OPERATORS: [&str; 2] = ["equal", "not_equal"];
const PRESENCE_OPERATORS: [&str; 2] = ["exists", "not_exists"];

fn operators() -> Vec<&'static str> {
    STRING_OPERATORS
        .iter()
        .chain(&NUMBER_OPERATORS)
        .chain(&EITHER_OPERATORS)
        .chain(&PRESENCE_OPERATORS)
        .copied()
        .collect()
}

impl Expression {
    fn validate(&self, path: &str, diags: &mut Diagnostics) {
        let op = self.operator.as_str();
        let values = usize::from(self.value_string.is_some()) + usize::from(self.value_number.is_some());
        let problem = if PRESENCE_OPERATORS.contains(&op) {
            (values != 0).then(|| format!("operator \"{op}\" does not take a value"))
        } else if values != 1 {
            Some("exactly one of value_string or value_number must be set".to_string())
        } else if STRING_OPERATORS.contains(&op) && self.value_string.is_none() {
            Some(format!("operator \"{op}\" requires value_string"))
        } else if NUMBER_OPERATORS.contains(&op) && self.value_number.is_none() {
            Some(format!("operator \"{op}\" requires value_number"))
        } else {
            None
        };
        if let Some(problem) = problem {
            diags.attribute_error(
                path,
                "Invalid expression",
                format!("Expression on {}: {problem}.", self.field),
            );
        }
    }
}

/// A boolean expression over event fields, used by filter, route and sample processors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub expressions: Vec<Expression>,
    #[serde(default)]
    pub logical_operation: Option<String>,
}

impl Conditional {
    pub fn validate(&self, path: &str, diags: &mut Diagnostics) {
        for (i, expression) in self.expressions.iter().enumerate() {
            expression.validate(&format!("{path}.expressions[{i}]"), diags);
        }
    }
}

pub fn expression_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        ("field", Attribute::required_string().with_validator(field_path())),
        ("operator", Attribute::required_string().with_validator(one_of(&operators()))),
        ("value_string", Attribute::optional_string()),
        ("value_number", Attribute::optional_float64()),
    ])
}

pub fn conditional_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        (
            "expressions",
            Attribute::required_object_list(expression_attributes())
                .with_validator(Validator::SizeAtLeast(1)),
        ),
        (
            "logical_operation",
            Attribute::optional_string()
                .with_default("AND")
                .with_validator(one_of(&["AND", "OR"])),
        ),
    ])
}

/// Where an alert notification is delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertService {
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub routing_key: Option<String>,
    #[serde(default)]
    pub message_text: Option<String>,
    #[serde(default)]
    pub ingestion_key: Option<String>,
}

pub const ALERT_SERVICES: [&str; 4] = ["webhook", "slack", "pager_duty", "log_analysis"];

impl AlertService {
    pub fn validate(&self, diags: &mut Diagnostics) {
        let missing = match self.name.as_str() {
            "webhook" | "slack" if self.uri.is_none() => Some("uri"),
            "pager_duty" if self.routing_key.is_none() => Some("routing_key"),
            "log_analysis" if self.ingestion_key.is_none() => Some("ingestion_key"),
            _ => None,
        };
        if let Some(field) = missing {
            diags.attribute_error(
                format!("service.{field}"),
                "Missing required argument",
                format!("The \"{}\" service requires \"{field}\".", self.name),
            );
        }
    }
}

pub fn alert_service_attributes() -> BTreeMap<String, Attribute> {
    attributes([
        ("name", Attribute::required_string().with_validator(one_of(&ALERT_SERVICES))),
        (
            "uri",
            Attribute::optional_string().with_validator(Validator::Matches {
                pattern: "^https?://".to_string(),
                message: "must be an http(s) URL".to_string(),
            }),
        ),
        ("routing_key", Attribute::optional_string().sensitive()),
        ("message_text", Attribute::optional_string()),
        ("ingestion_key", Attribute::optional_string().sensitive()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression(operator: &str, s: Option<&str>, n: Option<f64>) -> Expression {
        Expression {
            field: ".status".into(),
            operator: operator.into(),
            value_string: s.map(String::from),
            value_number: n,
        }
    }

    #[test]
    fn test_expressions_need_exactly_one_matching_value() {
        let conditional = Conditional {
            expressions: vec![
                expression("equal", Some("ok"), None),
                expression("greater", None, Some(400.0)),
                expression("exists", None, None),
                expression("equal", Some("a"), Some(1.0)),
                expression("contains", None, Some(1.0)),
                expression("not_exists", Some("x"), None),
            ],
            logical_operation: Some("OR".into()),
        };
        let mut diags = Diagnostics::new();
        conditional.validate("conditional", &mut diags);
        let paths: Vec<_> = diags.iter().filter_map(|d| d.attribute.clone()).collect();
        assert_eq!(
            paths,
            vec![
                "conditional.expressions[3]",
                "conditional.expressions[4]",
                "conditional.expressions[5]"
            ]
        );
    }

    #[test]
    fn test_alert_service_requirements() {
        let mut diags = Diagnostics::new();
        AlertService {
            name: "slack".into(),
            ..Default::default()
        }
        .validate(&mut diags);
        assert_eq!(diags.iter().next().unwrap().attribute.as_deref(), Some("service.uri"));

        let mut diags = Diagnostics::new();
        AlertService {
            name: "pager_duty".into(),
            routing_key: Some("rk".into()),
            ..Default::default()
        }
        .validate(&mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_field_paths_in_lists() {
        let mut diags = Diagnostics::new();
        validate_field_paths(
            "fields",
            &[".ok".to_string(), "missing_dot".to_string(), ".".to_string()],
            &mut diags,
        );
        assert_eq!(diags.len(), 2);
    }
}
