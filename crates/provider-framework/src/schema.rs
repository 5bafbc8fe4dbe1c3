//! # Schema DSL
//!
//! Declarative description of a resource's attributes: which are required, optional or
//! server computed, their defaults, and the validators that run before any backend call.
//!
//! The same [`Schema`] value drives three things:
//!
//! 1. **Validation** of a configuration or plan ([`Schema::validate`], [`Schema::validate_planned`]).
//! 2. **Defaults** filled into a plan before it is converted to an API object
//!    ([`Schema::apply_defaults`]).
//! 3. **Replacement detection** for attributes that cannot change in place
//!    ([`Schema::replacement_paths`]).
//!
//! ```rust
//! use provider_framework::schema::{Attribute, Schema, Validator};
//! use provider_framework::Diagnostics;
//! use serde_json::json;
//!
//! let schema = Schema::new("A pipeline")
//!     .with_attribute("id", Attribute::computed_string())
//!     .with_attribute(
//!         "title",
//!         Attribute::required_string().with_validator(Validator::LengthBetween { min: 1, max: 512 }),
//!     );
//!
//! let mut diags = Diagnostics::new();
//! schema.validate(&json!({ "title": "" }), &mut diags);
//! assert!(diags.has_errors());
//! ```

use crate::diagnostics::Diagnostics;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, OnceLock, PoisonError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "element", rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    Float64,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(BTreeMap<String, Attribute>),
    ListOfObjects(BTreeMap<String, Attribute>),
}

impl AttributeType {
    fn describe(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int64 => "number (int64)",
            AttributeType::Float64 => "number",
            AttributeType::List(_) => "list",
            AttributeType::Map(_) => "map",
            AttributeType::Object(_) => "object",
            AttributeType::ListOfObjects(_) => "list of objects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Required,
    Optional,
    Computed,
    OptionalComputed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// String length in characters, or list size.
    LengthBetween { min: usize, max: usize },
    OneOf(Vec<String>),
    Int64Between { min: i64, max: i64 },
    Float64AtLeast(f64),
    UniqueValues,
    SizeAtLeast(usize),
    Matches { pattern: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub sensitive: bool,
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn new(attr_type: AttributeType, mode: Mode) -> Self {
        Self {
            attr_type,
            mode,
            default: None,
            sensitive: false,
            requires_replace: false,
            description: String::new(),
            validators: Vec::new(),
        }
    }

    pub fn required(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Mode::Required)
    }

    pub fn optional(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Mode::Optional)
    }

    pub fn computed(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Mode::Computed)
    }

    pub fn optional_computed(attr_type: AttributeType) -> Self {
        Self::new(attr_type, Mode::OptionalComputed)
    }

    pub fn required_string() -> Self {
        Self::required(AttributeType::String)
    }

    pub fn optional_string() -> Self {
        Self::optional(AttributeType::String)
    }

    pub fn computed_string() -> Self {
        Self::computed(AttributeType::String)
    }

    pub fn optional_bool() -> Self {
        Self::optional(AttributeType::Bool)
    }

    pub fn required_int64() -> Self {
        Self::required(AttributeType::Int64)
    }

    pub fn optional_int64() -> Self {
        Self::optional(AttributeType::Int64)
    }

    pub fn computed_int64() -> Self {
        Self::computed(AttributeType::Int64)
    }

    pub fn required_float64() -> Self {
        Self::required(AttributeType::Float64)
    }

    pub fn optional_float64() -> Self {
        Self::optional(AttributeType::Float64)
    }

    pub fn required_string_list() -> Self {
        Self::required(AttributeType::List(Box::new(AttributeType::String)))
    }

    pub fn optional_string_list() -> Self {
        Self::optional(AttributeType::List(Box::new(AttributeType::String)))
    }

    pub fn optional_string_map() -> Self {
        Self::optional(AttributeType::Map(Box::new(AttributeType::String)))
    }

    pub fn required_object(attributes: BTreeMap<String, Attribute>) -> Self {
        Self::required(AttributeType::Object(attributes))
    }

    pub fn optional_object(attributes: BTreeMap<String, Attribute>) -> Self {
        Self::optional(AttributeType::Object(attributes))
    }

    pub fn required_object_list(attributes: BTreeMap<String, Attribute>) -> Self {
        Self::required(AttributeType::ListOfObjects(attributes))
    }

    pub fn optional_object_list(attributes: BTreeMap<String, Attribute>) -> Self {
        Self::optional(AttributeType::ListOfObjects(attributes))
    }

    /// Value used when the configuration leaves the attribute unset.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn is_computed_only(&self) -> bool {
        self.mode == Mode::Computed
    }
}

/// Builds a nested attribute map: `attributes([("host", Attribute::required_string())])`.
pub fn attributes<const N: usize>(items: [(&str, Attribute); N]) -> BTreeMap<String, Attribute> {
    items
        .into_iter()
        .map(|(name, attr)| (name.to_string(), attr))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            version: 0,
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn with_attributes(mut self, attributes: BTreeMap<String, Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Validates a user configuration. Read-only (computed) attributes must not be set.
    pub fn validate(&self, config: &Value, diags: &mut Diagnostics) {
        validate_object(&self.attributes, config, "", true, diags);
    }

    /// Validates a plan, which may already carry computed values from prior state.
    pub fn validate_planned(&self, plan: &Value, diags: &mut Diagnostics) {
        validate_object(&self.attributes, plan, "", false, diags);
    }

    /// Fills unset attributes that declare a default, descending into nested objects.
    pub fn apply_defaults(&self, config: &mut Value) {
        apply_defaults(&self.attributes, config);
    }

    /// Top-level attributes flagged `requires_replace` whose value differs between states.
    pub fn replacement_paths(&self, prior: &Value, planned: &Value) -> Vec<String> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.requires_replace)
            .filter(|(name, _)| lookup(prior, name) != lookup(planned, name))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

fn lookup<'a>(value: &'a Value, name: &str) -> &'a Value {
    value.get(name).unwrap_or(&Value::Null)
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn validate_object(
    attributes: &BTreeMap<String, Attribute>,
    value: &Value,
    prefix: &str,
    strict: bool,
    diags: &mut Diagnostics,
) {
    let Some(object) = value.as_object() else {
        diags.attribute_error(
            if prefix.is_empty() { "." } else { prefix },
            "Invalid configuration",
            format!("Expected an object, got: {value}"),
        );
        return;
    };

    for key in object.keys() {
        if !attributes.contains_key(key) {
            diags.attribute_error(
                join(prefix, key),
                "Unsupported argument",
                format!("An argument named \"{key}\" is not expected here."),
            );
        }
    }

    for (name, attr) in attributes {
        let path = join(prefix, name);
        let value = object.get(name).unwrap_or(&Value::Null);
        if value.is_null() {
            if attr.mode == Mode::Required {
                diags.attribute_error(
                    path,
                    "Missing required argument",
                    format!("The argument \"{name}\" is required, but no definition was found."),
                );
            }
            continue;
        }
        if strict && attr.is_computed_only() {
            diags.attribute_error(
                path,
                "Invalid configuration for read-only attribute",
                format!("Cannot set value for this attribute as the provider has marked it as read-only. Remove the configuration line setting the value (\"{name}\")."),
            );
            continue;
        }
        validate_value(&attr.attr_type, value, &path, strict, diags);
        for validator in &attr.validators {
            run_validator(validator, value, &path, diags);
        }
    }
}

fn validate_value(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    strict: bool,
    diags: &mut Diagnostics,
) {
    let type_ok = match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Bool => value.is_boolean(),
        AttributeType::Int64 => value.as_i64().is_some(),
        AttributeType::Float64 => value.is_number(),
        AttributeType::List(_) | AttributeType::ListOfObjects(_) => value.is_array(),
        AttributeType::Map(_) | AttributeType::Object(_) => value.is_object(),
    };
    if !type_ok {
        diags.attribute_error(
            path,
            "Incorrect attribute value type",
            format!("Expected {}, got: {value}", attr_type.describe()),
        );
        return;
    }

    match attr_type {
        AttributeType::List(element) => {
            for (i, item) in value.as_array().into_iter().flatten().enumerate() {
                let item_path = format!("{path}[{i}]");
                if item.is_null() {
                    diags.attribute_error(
                        item_path,
                        "Null value in list",
                        "List elements must not be null.",
                    );
                } else {
                    validate_value(element, item, &item_path, strict, diags);
                }
            }
        }
        AttributeType::Map(element) => {
            for (key, item) in value.as_object().into_iter().flatten() {
                validate_value(element, item, &format!("{path}[\"{key}\"]"), strict, diags);
            }
        }
        AttributeType::Object(attributes) => {
            validate_object(attributes, value, path, strict, diags);
        }
        AttributeType::ListOfObjects(attributes) => {
            for (i, item) in value.as_array().into_iter().flatten().enumerate() {
                validate_object(attributes, item, &format!("{path}[{i}]"), strict, diags);
            }
        }
        AttributeType::String | AttributeType::Bool | AttributeType::Int64 | AttributeType::Float64 => {}
    }
}

fn run_validator(validator: &Validator, value: &Value, path: &str, diags: &mut Diagnostics) {
    match validator {
        Validator::LengthBetween { min, max } => {
            let length = match value {
                Value::String(s) => s.chars().count(),
                Value::Array(items) => items.len(),
                _ => return,
            };
            if length < *min || length > *max {
                diags.attribute_error(
                    path,
                    "Invalid Attribute Value Length",
                    format!("Attribute {path} length must be between {min} and {max}, got: {length}"),
                );
            }
        }
        Validator::OneOf(allowed) => {
            if let Some(s) = value.as_str() {
                if !allowed.iter().any(|a| a == s) {
                    let quoted: Vec<String> = allowed.iter().map(|a| format!("\"{a}\"")).collect();
                    diags.attribute_error(
                        path,
                        "Invalid Attribute Value Match",
                        format!(
                            "Attribute {path} value must be one of: [{}], got: \"{s}\"",
                            quoted.join(" ")
                        ),
                    );
                }
            }
        }
        Validator::Int64Between { min, max } => {
            if let Some(n) = value.as_i64() {
                if n < *min || n > *max {
                    diags.attribute_error(
                        path,
                        "Invalid Attribute Value",
                        format!("Attribute {path} value must be between {min} and {max}, got: {n}"),
                    );
                }
            }
        }
        Validator::Float64AtLeast(min) => {
            if let Some(n) = value.as_f64() {
                if n < *min {
                    diags.attribute_error(
                        path,
                        "Invalid Attribute Value",
                        format!("Attribute {path} value must be at least {min}, got: {n}"),
                    );
                }
            }
        }
        Validator::UniqueValues => {
            if let Some(items) = value.as_array() {
                let mut seen = HashSet::new();
                for item in items {
                    if !seen.insert(item.to_string()) {
                        diags.attribute_error(
                            path,
                            "Duplicate List Value",
                            format!("This attribute contains duplicate values of: {item}"),
                        );
                    }
                }
            }
        }
        Validator::SizeAtLeast(min) => {
            if let Some(items) = value.as_array() {
                if items.len() < *min {
                    diags.attribute_error(
                        path,
                        "Invalid Attribute Value",
                        format!("Attribute {path} list must contain at least {min} elements, got: {}", items.len()),
                    );
                }
            }
        }
        Validator::Matches { pattern, message } => {
            let Some(s) = value.as_str() else { return };
            match compiled(pattern) {
                Ok(re) if re.is_match(s) => {}
                Ok(_) => diags.attribute_error(
                    path,
                    "Invalid Attribute Value Match",
                    format!("Attribute {path} {message}, got: \"{s}\""),
                ),
                Err(e) => diags.attribute_error(
                    path,
                    "Invalid validator pattern",
                    format!("Pattern {pattern} does not compile: {e}"),
                ),
            }
        }
    }
}

/// Compiled `Validator::Matches` patterns, shared by every schema in the process.
static PATTERNS: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();

fn compiled(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERNS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    cache.insert(pattern.to_string(), re.clone());
    Ok(re)
}

fn apply_defaults(attributes: &BTreeMap<String, Attribute>, value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    for (name, attr) in attributes {
        let unset = object.get(name).map_or(true, Value::is_null);
        if unset {
            if let Some(default) = &attr.default {
                object.insert(name.clone(), default.clone());
            }
            continue;
        }
        match (&attr.attr_type, object.get_mut(name)) {
            (AttributeType::Object(nested), Some(child)) => apply_defaults(nested, child),
            (AttributeType::ListOfObjects(nested), Some(Value::Array(items))) => {
                for item in items {
                    apply_defaults(nested, item);
                }
            }
            _ => {}
        }
    }
}

/// Drops `null` entries from a JSON object, recursively. Used when building free-form
/// `user_config` maps so unset optional attributes are not sent to the backend.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
