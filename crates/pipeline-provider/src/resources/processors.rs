//! Processor kinds. The service calls these transforms.

use super::common::{conditional_attributes, field_path, one_of, validate_field_paths, Conditional};
use super::{ComponentOptions, ProcessorModel};
use provider_framework::schema::{attributes, Attribute, Validator};
use provider_framework::Diagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type FilterProcessor = ProcessorModel<FilterOptions>;
pub type RouteProcessor = ProcessorModel<RouteOptions>;
pub type DedupeProcessor = ProcessorModel<DedupeOptions>;
pub type SampleProcessor = ProcessorModel<SampleOptions>;
pub type ParseProcessor = ProcessorModel<ParseOptions>;
pub type DropFieldsProcessor = ProcessorModel<DropFieldsOptions>;
pub type StringifyProcessor = ProcessorModel<StringifyOptions>;
pub type CompactFieldsProcessor = ProcessorModel<CompactFieldsOptions>;
pub type UnrollProcessor = ProcessorModel<UnrollOptions>;
pub type FlattenFieldsProcessor = ProcessorModel<FlattenFieldsOptions>;

fn field_list() -> Attribute {
    Attribute::required_string_list()
        .with_validator(Validator::SizeAtLeast(1))
        .with_validator(Validator::UniqueValues)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub action: String,
    pub conditional: Conditional,
}

impl ComponentOptions for FilterOptions {
    const NAME: &'static str = "filter";
    const API_TYPE: &'static str = "filter";
    const DESCRIPTION: &'static str = "Keep or drop events matching a condition.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("action", Attribute::required_string().with_validator(one_of(&["allow", "drop"]))),
            ("conditional", Attribute::required_object(conditional_attributes())),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        self.conditional.validate("conditional", diags);
    }
}

/// One named output of a route processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub label: String,
    #[serde(flatten)]
    pub conditional: Conditional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    pub conditionals: Vec<Route>,
}

impl ComponentOptions for RouteOptions {
    const NAME: &'static str = "route";
    const API_TYPE: &'static str = "route";
    const DESCRIPTION: &'static str = "Send events to named outputs by condition.";

    fn attributes() -> BTreeMap<String, Attribute> {
        let mut route = conditional_attributes();
        route.insert(
            "label".to_string(),
            Attribute::required_string().with_validator(Validator::LengthBetween { min: 1, max: 64 }),
        );
        attributes([(
            "conditionals",
            Attribute::required_object_list(route).with_validator(Validator::SizeAtLeast(1)),
        )])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        let mut labels = std::collections::HashSet::new();
        for (i, route) in self.conditionals.iter().enumerate() {
            let path = format!("conditionals[{i}]");
            if !labels.insert(route.label.as_str()) {
                diags.attribute_error(
                    format!("{path}.label"),
                    "Duplicate route label",
                    format!("The label \"{}\" is used by more than one route.", route.label),
                );
            }
            route.conditional.validate(&path, diags);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupeOptions {
    pub fields: Vec<String>,
    #[serde(default)]
    pub number_of_events: Option<i64>,
    #[serde(default)]
    pub comparison_type: Option<String>,
}

impl ComponentOptions for DedupeOptions {
    const NAME: &'static str = "dedupe";
    const API_TYPE: &'static str = "dedupe";
    const DESCRIPTION: &'static str = "Drop events already seen within a window.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("fields", field_list()),
            (
                "number_of_events",
                Attribute::optional_int64()
                    .with_default(5000)
                    .with_validator(Validator::Int64Between { min: 100, max: 10000 }),
            ),
            (
                "comparison_type",
                Attribute::optional_string()
                    .with_default("Match")
                    .with_validator(one_of(&["Match", "Ignore"])),
            ),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        validate_field_paths("fields", &self.fields, diags);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleOptions {
    pub rate: i64,
    #[serde(default)]
    pub always_include: Option<Conditional>,
}

impl ComponentOptions for SampleOptions {
    const NAME: &'static str = "sample";
    const API_TYPE: &'static str = "sample";
    const DESCRIPTION: &'static str = "Keep one in every `rate` events.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            (
                "rate",
                Attribute::required_int64().with_validator(Validator::Int64Between { min: 2, max: 10000 }),
            ),
            ("always_include", Attribute::optional_object(conditional_attributes())),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        if let Some(conditional) = &self.always_include {
            conditional.validate("always_include", diags);
        }
    }
}

pub const PARSERS: [&str; 10] = [
    "apache_log",
    "cef_log",
    "common_log",
    "csv_row",
    "grok_parser",
    "json_parser",
    "key_value_log",
    "nginx_log",
    "regex_parser",
    "timestamp_parser",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub field: String,
    pub parser: String,
    #[serde(default)]
    pub target_field: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ComponentOptions for ParseOptions {
    const NAME: &'static str = "parse";
    const API_TYPE: &'static str = "parse";
    const DESCRIPTION: &'static str = "Parse a field with one of the built-in parsers.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("field", Attribute::required_string().with_validator(field_path())),
            ("parser", Attribute::required_string().with_validator(one_of(&PARSERS))),
            ("target_field", Attribute::optional_string().with_validator(field_path())),
            ("pattern", Attribute::optional_string()),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        let needs_pattern = matches!(self.parser.as_str(), "grok_parser" | "regex_parser");
        match (&self.pattern, needs_pattern) {
            (None, true) => diags.attribute_error(
                "pattern",
                "Missing required argument",
                format!("The \"{}\" parser requires \"pattern\".", self.parser),
            ),
            (Some(_), false) => diags.attribute_error(
                "pattern",
                "Invalid Attribute Combination",
                format!("\"pattern\" is only used by grok_parser and regex_parser, not \"{}\".", self.parser),
            ),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DropFieldsOptions {
    pub fields: Vec<String>,
}

impl ComponentOptions for DropFieldsOptions {
    const NAME: &'static str = "drop_fields";
    const API_TYPE: &'static str = "drop-fields";
    const DESCRIPTION: &'static str = "Remove fields from events.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([("fields", field_list())])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        validate_field_paths("fields", &self.fields, diags);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringifyOptions {}

impl ComponentOptions for StringifyOptions {
    const NAME: &'static str = "stringify";
    const API_TYPE: &'static str = "stringify";
    const DESCRIPTION: &'static str = "Serialize each event into a JSON string.";

    fn attributes() -> BTreeMap<String, Attribute> {
        BTreeMap::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompactFieldsOptions {
    pub fields: Vec<String>,
    #[serde(default)]
    pub compact_array: Option<bool>,
    #[serde(default)]
    pub compact_object: Option<bool>,
}

impl ComponentOptions for CompactFieldsOptions {
    const NAME: &'static str = "compact_fields";
    const API_TYPE: &'static str = "compact-fields";
    const DESCRIPTION: &'static str = "Remove empty arrays and objects from fields.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("fields", field_list()),
            ("compact_array", Attribute::optional_bool().with_default(true)),
            ("compact_object", Attribute::optional_bool().with_default(true)),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        validate_field_paths("fields", &self.fields, diags);
        if self.compact_array == Some(false) && self.compact_object == Some(false) {
            diags.error(
                "Invalid Attribute Combination",
                "At least one of compact_array or compact_object must be true.",
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnrollOptions {
    pub field: String,
    #[serde(default)]
    pub values_only: Option<bool>,
}

impl ComponentOptions for UnrollOptions {
    const NAME: &'static str = "unroll";
    const API_TYPE: &'static str = "unroll";
    const DESCRIPTION: &'static str = "Emit one event per element of an array field.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("field", Attribute::required_string().with_validator(field_path())),
            ("values_only", Attribute::optional_bool().with_default(true)),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlattenFieldsOptions {
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub delimiter: Option<String>,
}

impl ComponentOptions for FlattenFieldsOptions {
    const NAME: &'static str = "flatten_fields";
    const API_TYPE: &'static str = "flatten-fields";
    const DESCRIPTION: &'static str = "Flatten nested objects into top-level fields.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            (
                "fields",
                Attribute::optional_string_list().with_validator(Validator::UniqueValues),
            ),
            (
                "delimiter",
                Attribute::optional_string()
                    .with_default("_")
                    .with_validator(Validator::LengthBetween { min: 1, max: 1 }),
            ),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        if let Some(fields) = &self.fields {
            validate_field_paths("fields", fields, diags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transform;
    use provider_framework::ResourceModel;
    use serde_json::json;

    #[test]
    fn test_filter_processor_maps_to_transform() {
        let plan: FilterProcessor = serde_json::from_value(json!({
            "pipeline_id": "p1",
            "inputs": ["s1"],
            "action": "drop",
            "conditional": {
                "expressions": [{"field": ".level", "operator": "equal", "value_string": "debug"}],
                "logical_operation": "AND"
            }
        }))
        .unwrap();
        let mut diags = Diagnostics::new();
        let api = plan.to_api(None, &mut diags).unwrap();
        assert_eq!(api.kind, "filter");
        assert_eq!(api.inputs, vec!["s1"]);
        assert_eq!(
            api.user_config["conditional"]["expressions"][0],
            json!({"field": ".level", "operator": "equal", "value_string": "debug"})
        );

        let mut state = plan.clone();
        state.apply_api(&Transform {
            id: "t1".into(),
            generation_id: Some(2),
            ..api
        });
        assert_eq!(state.id.as_deref(), Some("t1"));
        assert_eq!(state.options, plan.options);
        assert_eq!(state.generation_id, Some(2));
    }

    #[test]
    fn test_route_labels_must_be_unique() {
        let expression = json!({"field": ".a", "operator": "exists"});
        let plan: RouteProcessor = serde_json::from_value(json!({
            "pipeline_id": "p1",
            "conditionals": [
                {"label": "errors", "expressions": [expression]},
                {"label": "errors", "expressions": [expression]}
            ]
        }))
        .unwrap();
        let mut diags = Diagnostics::new();
        plan.validate(&mut diags);
        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("conditionals[1].label")
        );
    }

    #[test]
    fn test_parse_pattern_rules() {
        let mut diags = Diagnostics::new();
        ParseOptions {
            field: ".message".into(),
            parser: "grok_parser".into(),
            ..Default::default()
        }
        .validate(&mut diags);
        assert_eq!(diags.iter().next().unwrap().summary, "Missing required argument");

        let mut diags = Diagnostics::new();
        ParseOptions {
            field: ".message".into(),
            parser: "json_parser".into(),
            target_field: Some(".parsed".into()),
            pattern: None,
        }
        .validate(&mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_drop_fields_schema_and_paths() {
        let mut diags = Diagnostics::new();
        DropFieldsProcessor::schema().validate(
            &json!({"pipeline_id": "p1", "fields": [".a", ".a"]}),
            &mut diags,
        );
        assert_eq!(diags.iter().next().unwrap().summary, "Duplicate List Value");

        let mut diags = Diagnostics::new();
        DropFieldsOptions {
            fields: vec!["a".into()],
        }
        .validate(&mut diags);
        assert!(diags.has_errors());
    }
}
