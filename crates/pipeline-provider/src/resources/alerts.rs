//! Alert kinds.

use super::common::one_of;
use super::{AlertModel, ComponentOptions};
use provider_framework::schema::{attributes, Attribute, Validator};
use provider_framework::Diagnostics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ThresholdAlert = AlertModel<ThresholdOptions>;
pub type ChangeAlert = AlertModel<ChangeOptions>;
pub type AbsenceAlert = AlertModel<AbsenceOptions>;

pub const THRESHOLD_OPERATORS: [&str; 6] = [">", ">=", "<", "<=", "==", "!="];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOptions {
    pub operator: String,
    pub threshold: f64,
}

impl ComponentOptions for ThresholdOptions {
    const NAME: &'static str = "threshold";
    const API_TYPE: &'static str = "threshold";
    const DESCRIPTION: &'static str = "Alert when the event count or a metric value crosses a threshold.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            ("operator", Attribute::required_string().with_validator(one_of(&THRESHOLD_OPERATORS))),
            ("threshold", Attribute::required_float64()),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeOptions {
    pub operator: String,
    pub percent_change: f64,
}

impl ComponentOptions for ChangeOptions {
    const NAME: &'static str = "change";
    const API_TYPE: &'static str = "change";
    const DESCRIPTION: &'static str = "Alert when a value changes by more than a percentage between windows.";

    fn attributes() -> BTreeMap<String, Attribute> {
        attributes([
            (
                "operator",
                Attribute::required_string().with_validator(one_of(&[">", ">=", "<", "<="])),
            ),
            (
                "percent_change",
                Attribute::required_float64().with_validator(Validator::Float64AtLeast(0.0)),
            ),
        ])
    }

    fn validate(&self, diags: &mut Diagnostics) {
        if self.percent_change == 0.0 {
            diags.attribute_error(
                "percent_change",
                "Invalid Attribute Value",
                "A change alert needs a non-zero percent_change.",
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsenceOptions {}

impl ComponentOptions for AbsenceOptions {
    const NAME: &'static str = "absence";
    const API_TYPE: &'static str = "absence";
    const DESCRIPTION: &'static str = "Alert when no events arrive within the window.";

    fn attributes() -> BTreeMap<String, Attribute> {
        BTreeMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Alert;
    use provider_framework::{ResourceKey, ResourceModel};
    use serde_json::json;

    fn plan() -> ThresholdAlert {
        serde_json::from_value(json!({
            "pipeline_id": "p1",
            "component_kind": "sink",
            "component_id": "k1",
            "event_type": "log",
            "name": "too many errors",
            "severity": "ERROR",
            "window_duration_minutes": 5,
            "service": {"name": "webhook", "uri": "https://hooks.example.com/x"},
            "operator": ">",
            "threshold": 100.0
        }))
        .unwrap()
    }

    #[test]
    fn test_alert_config_round_trip() {
        let plan = plan();
        let mut diags = Diagnostics::new();
        let api = plan.to_api(None, &mut diags).unwrap();
        assert_eq!(api.alert_config["type"], "threshold");
        assert_eq!(api.alert_config["operator"], ">");
        assert_eq!(api.alert_config["service"]["name"], "webhook");
        assert!(api.active);

        let key = ResourceKey::nested(plan.parents(), "a1");
        let mut state = ThresholdAlert::from_key(&key);
        state.apply_api(&Alert { id: "a1".into(), ..api });
        assert_eq!(state.name, plan.name);
        assert_eq!(state.options, plan.options);
        assert_eq!(state.service, plan.service);
        assert_eq!(state.pipeline_id, "p1");
    }

    #[test]
    fn test_import_id_needs_component_kind() {
        let key = ThresholdAlert::parse_import_id("p1/sink/k1/a1").unwrap();
        assert_eq!(key.parents, vec!["p1", "sink", "k1"]);
        assert!(ThresholdAlert::parse_import_id("p1/pipeline/k1/a1").is_err());
        assert!(ThresholdAlert::parse_import_id("p1/k1/a1").is_err());
    }

    #[test]
    fn test_zero_percent_change_is_rejected() {
        let mut diags = Diagnostics::new();
        ChangeOptions {
            operator: ">".into(),
            percent_change: 0.0,
        }
        .validate(&mut diags);
        assert!(diags.has_errors());
    }
}
