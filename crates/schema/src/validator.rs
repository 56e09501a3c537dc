//! Record validation against a [`Schema`].
//!
//! Violation messages follow the `instance.<field> ...` wording clients of the
//! catalog API already match on, e.g. `instance requires property "isbn"`.

use serde_json::Value;
use url::Url;

use crate::types::{FieldDef, Format, Schema};

/// Outcome of validating one record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<String>,
}

impl ValidationReport {
    pub fn from_violations(violations: Vec<String>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}

/// Checks a candidate record against a schema.
pub trait Validator: Send + Sync {
    fn validate(&self, record: &Value, schema: &Schema) -> ValidationReport;
}

/// Validator for flat object schemas.
///
/// Additional properties are allowed; null counts as a type mismatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, record: &Value, schema: &Schema) -> ValidationReport {
        let Some(object) = record.as_object() else {
            return ValidationReport::from_violations(vec![
                "instance is not of a type(s) object".to_string(),
            ]);
        };

        let mut violations = Vec::new();

        for (name, def) in &schema.fields {
            match object.get(*name) {
                Some(value) => check_field(name, def, value, &mut violations),
                None if def.required => {
                    violations.push(format!("instance requires property \"{}\"", name));
                }
                None => {}
            }
        }

        ValidationReport::from_violations(violations)
    }
}

fn check_field(name: &str, def: &FieldDef, value: &Value, violations: &mut Vec<String>) {
    if !def.field_type.matches(value) {
        violations.push(format!(
            "instance.{} is not of a type(s) {}",
            name,
            def.field_type.as_str()
        ));
        return;
    }

    if let (Some(format), Some(text)) = (def.format, value.as_str()) {
        if !conforms(format, text) {
            violations.push(format!(
                "instance.{} does not conform to the \"{}\" format",
                name,
                format.as_str()
            ));
        }
    }

    if let (Some(min_length), Some(text)) = (def.min_length, value.as_str()) {
        if text.chars().count() < min_length {
            violations.push(format!(
                "instance.{} does not meet minimum length of {}",
                name, min_length
            ));
        }
    }

    if let (Some(minimum), Some(number)) = (def.minimum, value.as_f64()) {
        if number < minimum as f64 {
            violations.push(format!(
                "instance.{} must be greater than or equal to {}",
                name, minimum
            ));
        }
    }
}

fn conforms(format: Format, text: &str) -> bool {
    match format {
        Format::Uri => Url::parse(text)
            .map(|url| !url.cannot_be_a_base())
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDef;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .field("id", FieldDef::string().required().min_length(1))
            .field("link", FieldDef::string().format(Format::Uri).required())
            .field("count", FieldDef::integer().minimum(1).required())
            .field("note", FieldDef::string())
    }

    #[test]
    fn valid_record_passes() {
        let report = SchemaValidator.validate(
            &json!({"id": "a", "link": "http://www.amazon.com", "count": 3, "extra": true}),
            &schema(),
        );
        assert_eq!(report, ValidationReport::from_violations(vec![]));
        assert!(report.valid);
    }

    #[test]
    fn missing_required_fields_are_reported_in_declaration_order() {
        let report = SchemaValidator.validate(&json!({"note": "x"}), &schema());
        assert!(!report.valid);
        assert_eq!(
            report.violations,
            vec![
                "instance requires property \"id\"",
                "instance requires property \"link\"",
                "instance requires property \"count\"",
            ]
        );
    }

    #[test]
    fn malformed_url_is_rejected() {
        let report = SchemaValidator.validate(
            &json!({"id": "a", "link": "22", "count": 3}),
            &schema(),
        );
        assert_eq!(
            report.violations,
            vec!["instance.link does not conform to the \"uri\" format"]
        );

        let report = SchemaValidator.validate(
            &json!({"id": "a", "link": "mailto:someone@example.com", "count": 3}),
            &schema(),
        );
        assert!(!report.valid);
    }

    #[test]
    fn type_and_range_violations() {
        let report = SchemaValidator.validate(
            &json!({"id": "", "link": "https://example.com/b", "count": 0, "note": null}),
            &schema(),
        );
        assert_eq!(
            report.violations,
            vec![
                "instance.id does not meet minimum length of 1",
                "instance.count must be greater than or equal to 1",
                "instance.note is not of a type(s) string",
            ]
        );

        let report = SchemaValidator.validate(
            &json!({"id": "a", "link": "https://example.com", "count": "3"}),
            &schema(),
        );
        assert_eq!(report.violations, vec!["instance.count is not of a type(s) integer"]);
    }

    #[test]
    fn whole_number_floats_count_as_integers() {
        let record: Value =
            serde_json::from_str(r#"{"id": "a", "link": "http://x.org", "count": 1e2}"#).unwrap();
        assert!(SchemaValidator.validate(&record, &schema()).valid);

        let report = SchemaValidator.validate(
            &json!({"id": "a", "link": "http://x.org", "count": 100.0}),
            &schema(),
        );
        assert!(report.valid);

        let report = SchemaValidator.validate(
            &json!({"id": "a", "link": "http://x.org", "count": 2.5}),
            &schema(),
        );
        assert_eq!(report.violations, vec!["instance.count is not of a type(s) integer"]);
    }

    #[test]
    fn non_object_record_is_rejected() {
        let report = SchemaValidator.validate(&json!(["id"]), &schema());
        assert_eq!(report.violations, vec!["instance is not of a type(s) object"]);
    }
}
