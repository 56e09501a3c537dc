//! Declarative record schema types.

use serde_json::{json, Map, Value};

/// JSON type a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
}

impl FieldType {
    /// Name used in violation messages and JSON Schema output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
        }
    }

    /// Returns true if `value` is of this type. A number with no fractional
    /// part is an integer, so `100.0` and `1e2` both match.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.as_f64().is_some_and(|n| n.fract() == 0.0),
        }
    }
}

/// String formats understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Absolute URL with a scheme and a hierarchical part (`http://host/...`).
    Uri,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Uri => "uri",
        }
    }
}

/// Constraints on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub field_type: FieldType,
    pub required: bool,
    pub format: Option<Format>,
    pub minimum: Option<i64>,
    pub min_length: Option<usize>,
    pub description: Option<&'static str>,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            format: None,
            minimum: None,
            min_length: None,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    pub fn integer() -> Self {
        Self::new(FieldType::Integer)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Schema for a flat object record. Fields keep declaration order so that
/// violations are reported deterministically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub fields: Vec<(&'static str, FieldDef)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, def: FieldDef) -> Self {
        self.fields.push((name, def));
        self
    }

    /// Names of the required fields, in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|(_, def)| def.required)
            .map(|(name, _)| *name)
    }

    /// Rewrite whole-number floats in integer fields as JSON integers, so a
    /// record that passed validation also deserializes into integer types.
    pub fn normalize_integers(&self, record: &mut Value) {
        let Some(object) = record.as_object_mut() else {
            return;
        };

        for (name, def) in &self.fields {
            if def.field_type != FieldType::Integer {
                continue;
            }
            let Some(value) = object.get_mut(*name) else {
                continue;
            };
            if !value.is_f64() {
                continue;
            }
            if let Some(n) = value
                .as_f64()
                .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            {
                *value = Value::from(n as i64);
            }
        }
    }

    /// Render as a JSON Schema object, e.g. for OpenAPI components.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for (name, def) in &self.fields {
            let mut property = Map::new();
            property.insert("type".into(), json!(def.field_type.as_str()));
            if let Some(format) = def.format {
                property.insert("format".into(), json!(format.as_str()));
            }
            if let Some(minimum) = def.minimum {
                property.insert("minimum".into(), json!(minimum));
            }
            if let Some(min_length) = def.min_length {
                property.insert("minLength".into(), json!(min_length));
            }
            if let Some(description) = def.description {
                property.insert("description".into(), json!(description));
            }
            properties.insert((*name).to_string(), Value::Object(property));
        }

        let required: Vec<&str> = self.required_fields().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
