use serde_json::{Value, json};

use super::Schema;

/// Builds an object JSON Schema incrementally.
///
/// Properties and the `required` list keep insertion order so the rendered schema
/// (and therefore the prompt it ends up in) is the same on every run.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    title: Option<String>,
    description: Option<String>,
    properties: Vec<(String, Value)>,
    required: Vec<String>,
    examples: Vec<Value>,
}

impl SchemaBuilder {
    pub fn object() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a property; a later property with the same name replaces the earlier one.
    pub fn property(mut self, name: impl Into<String>, property_schema: Value, required: bool) -> Self {
        let name = name.into();
        self.properties.retain(|(existing, _)| *existing != name);
        self.required.retain(|existing| *existing != name);
        if required {
            self.required.push(name.clone());
        }
        self.properties.push((name, property_schema));
        self
    }

    /// Required string property.
    pub fn string_property(self, name: impl Into<String>, description: &str) -> Self {
        self.property(
            name,
            json!({ "type": "string", "description": description }),
            true,
        )
    }

    /// Required string property restricted to `values`.
    pub fn enum_property(self, name: impl Into<String>, description: &str, values: &[&str]) -> Self {
        self.property(
            name,
            json!({ "type": "string", "description": description, "enum": values }),
            true,
        )
    }

    pub fn example(mut self, example: Value) -> Self {
        self.examples.push(example);
        self
    }

    pub fn build(self) -> Schema {
        let mut schema = json!({ "type": "object" });

        if let Some(title) = self.title {
            schema["title"] = json!(title);
        }

        if let Some(description) = self.description {
            schema["description"] = json!(description);
        }

        let properties: serde_json::Map<String, Value> = self.properties.into_iter().collect();
        schema["properties"] = Value::Object(properties);
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }

        match self.examples.len() {
            0 => {}
            1 => schema["example"] = self.examples[0].clone(),
            _ => schema["examples"] = json!(self.examples),
        }

        Schema::new(schema)
    }
}
