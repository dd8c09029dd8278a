use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::schema::SchemaType;

/// A structured LLM output: JSON Schema, serde round-tripping, and domain validation.
///
/// `validate` runs after the completion has been parsed. Returning
/// `AdvisorError::ValidationError` marks the answer as schema-invalid, which the
/// guard may retry with the error fed back into the prompt.
///
/// ```
/// use symptom_advisor::{AdvisorError, Instructor, Schema, SchemaBuilder, SchemaType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Debug)]
/// struct Advice {
///     text: String,
/// }
///
/// impl SchemaType for Advice {
///     fn schema() -> Schema {
///         SchemaBuilder::object().string_property("text", "Advice for the patient").build()
///     }
/// }
///
/// impl Instructor for Advice {
///     fn validate(&self) -> symptom_advisor::Result<()> {
///         if self.text.trim().is_empty() {
///             return Err(AdvisorError::ValidationError("text cannot be empty".into()));
///         }
///         Ok(())
///     }
/// }
///
/// let advice = Advice { text: " ".to_string() };
/// assert!(advice.validate().is_err());
/// ```
pub trait Instructor: SchemaType + DeserializeOwned + Serialize {
    /// Validation beyond what deserialization checks. Defaults to accepting everything.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
