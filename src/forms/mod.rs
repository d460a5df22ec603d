//! Form engine module
//!
//! Schema encoding, per-field validation, multi-step navigation and
//! definition editing for event registration forms.

pub mod builder;
pub mod schema;
pub mod steps;
pub mod validator;

pub use schema::{decode_responses, decode_value, encode_value, parse_options, sanitize_phone_input, serialize_options};
pub use steps::{total_steps, FormStepController, FIELDS_PER_STEP};
pub use validator::{validate_field, validate_fields, FieldError, FieldKey, ValidationErrors};
