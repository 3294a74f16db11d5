pub mod config;
pub mod errors;
pub mod form;
pub mod model;
pub mod on_error;
pub mod responses;
pub mod schema;

pub mod doctor;
pub mod validate;

pub mod report;
pub mod storage;

pub use form::{FormBuilder, SubmitOutcome};
pub use model::{FieldDefinition, FieldId, FieldKind, FieldPatch, FieldType, FormData, InputType};
pub use responses::ResponseStore;
pub use schema::SchemaStore;
pub use storage::Persistence;
pub use validate::{validate, validate_field, ValidationError, ValidationErrorMap};
