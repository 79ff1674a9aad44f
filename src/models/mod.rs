pub mod audit_event;
pub mod endpoint;
pub mod module;
pub mod schema;
pub mod service;

pub use audit_event::AuditEvent;
pub use endpoint::Endpoint;
pub use module::Module;
pub use schema::{Field, FieldPatch, NewField, Schema};
pub use service::Service;
