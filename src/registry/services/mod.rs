//! Application services for registry resolution and registration.

mod registration;
mod resolver;

pub use registration::{
    PublishVersionRequest, RegisterAgentRequest, RegistrationError, RegistrationResult,
    RegistrationService,
};
pub use resolver::{RegistryResolver, Resolution, ResolveError};
