//! Error taxonomy for the simulation.
//!
//! The taxonomy is closed and each variant means one thing. In particular,
//! "this feature is intentionally not modeled" (`UnsupportedFeature`) is
//! distinct from "the simulated service reports an error" (`NotFound`,
//! `OwnershipViolation`) and from "the test harness is wired wrong"
//! (`UnroutableRequest` and the parameter-schema variants). Only the
//! simulated service errors have a wire representation; the rest must
//! surface as plain failures so a coverage gap is never mistaken for
//! simulated behavior.

use thiserror::Error;

use crate::entity::EntityKind;

/// Errors raised by the simulation engine and its request surface.
///
/// All variants are raised synchronously and propagate to the caller
/// without retries; a pure in-memory simulation has no transient failure
/// mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A referenced entity identifier does not exist.
    ///
    /// The only variant that maps to the documented 404 / code-34 wire
    /// error.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind looked up.
        kind: EntityKind,
        /// Identifier in canonical string form.
        id: String,
    },

    /// A real-API parameter or parameter combination is recognized but
    /// intentionally not implemented.
    ///
    /// Fails fast instead of silently ignoring the parameter, so tests
    /// cannot mistake "not modeled" for "modeled as a no-op".
    #[error("unsupported feature: {feature}")]
    UnsupportedFeature {
        /// What was asked for.
        feature: String,
    },

    /// No endpoint is registered for the requested (host, path) pair.
    ///
    /// A harness or configuration defect, not a simulated wire error.
    #[error("no endpoint registered for {host} {path}")]
    UnroutableRequest {
        /// Host class tag of the request.
        host: String,
        /// Path that failed to match.
        path: String,
    },

    /// An entity mutation was attempted by a non-owning identity.
    #[error("{kind} {id} belongs to user {owner}, not caller {caller}")]
    OwnershipViolation {
        /// Entity kind being mutated.
        kind: EntityKind,
        /// Identifier of the entity.
        id: String,
        /// Owning user.
        owner: String,
        /// Caller that attempted the mutation.
        caller: String,
    },

    /// A required parameter was not supplied.
    #[error("missing required parameter: {name}")]
    MissingParameter {
        /// Parameter name.
        name: String,
    },

    /// A supplied parameter name is not declared by the endpoint.
    ///
    /// A harness defect, like [`ServiceError::UnroutableRequest`].
    #[error("parameter {name} is not declared by endpoint {endpoint}")]
    UnknownParameter {
        /// Endpoint path.
        endpoint: String,
        /// Offending parameter name.
        name: String,
    },

    /// A supplied parameter value could not be parsed.
    #[error("invalid value for parameter {name}: {value:?}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// The raw value.
        value: String,
    },
}

impl ServiceError {
    /// Shorthand for a [`ServiceError::NotFound`].
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }

    /// Shorthand for a [`ServiceError::UnsupportedFeature`].
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature { feature: feature.into() }
    }
}
