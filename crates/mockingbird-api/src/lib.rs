//! Request surface for the mockingbird publishing-service simulation.
//!
//! Routes an inbound (host class, path) pair plus parameters to a handler
//! that composes the `mockingbird-core` engine: store lookups, timeline
//! filtering and wire rendering on the read path; entity creation with
//! synchronous stream broadcast on the write path; subscription setup on
//! the streaming paths.
//!
//! The endpoint table is built statically at dispatcher construction.
//! Each endpoint declares the parameter names it recognizes; anything
//! else is rejected as a harness defect rather than simulated behavior.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod dispatch;
mod endpoints;
pub mod error;
pub mod params;

pub use client::{FakeClient, FakeServer};
pub use dispatch::{Dispatcher, DispatcherConfig, Endpoint, HostClass, Response, StreamHandle};
pub use error::{WireError, wire_error};
pub use params::ParamMap;
