//! Server and client wrappers for tests.
//!
//! `FakeServer` holds the simulation and its dispatcher behind a single
//! mutex: one mutual-exclusion discipline per store instance is all the
//! locking a short, non-blocking request path needs. `FakeClient` binds a
//! caller identity to a shared server so client code under test can issue
//! requests through the same (method, uri, body) contract it would use
//! against the real transport.

use std::sync::{Arc, Mutex};

use mockingbird_core::entity::UserId;
use mockingbird_core::error::ServiceError;
use mockingbird_core::service::Service;

use crate::dispatch::{Dispatcher, DispatcherConfig, Response};
use crate::params::ParamMap;

/// The simulation plus its request surface, shareable across callers.
#[derive(Debug)]
pub struct FakeServer {
    service: Mutex<Service>,
    dispatcher: Dispatcher,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServer {
    /// Create a server with the default base URLs.
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a server recognizing the given base URLs.
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self { service: Mutex::new(Service::new()), dispatcher: Dispatcher::new(config) }
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> std::sync::MutexGuard<'_, Service> {
        // Panicking on a poisoned mutex is acceptable in test-double code.
        self.service.lock().expect("service mutex poisoned")
    }

    /// Run test setup or assertions against the simulation directly.
    pub fn with_service<R>(&self, f: impl FnOnce(&mut Service) -> R) -> R {
        f(&mut self.lock())
    }

    /// Dispatch one request on behalf of `identity`.
    pub fn request(
        &self,
        identity: UserId,
        method: &str,
        uri: &str,
        body: Option<&ParamMap>,
    ) -> Result<Response, ServiceError> {
        self.dispatcher.dispatch(&mut self.lock(), identity, method, uri, body)
    }

    /// A client bound to the given caller identity.
    pub fn client(self: &Arc<Self>, identity: UserId) -> FakeClient {
        FakeClient { server: Arc::clone(self), identity }
    }
}

/// An identity-bound handle mirroring the transport contract.
#[derive(Debug, Clone)]
pub struct FakeClient {
    server: Arc<FakeServer>,
    identity: UserId,
}

impl FakeClient {
    /// The caller identity this client is bound to.
    pub fn identity(&self) -> UserId {
        self.identity
    }

    /// Issue a request as this client's identity.
    pub fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<&ParamMap>,
    ) -> Result<Response, ServiceError> {
        self.server.request(self.identity, method, uri, body)
    }
}
