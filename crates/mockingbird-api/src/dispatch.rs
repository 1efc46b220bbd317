//! Request dispatch over a statically built endpoint table.
//!
//! Every endpoint is registered once at construction with its host class,
//! exact path and the parameter names it recognizes. There is no route
//! discovery, no path templates and no partial matches. An unknown path
//! or an undeclared parameter name is a harness defect
//! ([`ServiceError::UnroutableRequest`] / [`ServiceError::UnknownParameter`]),
//! not a simulated wire error.
//!
//! Parameters come from exactly one source per call: the explicit body
//! map when given, otherwise the URI's query string. The two are never
//! merged. The HTTP method is not consulted; the simulated surface has no
//! method-overloaded paths.

use std::fmt;

use mockingbird_core::entity::UserId;
use mockingbird_core::error::ServiceError;
use mockingbird_core::service::Service;
use mockingbird_core::stream::{StreamChannel, SubscriptionId};
use serde_json::Value;
use url::{Position, Url};

use crate::endpoints;
use crate::params::ParamMap;

/// Host class a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostClass {
    /// The primary REST API host.
    Api,
    /// The public streaming host.
    Stream,
    /// The user-streaming host.
    UserStream,
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => write!(f, "api"),
            Self::Stream => write!(f, "stream"),
            Self::UserStream => write!(f, "userstream"),
        }
    }
}

/// Base URLs the dispatcher recognizes, one per host class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Primary API base URL (trailing slash included).
    pub api_url: String,
    /// Streaming API base URL.
    pub stream_url: String,
    /// User-streaming API base URL.
    pub userstream_url: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.twitter.com/1.1/".to_owned(),
            stream_url: "https://stream.twitter.com/1.1/".to_owned(),
            userstream_url: "https://userstream.twitter.com/1.1/".to_owned(),
        }
    }
}

impl DispatcherConfig {
    fn base(&self, host: HostClass) -> &str {
        match host {
            HostClass::Api => &self.api_url,
            HostClass::Stream => &self.stream_url,
            HostClass::UserStream => &self.userstream_url,
        }
    }
}

/// Handler function invoked for a matched endpoint.
pub type Handler = fn(&mut Service, UserId, &ParamMap) -> Result<Response, ServiceError>;

/// One registered endpoint: host class, exact path, declared parameter
/// names and the handler.
pub struct Endpoint {
    /// Host class the path lives under.
    pub host: HostClass,
    /// Path relative to the host's base URL.
    pub path: &'static str,
    /// Parameter names this endpoint recognizes.
    pub params: &'static [&'static str],
    /// Handler composing store, timeline filter, renderer and registry.
    pub handler: Handler,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("path", &self.path)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Result of a dispatched request.
#[derive(Debug)]
pub enum Response {
    /// Parsed JSON body of a read or write request.
    Json(Value),
    /// Handle to a newly opened streaming subscription.
    Stream(StreamHandle),
}

impl Response {
    /// The JSON body, or `None` for a streaming response.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Stream(_) => None,
        }
    }

    /// The stream handle, or `None` for a JSON response.
    pub fn stream(&self) -> Option<&StreamHandle> {
        match self {
            Self::Json(_) => None,
            Self::Stream(handle) => Some(handle),
        }
    }
}

/// Caller's view of an open streaming subscription.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    /// Registry identifier of the subscription.
    pub id: SubscriptionId,
    /// Shared output channel; records land here as they are broadcast.
    pub channel: StreamChannel,
}

impl StreamHandle {
    /// Signal disconnect; the registry reaps the subscription on its next
    /// broadcast pass.
    pub fn disconnect(&self) {
        self.channel.disconnect();
    }
}

/// Routes (host class, path) pairs to registered handlers.
#[derive(Debug)]
pub struct Dispatcher {
    config: DispatcherConfig,
    endpoints: Vec<Endpoint>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DispatcherConfig::default())
    }
}

impl Dispatcher {
    /// Build the endpoint table once for the given base URLs.
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config, endpoints: endpoints::table() }
    }

    /// The registered endpoints.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Split a bare URI (query already stripped) into host class and
    /// relative path.
    fn split_uri<'a>(&self, bare: &'a str) -> Result<(HostClass, &'a str), ServiceError> {
        for host in [HostClass::Api, HostClass::Stream, HostClass::UserStream] {
            let base = self.config.base(host);
            if let Some(path) = bare.strip_prefix(base) {
                return Ok((host, path));
            }
        }
        Err(ServiceError::UnroutableRequest {
            host: "unknown".to_owned(),
            path: bare.to_owned(),
        })
    }

    /// Route a request to its handler and return the handler's result.
    ///
    /// `body` is the explicit body parameter map of a write-style request;
    /// when absent, parameters are decoded from the URI's query string.
    pub fn dispatch(
        &self,
        service: &mut Service,
        identity: UserId,
        method: &str,
        uri: &str,
        body: Option<&ParamMap>,
    ) -> Result<Response, ServiceError> {
        let url = Url::parse(uri).map_err(|_| ServiceError::UnroutableRequest {
            host: "unparseable".to_owned(),
            path: uri.to_owned(),
        })?;
        let bare = &url[..Position::AfterPath];
        let (host, path) = self.split_uri(bare)?;

        let endpoint = self
            .endpoints
            .iter()
            .find(|endpoint| endpoint.host == host && endpoint.path == path)
            .ok_or_else(|| ServiceError::UnroutableRequest {
                host: host.to_string(),
                path: path.to_owned(),
            })?;

        let params: ParamMap = match body {
            Some(map) => map.clone(),
            None => url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect(),
        };
        for name in params.keys() {
            if !endpoint.params.contains(&name.as_str()) {
                return Err(ServiceError::UnknownParameter {
                    endpoint: endpoint.path.to_owned(),
                    name: name.clone(),
                });
            }
        }

        tracing::debug!(%host, path, method, %identity, "dispatching request");
        (endpoint.handler)(service, identity, &params)
    }
}
