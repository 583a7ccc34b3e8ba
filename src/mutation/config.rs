use std::env;
use std::fmt::{Display, Formatter};

use crate::error_catalog::DEFAULT_LOCALE;
use crate::mutation::error::{invalid_argument, MutationResult};

/// Default production host of the catalog API.
pub const DEFAULT_API_HOST: &str = "api.datacatalog.io";

/// Environment variable overriding the API endpoint, e.g. `http://localhost:8080`.
pub const API_HOST_ENV: &str = "DATACATALOG_API_HOST";

/// Path of the GraphQL endpoint below the API base URL.
pub const GRAPHQL_PATH: &str = "graphql";

/// Host/port/SSL tuple of the GraphQL endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointOptions {
    pub host: String,
    pub port: Option<u16>,
    pub ssl_enabled: bool,
}

impl EndpointOptions {
    pub fn new(host: impl Into<String>, port: Option<u16>, ssl_enabled: bool) -> Self {
        Self {
            host: host.into(),
            port,
            ssl_enabled,
        }
    }

    /// Reads [`API_HOST_ENV`], falling back to the production endpoint when unset.
    pub fn from_env() -> MutationResult<Self> {
        match env::var(API_HOST_ENV) {
            Ok(value) if !value.trim().is_empty() => parse_endpoint_options(value.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.ssl_enabled { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{scheme}://{}:{port}", self.host),
            None => format!("{scheme}://{}", self.host),
        }
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/{GRAPHQL_PATH}", self.base_url())
    }
}

impl Default for EndpointOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            port: None,
            ssl_enabled: true,
        }
    }
}

impl Display for EndpointOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Parses `scheme://host[:port]`; a missing scheme means `https`.
pub fn parse_endpoint_options(spec: &str) -> MutationResult<EndpointOptions> {
    let (protocol, rest) = spec.split_once("://").unwrap_or(("https", spec));
    let ssl_enabled = match protocol {
        "http" => false,
        "https" => true,
        other => {
            return Err(invalid_argument(format!(
                "Unsupported protocol '{other}' in endpoint"
            )))
        }
    };

    let rest = rest.trim_end_matches('/');
    let (host, port) = if let Some((host, port)) = rest.split_once(':') {
        let port = port
            .parse::<u16>()
            .map_err(|_| invalid_argument("Port must be a number in endpoint declaration"))?;
        (host.to_string(), Some(port))
    } else {
        (rest.to_string(), None)
    };

    if host.trim().is_empty() {
        return Err(invalid_argument("Host is required in endpoint declaration"));
    }

    Ok(EndpointOptions::new(host, port, ssl_enabled))
}

/// Per-runner behavior switches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Locale whose error catalog resolves domain errors.
    pub locale: String,
    /// Refresh dependent reads after a domain error as well as after success.
    ///
    /// The server may have applied part of a write before rejecting it, so the
    /// default keeps read results in step with it.
    pub refetch_on_domain_error: bool,
}

impl RunnerSettings {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_refetch_on_domain_error(mut self, enabled: bool) -> Self {
        self.refetch_on_domain_error = enabled;
        self
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            refetch_on_domain_error: true,
        }
    }
}
