//! Injector options and configuration profiles.
//!
//! A [`Profile`] is a named set of per-service overrides (lifetime and fixed
//! parameters), the way a "debug" and a "release" wiring of the same services
//! differ. Profiles are loaded from JSON, YAML (with the `yaml` feature) or
//! environment variables and applied to a
//! [`ServiceCollection`](crate::ServiceCollection) before it is built.

use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DiError, DiResult, Lifetime, Params};

/// Limits applied by an [`Injector`](crate::Injector).
///
/// ```
/// use lifestyle_di::InjectorOptions;
///
/// let options: InjectorOptions = serde_json::from_str(r#"{ "max_depth": 64 }"#).unwrap();
/// assert_eq!(options.max_depth, 64);
/// assert_eq!(InjectorOptions::default().max_depth, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InjectorOptions {
    /// Maximum number of services under construction at once on one context
    pub max_depth: usize,
}

impl InjectorOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for InjectorOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Overrides for one registered service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceOverride {
    /// Replacement lifetime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<Lifetime>,
    /// Parameters merged over the registration's own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

/// Named set of per-service overrides.
///
/// Services are addressed by symbol, by full type name or by the last path
/// segment of the type name (`FileLogger` for `app::logging::FileLogger`).
///
/// # Examples
///
/// ```
/// use lifestyle_di::{Lifetime, Profile};
///
/// let profile = Profile::from_json_str(r#"{
///     "name": "release",
///     "services": {
///         "FileLogger": { "params": { "path": "app.log" } },
///         "MemoryFetcher": { "lifetime": "singleton" }
///     }
/// }"#).unwrap();
///
/// assert_eq!(profile.name, "release");
/// assert_eq!(profile.services["MemoryFetcher"].lifetime, Some(Lifetime::Singleton));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub services: BTreeMap<String, ServiceOverride>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: BTreeMap::new(),
        }
    }

    /// Sets the lifetime override for `service`.
    pub fn with_lifetime(mut self, service: impl Into<String>, lifetime: Lifetime) -> Self {
        self.services.entry(service.into()).or_default().lifetime = Some(lifetime);
        self
    }

    /// Adds parameter overrides for `service`, merging with any already present.
    pub fn with_params(mut self, service: impl Into<String>, params: Params) -> Self {
        let entry = self.services.entry(service.into()).or_default();
        match &mut entry.params {
            Some(existing) => existing.merge(&params),
            None => entry.params = Some(params),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn from_json_str(source: &str) -> DiResult<Self> {
        serde_json::from_str(source)
            .map_err(|e| DiError::Config(format!("invalid JSON profile: {}", e)))
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(source: &str) -> DiResult<Self> {
        serde_yaml::from_str(source)
            .map_err(|e| DiError::Config(format!("invalid YAML profile: {}", e)))
    }

    /// Reads overrides from the process environment.
    ///
    /// Variables of the form `PREFIX__SERVICE__PARAM=value` set one parameter;
    /// `PREFIX__SERVICE__LIFETIME=scoped` sets the lifetime. Values that parse
    /// as an integer, a float or a boolean are stored as such, anything else
    /// as a string. The profile is named after the prefix.
    pub fn from_env(prefix: &str) -> DiResult<Self> {
        Self::from_vars(prefix, env::vars())
    }

    pub(crate) fn from_vars<I>(prefix: &str, vars: I) -> DiResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{}__", prefix);
        let mut profile = Profile::new(prefix);

        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(&marker) else {
                continue;
            };
            let Some((service, param)) = rest.split_once("__") else {
                return Err(DiError::Config(format!(
                    "environment variable {} must look like {}SERVICE__PARAM",
                    name, marker
                )));
            };
            if service.is_empty() || param.is_empty() {
                return Err(DiError::Config(format!(
                    "environment variable {} has an empty service or parameter name",
                    name
                )));
            }

            if param.eq_ignore_ascii_case("lifetime") {
                let lifetime = serde_json::from_value(Value::String(value.to_lowercase()))
                    .map_err(|_| DiError::Config(format!("{}: unknown lifetime '{}'", name, value)))?;
                profile = profile.with_lifetime(service, lifetime);
            } else {
                profile = profile.with_params(service, Params::new().with(param, parse_env_value(value)));
            }
        }

        Ok(profile)
    }
}

fn parse_env_value(value: String) -> Value {
    if let Ok(int_val) = value.parse::<i64>() {
        Value::from(int_val)
    } else if let Ok(float_val) = value.parse::<f64>() {
        Value::from(float_val)
    } else if let Ok(bool_val) = value.parse::<bool>() {
        Value::Bool(bool_val)
    } else {
        Value::String(value)
    }
}
