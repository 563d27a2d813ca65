//! Fixed named arguments handed to constructor providers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DiError, DiResult};

/// Named construction arguments attached to a registration.
///
/// Values are stored as JSON so the same parameter set can come from code,
/// a profile document or the environment. Reads are typed through `serde`.
///
/// # Examples
///
/// ```rust
/// use lifestyle_di::Params;
/// use serde_json::json;
///
/// let params = Params::new().with("path", "app.log").with("count", 3);
/// assert_eq!(params.require::<String>("path").unwrap(), "app.log");
/// assert_eq!(params.get_or("count", 1u32).unwrap(), 3);
/// assert_eq!(params.get_or("missing", 1u32).unwrap(), 1);
///
/// let same = Params::from_value(json!({ "path": "app.log", "count": 3 })).unwrap();
/// assert_eq!(params, same);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    values: Map<String, Value>,
    #[serde(skip)]
    service: Option<&'static str>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from a JSON object.
    pub fn from_value(value: Value) -> DiResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values, service: None }),
            Value::Null => Ok(Self::new()),
            other => Err(DiError::Config(format!(
                "params must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Adds or replaces one parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Reads a required parameter.
    pub fn require<T: DeserializeOwned>(&self, name: &str) -> DiResult<T> {
        match self.values.get(name) {
            Some(value) => self.decode(name, value),
            None => Err(DiError::MissingParam {
                service: self.service_name(),
                param: name.to_string(),
            }),
        }
    }

    /// Reads an optional parameter, falling back to `default` when absent.
    /// A present but malformed value is still an error.
    pub fn get_or<T: DeserializeOwned>(&self, name: &str, default: T) -> DiResult<T> {
        match self.values.get(name) {
            Some(value) => self.decode(name, value),
            None => Ok(default),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Overlays `other` on top of `self`; keys in `other` win.
    pub fn merge(&mut self, other: &Params) {
        for (name, value) in &other.values {
            self.values.insert(name.clone(), value.clone());
        }
    }

    /// Tags the parameter set with the service it belongs to, for error messages.
    pub(crate) fn for_service(mut self, service: &'static str) -> Self {
        self.service = Some(service);
        self
    }

    fn service_name(&self) -> &'static str {
        self.service.unwrap_or("<unregistered>")
    }

    fn decode<T: DeserializeOwned>(&self, name: &str, value: &Value) -> DiResult<T> {
        T::deserialize(value).map_err(|e| DiError::InvalidParam {
            service: self.service_name(),
            param: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl From<Map<String, Value>> for Params {
    fn from(values: Map<String, Value>) -> Self {
        Self { values, service: None }
    }
}
