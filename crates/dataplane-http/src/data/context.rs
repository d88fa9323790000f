use std::collections::BTreeMap;

use super::address::DataAddress;

/// Transfer-context property carrying the method of a proxied call.
pub const PROXY_METHOD_PROPERTY: &str = "method";
/// Transfer-context property carrying the path of a proxied call.
pub const PROXY_PATH_PROPERTY: &str = "pathSegments";
/// Transfer-context property carrying the query string of a proxied call.
pub const PROXY_QUERY_PROPERTY: &str = "queryParams";
/// Transfer-context property carrying the body of a proxied call.
pub const PROXY_BODY_PROPERTY: &str = "body";

/// Read-only description of one data movement: where from, where to.
///
/// The pipeline never mutates a context; decorators and factories only
/// borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferContext {
    pub id: String,
    pub process_id: String,
    pub source: DataAddress,
    pub destination: DataAddress,
    pub properties: BTreeMap<String, String>,
}

impl TransferContext {
    pub fn new(id: impl Into<String>, source: DataAddress, destination: DataAddress) -> Self {
        let id = id.into();
        Self {
            process_id: id.clone(),
            id,
            source,
            destination,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn process_id(mut self, process_id: impl Into<String>) -> Self {
        self.process_id = process_id.into();
        self
    }

    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
