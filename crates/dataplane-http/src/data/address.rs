use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Property keys understood by [`HttpDataAddress`].
pub mod keys {
    pub const NAME: &str = "name";
    pub const BASE_URL: &str = "baseUrl";
    pub const PATH: &str = "path";
    pub const QUERY_PARAMS: &str = "queryParams";
    pub const METHOD: &str = "method";
    pub const AUTH_KEY: &str = "authKey";
    pub const AUTH_CODE: &str = "authCode";
    pub const SECRET_NAME: &str = "secretName";
    pub const AUTH_LOCATION: &str = "authLocation";
    pub const PROXY_PATH: &str = "proxyPath";
    pub const PROXY_QUERY_PARAMS: &str = "proxyQueryParams";
    pub const PROXY_METHOD: &str = "proxyMethod";
    pub const PROXY_BODY: &str = "proxyBody";
    pub const CONTENT_TYPE: &str = "contentType";
    pub const NON_CHUNKED_TRANSFER: &str = "nonChunkedTransfer";
    /// Prefix of additional request headers, e.g. `header:X-Tenant`.
    pub const HEADER_PREFIX: &str = "header:";
}

/// A generic endpoint description: a kind plus free-form properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataAddress {
    pub kind: String,
    pub properties: BTreeMap<String, String>,
}

impl DataAddress {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: BTreeMap::new(),
        }
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

/// Where the resolved auth code is placed on the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthLocation {
    #[default]
    Header,
    Query,
}

/// The HTTP-relevant view of a [`DataAddress`].
///
/// Values are copied out of the generic address and checked for shape;
/// whether a property is *required* is decided by the decorators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpDataAddress {
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub path: Option<String>,
    pub query_params: Option<String>,
    pub method: Option<String>,
    pub auth_key: Option<String>,
    pub auth_code: Option<String>,
    pub secret_name: Option<String>,
    pub auth_location: AuthLocation,
    pub proxy_path: bool,
    pub proxy_query_params: bool,
    pub proxy_method: bool,
    pub proxy_body: bool,
    pub content_type: Option<String>,
    pub non_chunked_transfer: bool,
    pub additional_headers: Vec<(String, String)>,
}

impl TryFrom<&DataAddress> for HttpDataAddress {
    type Error = Error;

    fn try_from(address: &DataAddress) -> Result<Self> {
        let text = |key: &str| {
            address
                .get(key)
                .filter(|v| !v.trim().is_empty())
                .map(str::to_owned)
        };
        let flag = |key: &str| parse_flag(key, address.get(key));

        let auth_location = match address.get(keys::AUTH_LOCATION) {
            None => AuthLocation::Header,
            Some(v) if v.eq_ignore_ascii_case("header") => AuthLocation::Header,
            Some(v) if v.eq_ignore_ascii_case("query") => AuthLocation::Query,
            Some(v) => return Err(Error::invalid_property(keys::AUTH_LOCATION, v)),
        };

        let additional_headers = address
            .properties
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(keys::HEADER_PREFIX)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name.to_owned(), v.clone()))
            })
            .collect();

        Ok(Self {
            name: text(keys::NAME),
            base_url: text(keys::BASE_URL),
            path: text(keys::PATH),
            query_params: text(keys::QUERY_PARAMS),
            method: text(keys::METHOD).map(|m| m.to_ascii_uppercase()),
            auth_key: text(keys::AUTH_KEY),
            auth_code: text(keys::AUTH_CODE),
            secret_name: text(keys::SECRET_NAME),
            auth_location,
            proxy_path: flag(keys::PROXY_PATH)?,
            proxy_query_params: flag(keys::PROXY_QUERY_PARAMS)?,
            proxy_method: flag(keys::PROXY_METHOD)?,
            proxy_body: flag(keys::PROXY_BODY)?,
            content_type: text(keys::CONTENT_TYPE),
            non_chunked_transfer: flag(keys::NON_CHUNKED_TRANSFER)?,
            additional_headers,
        })
    }
}

fn parse_flag(key: &str, value: Option<&str>) -> Result<bool> {
    match value.map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(Error::invalid_property(key, v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_http_properties() {
        let address = DataAddress::new("HttpDataAnonymize")
            .property(keys::NAME, "buildings")
            .property(keys::BASE_URL, "https://provider.example/api")
            .property(keys::METHOD, "put")
            .property(keys::NON_CHUNKED_TRANSFER, "TRUE")
            .property("header:X-Tenant", "north")
            .property("header:", "ignored");

        let http = HttpDataAddress::try_from(&address).unwrap();
        assert_eq!(http.name.as_deref(), Some("buildings"));
        assert_eq!(http.base_url.as_deref(), Some("https://provider.example/api"));
        assert_eq!(http.method.as_deref(), Some("PUT"));
        assert!(http.non_chunked_transfer);
        assert!(!http.proxy_path);
        assert_eq!(http.auth_location, AuthLocation::Header);
        assert_eq!(
            http.additional_headers,
            vec![("X-Tenant".to_string(), "north".to_string())]
        );
    }

    #[test]
    fn blank_values_count_as_absent() {
        let address = DataAddress::new("HttpDataAnonymize").property(keys::PATH, "  ");
        let http = HttpDataAddress::try_from(&address).unwrap();
        assert!(http.path.is_none());
    }

    #[test]
    fn malformed_flag_is_rejected() {
        let address = DataAddress::new("HttpDataAnonymize").property(keys::PROXY_METHOD, "yes");
        let err = HttpDataAddress::try_from(&address).unwrap_err();
        assert!(matches!(err, Error::InvalidProperty { ref key, .. } if key == keys::PROXY_METHOD));
        assert!(err.is_config());
    }

    #[test]
    fn auth_location_accepts_query() {
        let address = DataAddress::new("HttpDataAnonymize").property(keys::AUTH_LOCATION, "Query");
        let http = HttpDataAddress::try_from(&address).unwrap();
        assert_eq!(http.auth_location, AuthLocation::Query);

        let address = DataAddress::new("HttpDataAnonymize").property(keys::AUTH_LOCATION, "cookie");
        assert!(HttpDataAddress::try_from(&address).is_err());
    }
}
