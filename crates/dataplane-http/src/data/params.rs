use url::Url;

use crate::error::{Error, Result};

/// Content type used when no decorator sets one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One fully specified HTTP call.
///
/// Built once through [`RequestParamsBuilder`] and immutable afterwards.
/// `method` and `base_url` are always present and `base_url` parses as a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    method: String,
    base_url: String,
    path: Option<String>,
    query_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    non_chunked_body: bool,
    content_type: String,
    body: Option<String>,
}

impl RequestParams {
    pub fn builder() -> RequestParamsBuilder {
        RequestParamsBuilder::default()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// Headers in the order they were first set.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        lookup(&self.headers, name)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        lookup(&self.query_params, name)
    }

    pub fn non_chunked_body(&self) -> bool {
        self.non_chunked_body
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Body for calls that carry a fixed payload (proxied source calls).
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Base URL joined with the path, plus the query parameters.
    pub fn url(&self) -> Result<Url> {
        let joined = match self.path.as_deref().map(|p| p.trim_start_matches('/')) {
            Some(path) if !path.is_empty() => {
                format!("{}/{}", self.base_url.trim_end_matches('/'), path)
            }
            _ => self.base_url.clone(),
        };
        let mut url = Url::parse(&joined).map_err(|source| Error::InvalidUrl {
            url: joined.clone(),
            source,
        })?;
        if !self.query_params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query_params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

/// Mutable builder passed through the decorator chain.
///
/// Setting a header or query parameter that already exists replaces its
/// value in place, so later decorators win.
#[derive(Debug, Clone, Default)]
pub struct RequestParamsBuilder {
    method: Option<String>,
    base_url: Option<String>,
    path: Option<String>,
    query_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    non_chunked_body: bool,
    content_type: Option<String>,
    body: Option<String>,
}

impl RequestParamsBuilder {
    pub fn method(&mut self, method: impl Into<String>) -> &mut Self {
        self.method = Some(method.into().to_ascii_uppercase());
        self
    }

    pub fn base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = Some(path.into());
        self
    }

    pub fn query_param(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        upsert(&mut self.query_params, name.into(), value.into());
        self
    }

    /// Parse a raw `a=1&b=2` query string and add each pair.
    pub fn query_string(&mut self, query: &str) -> &mut Self {
        let query = query.trim_start_matches('?');
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            upsert(&mut self.query_params, name.into_owned(), value.into_owned());
        }
        self
    }

    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        upsert(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn non_chunked_body(&mut self, non_chunked: bool) -> &mut Self {
        self.non_chunked_body = non_chunked;
        self
    }

    pub fn content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn body(&mut self, body: impl Into<String>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    pub fn current_method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn current_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn build(self) -> Result<RequestParams> {
        let method = self
            .method
            .ok_or_else(|| Error::Validation("request method is required".into()))?;
        let base_url = self.base_url.ok_or(Error::MissingProperty(super::address::keys::BASE_URL))?;
        Url::parse(&base_url).map_err(|source| Error::InvalidUrl {
            url: base_url.clone(),
            source,
        })?;

        Ok(RequestParams {
            method,
            base_url,
            path: self.path,
            query_params: self.query_params,
            headers: self.headers,
            non_chunked_body: self.non_chunked_body,
            content_type: self
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            body: self.body,
        })
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, name: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == name) {
        Some(slot) => slot.1 = value,
        None => pairs.push((name, value)),
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}
