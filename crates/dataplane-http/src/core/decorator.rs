use std::sync::Arc;

use crate::data::context::{
    PROXY_BODY_PROPERTY, PROXY_METHOD_PROPERTY, PROXY_PATH_PROPERTY, PROXY_QUERY_PROPERTY,
};
use crate::data::params::DEFAULT_CONTENT_TYPE;
use crate::data::{AuthLocation, HttpDataAddress, RequestParamsBuilder, TransferContext, keys};
use crate::effects::SecretStore;
use crate::error::{Error, Result};

/// One step of request construction.
///
/// A decorator reads the transfer context and the resolved address and
/// writes into the shared builder. Decorators run in registration order;
/// a later write to the same header or query parameter replaces an earlier
/// one. A missing or malformed required property is returned as an error,
/// which surfaces when the source or sink is built.
///
/// Closures with the same signature are decorators too.
pub trait ParamsDecorator: Send + Sync {
    fn decorate(
        &self,
        ctx: &TransferContext,
        address: &HttpDataAddress,
        params: &mut RequestParamsBuilder,
    ) -> Result<()>;
}

impl<F> ParamsDecorator for F
where
    F: Fn(&TransferContext, &HttpDataAddress, &mut RequestParamsBuilder) -> Result<()> + Send + Sync,
{
    fn decorate(
        &self,
        ctx: &TransferContext,
        address: &HttpDataAddress,
        params: &mut RequestParamsBuilder,
    ) -> Result<()> {
        self(ctx, address, params)
    }
}

/// Shared by the source and the sink chain: auth, extra headers, body mode.
pub struct CommonParamsDecorator {
    secrets: Arc<dyn SecretStore>,
}

impl CommonParamsDecorator {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }

    /// The secret named by `secretName`, else the literal `authCode`.
    fn auth_code(&self, address: &HttpDataAddress) -> Result<Option<String>> {
        let Some(name) = address.secret_name.as_deref() else {
            return Ok(address.auth_code.clone());
        };
        match self.secrets.resolve(name) {
            Some(secret) => Ok(Some(secret)),
            None => address
                .auth_code
                .clone()
                .map(Some)
                .ok_or_else(|| Error::SecretNotFound(name.to_string())),
        }
    }
}

impl ParamsDecorator for CommonParamsDecorator {
    fn decorate(
        &self,
        _ctx: &TransferContext,
        address: &HttpDataAddress,
        params: &mut RequestParamsBuilder,
    ) -> Result<()> {
        let code = self.auth_code(address)?;
        if let (Some(key), Some(code)) = (address.auth_key.as_deref(), code) {
            match address.auth_location {
                AuthLocation::Header => params.header(key, code),
                AuthLocation::Query => params.query_param(key, code),
            };
        }

        for (name, value) in &address.additional_headers {
            params.header(name, value);
        }
        if let Some(content_type) = address.content_type.as_deref() {
            params.content_type(content_type);
        }
        params.non_chunked_body(address.non_chunked_transfer);
        Ok(())
    }
}

/// Read side: GET unless the transfer proxies the caller's request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceParamsDecorator;

impl ParamsDecorator for SourceParamsDecorator {
    fn decorate(
        &self,
        ctx: &TransferContext,
        address: &HttpDataAddress,
        params: &mut RequestParamsBuilder,
    ) -> Result<()> {
        let base_url = address
            .base_url
            .as_deref()
            .ok_or(Error::MissingProperty(keys::BASE_URL))?;
        params.base_url(base_url);

        if address.proxy_method {
            let method = ctx.get(PROXY_METHOD_PROPERTY).ok_or_else(|| {
                Error::Validation(format!(
                    "transfer context property `{PROXY_METHOD_PROPERTY}` is missing"
                ))
            })?;
            params.method(method);
        } else {
            params.method("GET");
        }

        let path = if address.proxy_path {
            ctx.get(PROXY_PATH_PROPERTY)
        } else {
            address.path.as_deref()
        };
        if let Some(path) = path {
            params.path(path);
        }

        let query = if address.proxy_query_params {
            ctx.get(PROXY_QUERY_PROPERTY)
        } else {
            address.query_params.as_deref()
        };
        if let Some(query) = query {
            params.query_string(query);
        }

        if address.proxy_body
            && let Some(body) = ctx.get(PROXY_BODY_PROPERTY)
        {
            params.body(body);
        }
        Ok(())
    }
}

/// Write side: POST unless the address names another method.
#[derive(Debug, Clone, Copy, Default)]
pub struct SinkParamsDecorator;

impl ParamsDecorator for SinkParamsDecorator {
    fn decorate(
        &self,
        _ctx: &TransferContext,
        address: &HttpDataAddress,
        params: &mut RequestParamsBuilder,
    ) -> Result<()> {
        let base_url = address
            .base_url
            .as_deref()
            .ok_or(Error::MissingProperty(keys::BASE_URL))?;
        params
            .base_url(base_url)
            .method(address.method.as_deref().unwrap_or("POST"));

        if let Some(path) = address.path.as_deref() {
            params.path(path);
        }
        if let Some(query) = address.query_params.as_deref() {
            params.query_string(query);
        }
        if params.current_content_type().is_none() {
            params.content_type(DEFAULT_CONTENT_TYPE);
        }
        Ok(())
    }
}
