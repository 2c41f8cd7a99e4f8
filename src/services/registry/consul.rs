use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use url::Url;

use super::client::{RegistryError, ServiceRegistry};
use super::types::RegistryRecord;
use crate::config::RegistryConfig;

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Consul agent HTTP API 客户端
#[derive(Debug, Clone)]
pub struct ConsulRegistry {
    client: Client,
    base: Url,
    credentials: Option<(String, Option<String>)>,
    token: Option<String>,
}

impl ConsulRegistry {
    /// URL 中携带的 `user:password@` 作为 basic auth 发送
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut base = Url::parse(&config.url)
            .map_err(|e| RegistryError::InvalidEndpoint(format!("{}: {e}", config.url)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(RegistryError::InvalidEndpoint(config.url.clone()));
        }

        let credentials = if base.username().is_empty() && base.password().is_none() {
            None
        } else {
            Some((
                base.username().to_string(),
                base.password().map(str::to_string),
            ))
        };
        // 凭据不出现在请求 URL 中
        let _ = base.set_username("");
        let _ = base.set_password(None);

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base,
            credentials,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        };
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }
}

#[async_trait]
impl ServiceRegistry for ConsulRegistry {
    async fn register(&self, record: &RegistryRecord) -> Result<(), RegistryError> {
        let url = self.endpoint(&["v1", "agent", "service", "register"])?;
        let response = self
            .authorize(self.client.put(url))
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(RegistryError::Rejected {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }

    async fn deregister(&self, name: &str) -> Result<(), RegistryError> {
        let url = self.endpoint(&["v1", "agent", "service", "deregister", name])?;
        let response = self.authorize(self.client.put(url)).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        // 旧版本 Consul 对未知服务返回 500 "Unknown service"
        if status == StatusCode::NOT_FOUND || body.contains("Unknown service") {
            return Err(RegistryError::NotFound(name.to_string()));
        }
        Err(RegistryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
