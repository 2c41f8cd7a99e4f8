use async_trait::async_trait;
use thiserror::Error;

use super::types::RegistryRecord;

/// 注册中心错误类型
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Registry transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Registry rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Service not registered: {0}")]
    NotFound(String),

    #[error("Invalid registry endpoint: {0}")]
    InvalidEndpoint(String),
}

/// 注册中心客户端，启动时构造后注入协调器。
/// register 按服务名覆盖写入；deregister 对不存在的服务返回 `NotFound`。
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    async fn register(&self, record: &RegistryRecord) -> Result<(), RegistryError>;

    async fn deregister(&self, name: &str) -> Result<(), RegistryError>;
}
