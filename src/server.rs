use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, RegistryConfig};
use crate::services::channel::RedisSubscriber;
use crate::services::event::EventDispatcher;
use crate::services::reconciler::Reconciler;
use crate::services::registry::{ConsulRegistry, MemoryRegistry, RegistryError, ServiceRegistry};

const MEMORY_SCHEME: &str = "memory://";

/// 按配置选择注册中心实现
pub fn build_registry(
    config: &RegistryConfig,
) -> Result<Arc<dyn ServiceRegistry>, RegistryError> {
    if config.url.starts_with(MEMORY_SCHEME) {
        tracing::warn!("Using in-memory registry, services will not be published");
        return Ok(Arc::new(MemoryRegistry::new()));
    }
    Ok(Arc::new(ConsulRegistry::new(config)?))
}

pub async fn start() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // 注册中心客户端与订阅连接在进程内各只有一个
    let registry = build_registry(&config.registry)?;
    let dispatcher = EventDispatcher::new(Reconciler::new(registry));
    let subscriber = RedisSubscriber::new(&config.channel)?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for shutdown signal");
            return;
        }
        signal_token.cancel();
    });

    tracing::info!(
        registry = %config.registry.url,
        topics = ?subscriber.topics(),
        "Container registrator running"
    );

    subscriber.run(dispatcher, shutdown).await?;

    tracing::info!("Container registrator stopped");
    Ok(())
}
