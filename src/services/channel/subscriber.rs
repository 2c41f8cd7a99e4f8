use thiserror::Error;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::config::ChannelConfig;
use crate::services::event::EventDispatcher;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Redis 订阅者：接收生命周期消息并交给分发器，按到达顺序逐条处理
pub struct RedisSubscriber {
    client: redis::Client,
    topics: Vec<String>,
}

impl RedisSubscriber {
    pub fn new(config: &ChannelConfig) -> Result<Self, ChannelError> {
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Self {
            client,
            topics: config.topics(),
        })
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// 运行直到取消或连接关闭。单条消息处理失败只记录日志，不中断循环
    pub async fn run(
        &self,
        dispatcher: EventDispatcher,
        shutdown: CancellationToken,
    ) -> Result<(), ChannelError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        for topic in &self.topics {
            pubsub.subscribe(topic).await?;
            tracing::info!(topic = %topic, "Subscribed to channel");
        }

        let messages = pubsub.on_message();
        tokio::pin!(messages);
        loop {
            let message = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested, stopping subscriber");
                    break;
                }
                message = messages.next() => message,
            };

            let Some(message) = message else {
                tracing::warn!("Channel message stream closed");
                break;
            };

            let topic = message.get_channel_name().to_string();
            match dispatcher.dispatch_payload(message.get_payload_bytes()).await {
                Ok(Some(report)) if !report.is_success() => {
                    for (name, err) in report.failures() {
                        tracing::warn!(topic = %topic, service_name = %name, error = %err, "Service reconciliation failed");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(topic = %topic, error = %err, "Dropping malformed event");
                }
            }
        }

        Ok(())
    }
}
