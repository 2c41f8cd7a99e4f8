use super::types::{EventError, LifecycleEvent};
use crate::services::reconciler::{ReconcileReport, Reconciler};

/// 事件分发器：按事件类型将生命周期事件路由到协调器
#[derive(Clone)]
pub struct EventDispatcher {
    reconciler: Reconciler,
}

impl EventDispatcher {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    /// 未知事件返回 None，不访问注册中心
    pub async fn dispatch(&self, event: LifecycleEvent) -> Option<ReconcileReport> {
        match event {
            LifecycleEvent::Started { workload, manifest } => {
                tracing::info!(hostname = %workload.hostname, address = %workload.ipv4_address, "Workload started");
                Some(self.reconciler.register(&workload, &manifest).await)
            }
            LifecycleEvent::Stopped { workload, manifest } => {
                tracing::info!(hostname = %workload.hostname, "Workload stopped");
                Some(self.reconciler.deregister(&workload, &manifest).await)
            }
            LifecycleEvent::Unknown(kind) => {
                tracing::debug!(event_name = %kind, "Ignoring unknown event kind");
                None
            }
        }
    }

    /// 解码原始消息后分发；解码失败返回错误，由调用方记录后丢弃
    pub async fn dispatch_payload(
        &self,
        payload: &[u8],
    ) -> Result<Option<ReconcileReport>, EventError> {
        let event = LifecycleEvent::decode(payload)?;
        Ok(self.dispatch(event).await)
    }
}
