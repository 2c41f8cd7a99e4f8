use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::services::manifest::{Manifest, WorkloadDescriptor};

pub const EVENT_STARTED: &str = "started";
/// 上游协议中的拼写，需保持一致
pub const EVENT_STOPPED: &str = "stoped";

/// 事件解码错误类型
#[derive(Error, Debug)]
pub enum EventError {
    #[error("Malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Event payload is not valid UTF-8")]
    InvalidEncoding,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid workload info: {0}")]
    InvalidWorkload(String),
}

/// 解码后的生命周期事件
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Started {
        workload: WorkloadDescriptor,
        manifest: Manifest,
    },
    Stopped {
        workload: WorkloadDescriptor,
        manifest: Manifest,
    },
    /// 尚不认识的事件类型，忽略
    Unknown(String),
}

impl LifecycleEvent {
    pub fn kind(&self) -> &str {
        match self {
            LifecycleEvent::Started { .. } => EVENT_STARTED,
            LifecycleEvent::Stopped { .. } => EVENT_STOPPED,
            LifecycleEvent::Unknown(kind) => kind,
        }
    }

    pub fn decode(payload: &[u8]) -> Result<Self, EventError> {
        let payload = std::str::from_utf8(payload).map_err(|_| EventError::InvalidEncoding)?;
        let raw: RawEvent = serde_json::from_str(payload)?;
        raw.into_event()
    }
}

/// 通道上的原始消息：`{ manifest, info, eventName }`
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "eventName")]
    event_name: Option<String>,
    manifest: Option<Value>,
    info: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EventInfo {
    #[serde(rename = "host.hostname")]
    hostname: Option<String>,
    #[serde(rename = "ip4.addr")]
    address: Option<String>,
}

impl RawEvent {
    fn into_event(self) -> Result<LifecycleEvent, EventError> {
        let event_name = self.event_name.ok_or(EventError::MissingField("eventName"))?;
        // 未知事件不校验其余字段
        if event_name != EVENT_STARTED && event_name != EVENT_STOPPED {
            return Ok(LifecycleEvent::Unknown(event_name));
        }

        let manifest: Manifest = match self.manifest {
            Some(Value::Null) | None => return Err(EventError::MissingField("manifest")),
            Some(value) => serde_json::from_value(value)?,
        };
        let info: EventInfo = match self.info {
            Some(Value::Null) | None => return Err(EventError::MissingField("info")),
            Some(value) => serde_json::from_value(value)?,
        };
        let started = event_name == EVENT_STARTED;
        // 注销只需要主机名
        let workload = info.into_workload(started)?;

        Ok(if started {
            LifecycleEvent::Started { workload, manifest }
        } else {
            LifecycleEvent::Stopped { workload, manifest }
        })
    }
}

impl EventInfo {
    fn into_workload(self, require_address: bool) -> Result<WorkloadDescriptor, EventError> {
        let hostname = self
            .hostname
            .filter(|hostname| !hostname.is_empty())
            .ok_or_else(|| EventError::InvalidWorkload("empty host.hostname".to_string()))?;
        let address = self.address.unwrap_or_default();
        if require_address && address.is_empty() {
            return Err(EventError::InvalidWorkload("empty ip4.addr".to_string()));
        }
        Ok(WorkloadDescriptor::new(hostname, address))
    }
}
