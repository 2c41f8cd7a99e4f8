use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_PROTO: &str = "tcp";

/// 工作负载运行时信息，随事件一起下发
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadDescriptor {
    pub hostname: String,
    pub ipv4_address: String,
}

impl WorkloadDescriptor {
    pub fn new(hostname: impl Into<String>, ipv4_address: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ipv4_address: ipv4_address.into(),
        }
    }
}

/// 端口在清单中可能是数字也可能是字符串，构建注册记录时再统一转换。
/// 其他形状 (null、小数、布尔等) 原样保留，只让对应的那条记录失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(i64),
    Text(String),
    Other(Value),
}

impl Default for PortValue {
    fn default() -> Self {
        PortValue::Number(0)
    }
}

impl From<u16> for PortValue {
    fn from(port: u16) -> Self {
        PortValue::Number(i64::from(port))
    }
}

impl From<i32> for PortValue {
    fn from(port: i32) -> Self {
        PortValue::Number(i64::from(port))
    }
}

impl From<&str> for PortValue {
    fn from(port: &str) -> Self {
        PortValue::Text(port.to_string())
    }
}

impl fmt::Display for PortValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortValue::Number(n) => write!(f, "{n}"),
            PortValue::Text(s) => write!(f, "{s}"),
            PortValue::Other(value) => write!(f, "{value}"),
        }
    }
}

/// 单个逻辑服务的暴露声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default)]
    pub port: PortValue,
    #[serde(default = "default_proto", deserialize_with = "proto_or_default")]
    pub proto: String,
}

impl ServiceSpec {
    pub fn new(port: impl Into<PortValue>, proto: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            proto: proto.into(),
        }
    }

    pub fn tcp(port: impl Into<PortValue>) -> Self {
        Self::new(port, DEFAULT_PROTO)
    }
}

impl Default for ServiceSpec {
    fn default() -> Self {
        Self {
            port: PortValue::default(),
            proto: default_proto(),
        }
    }
}

/// 工作负载清单：自身的默认服务 + 按名称声明的子服务
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub service: ServiceSpec,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: BTreeMap<String, ServiceSpec>,
}

impl Manifest {
    pub fn new(service: ServiceSpec) -> Self {
        Self {
            service,
            services: BTreeMap::new(),
        }
    }

    pub fn with_service(mut self, name: impl Into<String>, spec: ServiceSpec) -> Self {
        self.services.insert(name.into(), spec);
        self
    }
}

fn default_proto() -> String {
    DEFAULT_PROTO.to_string()
}

fn proto_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_proto))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
