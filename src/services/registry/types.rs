use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::manifest::{PortValue, ServiceSpec};

/// 健康检查间隔，固定值
pub const CHECK_INTERVAL: &str = "30s";
/// 健康检查超时，固定值
pub const CHECK_TIMEOUT: &str = "1s";

/// 写入注册中心的服务记录 (Consul agent service 格式)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
    #[serde(rename = "Port")]
    pub port: u16,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Check")]
    pub check: HealthCheck,
}

/// TCP 存活检查
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "TCP")]
    pub tcp: String,
    #[serde(rename = "Interval")]
    pub interval: String,
    #[serde(rename = "Timeout")]
    pub timeout: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid port value: {value}")]
    InvalidPort { value: String },

    #[error("Empty address for service: {name}")]
    EmptyAddress { name: String },
}

/// 路由标签，下游路由层据此按主机名绑定流量
pub fn routing_tag(name: &str, proto: &str) -> String {
    format!("urlprefix-{name}/ proto={proto}")
}

/// 端口转换为非负整数，无法转换时报错而不是置零
pub fn coerce_port(port: &PortValue) -> Result<u16, RecordError> {
    let invalid = || RecordError::InvalidPort {
        value: port.to_string(),
    };
    match port {
        PortValue::Number(n) => u16::try_from(*n).map_err(|_| invalid()),
        PortValue::Text(s) => s.trim().parse::<u16>().map_err(|_| invalid()),
        PortValue::Other(_) => Err(invalid()),
    }
}

/// 由服务名、端口声明与工作负载地址构建注册记录
pub fn build_record(
    name: &str,
    spec: &ServiceSpec,
    address: &str,
) -> Result<RegistryRecord, RecordError> {
    if address.is_empty() {
        return Err(RecordError::EmptyAddress {
            name: name.to_string(),
        });
    }
    let port = coerce_port(&spec.port)?;

    Ok(RegistryRecord {
        name: name.to_string(),
        tags: vec![routing_tag(name, &spec.proto)],
        port,
        address: address.to_string(),
        check: HealthCheck {
            name: format!("Check port {port}"),
            tcp: format!("{address}:{port}"),
            interval: CHECK_INTERVAL.to_string(),
            timeout: CHECK_TIMEOUT.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_record() {
        let record = build_record("web.abc", &ServiceSpec::tcp(8080), "10.0.0.5").unwrap();

        assert_eq!(record.name, "web.abc");
        assert_eq!(record.tags, vec!["urlprefix-web.abc/ proto=tcp"]);
        assert_eq!(record.port, 8080);
        assert_eq!(record.address, "10.0.0.5");
        assert_eq!(
            record.check,
            HealthCheck {
                name: "Check port 8080".to_string(),
                tcp: "10.0.0.5:8080".to_string(),
                interval: "30s".to_string(),
                timeout: "1s".to_string(),
            }
        );
    }

    #[test]
    fn test_build_record_is_deterministic() {
        let spec = ServiceSpec::new("9090", "udp");
        assert_eq!(
            build_record("api.abc", &spec, "10.0.0.5"),
            build_record("api.abc", &spec, "10.0.0.5")
        );
    }

    #[test]
    fn test_default_spec_uses_port_zero() {
        let record = build_record("abc", &ServiceSpec::default(), "10.0.0.5").unwrap();
        assert_eq!(record.port, 0);
        assert_eq!(record.tags, vec!["urlprefix-abc/ proto=tcp"]);
        assert_eq!(record.check.tcp, "10.0.0.5:0");
    }

    #[test]
    fn test_coerce_port() {
        assert_eq!(coerce_port(&PortValue::Text(" 443 ".to_string())), Ok(443));
        assert_eq!(coerce_port(&PortValue::Number(80)), Ok(80));
        assert!(coerce_port(&PortValue::Text("http".to_string())).is_err());
        assert!(coerce_port(&PortValue::Text(String::new())).is_err());
        assert!(coerce_port(&PortValue::Number(-1)).is_err());
        assert!(coerce_port(&PortValue::Number(70000)).is_err());
        assert_eq!(
            coerce_port(&PortValue::Other(serde_json::json!(8080.5))),
            Err(RecordError::InvalidPort {
                value: "8080.5".to_string()
            })
        );
        assert!(coerce_port(&PortValue::Other(serde_json::Value::Null)).is_err());
    }

    #[test]
    fn test_empty_address_is_rejected() {
        let err = build_record("abc", &ServiceSpec::tcp(80), "").unwrap_err();
        assert_eq!(
            err,
            RecordError::EmptyAddress {
                name: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_consul_field_names() {
        let record = build_record("abc", &ServiceSpec::tcp(80), "10.0.0.5").unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["Name"], "abc");
        assert_eq!(json["Port"], 80);
        assert_eq!(json["Check"]["TCP"], "10.0.0.5:80");
        assert_eq!(json["Check"]["Interval"], "30s");
    }
}
