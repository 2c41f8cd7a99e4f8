//! Workload manifest module
//!
//! - `types`: 清单与工作负载描述的数据结构
//! - `expander`: 由清单推导出需要注册的服务名集合

pub mod expander;
pub mod types;

pub use expander::{ServiceTarget, expand, expand_names, sub_service_name};
pub use types::{DEFAULT_PROTO, Manifest, PortValue, ServiceSpec, WorkloadDescriptor};
