//! Service registry module
//!
//! - `types`: 注册记录与记录构建
//! - `client`: 注册中心客户端抽象
//! - `consul`: Consul agent HTTP 实现
//! - `memory`: 内存实现，用于试运行

pub mod client;
pub mod consul;
pub mod memory;
pub mod types;

pub use client::{RegistryError, ServiceRegistry};
pub use consul::ConsulRegistry;
pub use memory::MemoryRegistry;
pub use types::{HealthCheck, RecordError, RegistryRecord, build_record, routing_tag};
