use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::client::{RegistryError, ServiceRegistry};
use super::types::RegistryRecord;

/// 内存注册表 (服务名 -> 注册记录)，语义与 Consul agent 一致
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    records: Arc<DashMap<String, RegistryRecord>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<RegistryRecord> {
        self.records.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 已注册的服务名，按字典序
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ServiceRegistry for MemoryRegistry {
    async fn register(&self, record: &RegistryRecord) -> Result<(), RegistryError> {
        tracing::debug!(service_name = %record.name, address = %record.address, "Storing service in memory registry");
        self.records.insert(record.name.clone(), record.clone());
        Ok(())
    }

    async fn deregister(&self, name: &str) -> Result<(), RegistryError> {
        match self.records.remove(name) {
            Some(_) => Ok(()),
            None => Err(RegistryError::NotFound(name.to_string())),
        }
    }
}
