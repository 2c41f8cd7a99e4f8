#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use container_registrator::services::manifest::{Manifest, ServiceSpec, WorkloadDescriptor};
use container_registrator::services::registry::{
    MemoryRegistry, RegistryError, RegistryRecord, ServiceRegistry,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register(String),
    Deregister(String),
}

/// 记录所有调用的注册中心，可指定某些服务名调用失败
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    pub store: MemoryRegistry,
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn deregistered(&self) -> HashSet<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Deregister(name) => Some(name),
                Call::Register(_) => None,
            })
            .collect()
    }

    fn should_fail(&self, name: &str) -> bool {
        self.failing.lock().unwrap().contains(name)
    }
}

#[async_trait]
impl ServiceRegistry for RecordingRegistry {
    async fn register(&self, record: &RegistryRecord) -> Result<(), RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Register(record.name.clone()));
        if self.should_fail(&record.name) {
            return Err(RegistryError::Rejected {
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        self.store.register(record).await
    }

    async fn deregister(&self, name: &str) -> Result<(), RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Deregister(name.to_string()));
        if self.should_fail(name) {
            return Err(RegistryError::Rejected {
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        self.store.deregister(name).await
    }
}

/// `{service:{port:80}, services:{web:{port:8080}, api:{port:9090,proto:'udp'}}}`
pub fn sample_manifest() -> Manifest {
    Manifest::new(ServiceSpec::tcp(80))
        .with_service("web", ServiceSpec::tcp(8080))
        .with_service("api", ServiceSpec::new(9090, "udp"))
}

pub fn sample_workload() -> WorkloadDescriptor {
    WorkloadDescriptor::new("abc", "10.0.0.5")
}

pub fn event_payload(event_name: &str) -> String {
    serde_json::json!({
        "eventName": event_name,
        "info": {"host.hostname": "abc", "ip4.addr": "10.0.0.5"},
        "manifest": {
            "service": {"port": 80},
            "services": {
                "web": {"port": 8080},
                "api": {"port": 9090, "proto": "udp"}
            }
        }
    })
    .to_string()
}
