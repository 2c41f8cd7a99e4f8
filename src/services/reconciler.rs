use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::services::manifest::{
    Manifest, ServiceTarget, WorkloadDescriptor, expand, expand_names,
};
use crate::services::registry::{RecordError, RegistryError, ServiceRegistry, build_record};

/// 单条记录的处理错误
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to build registry record: {0}")]
    Record(#[from] RecordError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Deregister,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Register => write!(f, "register"),
            Action::Deregister => write!(f, "deregister"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Registered,
    Deregistered,
    /// 注销时服务本就不存在，视为已完成
    AlreadyAbsent,
}

#[derive(Debug)]
pub struct RecordOutcome {
    pub name: String,
    pub result: Result<Outcome, ReconcileError>,
}

/// 一次事件处理的汇总，按展开顺序列出每个服务名的结果
#[derive(Debug)]
pub struct ReconcileReport {
    pub action: Action,
    pub hostname: String,
    pub outcomes: Vec<RecordOutcome>,
}

impl ReconcileReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ReconcileError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(err) => Some((outcome.name.as_str(), err)),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .map(|outcome| outcome.name.as_str())
            .collect()
    }

    pub fn outcome(&self, name: &str) -> Option<&Result<Outcome, ReconcileError>> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.name == name)
            .map(|outcome| &outcome.result)
    }
}

/// 注册协调器：根据工作负载清单向注册中心注册或注销服务。
/// 同一事件内的各个服务并发提交，互不影响。
#[derive(Clone)]
pub struct Reconciler {
    registry: Arc<dyn ServiceRegistry>,
}

impl Reconciler {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// 处理 started 事件
    pub async fn register(
        &self,
        workload: &WorkloadDescriptor,
        manifest: &Manifest,
    ) -> ReconcileReport {
        let targets = expand(manifest, &workload.hostname);
        let address = workload.ipv4_address.as_str();

        let submissions = targets
            .into_iter()
            .map(|target| self.register_one(target, address));
        let outcomes = join_all(submissions).await;

        let report = ReconcileReport {
            action: Action::Register,
            hostname: workload.hostname.clone(),
            outcomes,
        };
        log_report(&report);
        report
    }

    /// 处理 stoped 事件；某个服务注销失败不影响其余服务
    pub async fn deregister(
        &self,
        workload: &WorkloadDescriptor,
        manifest: &Manifest,
    ) -> ReconcileReport {
        let names = expand_names(manifest, &workload.hostname);

        let submissions = names.into_iter().map(|name| async move {
            let result = self.deregister_one(&name).await;
            RecordOutcome { name, result }
        });
        let outcomes = join_all(submissions).await;

        let report = ReconcileReport {
            action: Action::Deregister,
            hostname: workload.hostname.clone(),
            outcomes,
        };
        log_report(&report);
        report
    }

    async fn register_one(&self, target: ServiceTarget<'_>, address: &str) -> RecordOutcome {
        let result = async {
            let record = build_record(&target.name, target.spec, address)?;
            self.registry.register(&record).await?;
            tracing::info!(
                service_name = %record.name,
                address = %record.address,
                port = record.port,
                tag = ?record.tags,
                "Registered service"
            );
            Ok::<_, ReconcileError>(Outcome::Registered)
        }
        .await;

        if let Err(err) = &result {
            tracing::error!(service_name = %target.name, error = %err, "Failed to register service");
        }
        RecordOutcome {
            name: target.name,
            result,
        }
    }

    async fn deregister_one(&self, name: &str) -> Result<Outcome, ReconcileError> {
        match self.registry.deregister(name).await {
            Ok(()) => {
                tracing::info!(service_name = %name, "Deregistered service");
                Ok(Outcome::Deregistered)
            }
            Err(RegistryError::NotFound(_)) => {
                tracing::info!(service_name = %name, "Service not registered, nothing to remove");
                Ok(Outcome::AlreadyAbsent)
            }
            Err(err) => {
                tracing::warn!(service_name = %name, error = %err, "Failed to deregister service");
                Err(err.into())
            }
        }
    }
}

fn log_report(report: &ReconcileReport) {
    let failed = report.failures().count();
    if failed == 0 {
        tracing::debug!(
            action = %report.action,
            hostname = %report.hostname,
            services = report.outcomes.len(),
            "Reconciled workload"
        );
    } else {
        tracing::warn!(
            action = %report.action,
            hostname = %report.hostname,
            services = report.outcomes.len(),
            failed = failed,
            "Reconciled workload with failures"
        );
    }
}
