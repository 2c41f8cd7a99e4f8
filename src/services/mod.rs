pub mod channel;
pub mod event;
pub mod manifest;
pub mod reconciler;
pub mod registry;

pub use event::{EventDispatcher, LifecycleEvent};
pub use reconciler::{ReconcileReport, Reconciler};
pub use registry::{ConsulRegistry, MemoryRegistry, ServiceRegistry};
