pub mod dispatcher;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use types::{EVENT_STARTED, EVENT_STOPPED, EventError, LifecycleEvent};
