pub mod subscriber;

pub use subscriber::{ChannelError, RedisSubscriber};
