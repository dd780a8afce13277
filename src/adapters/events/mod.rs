//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus (single binary, tests)
//! - `RedisEventBus` - Redis Streams with consumer groups (multi-process)

mod in_memory;
mod redis_bus;

pub use in_memory::InMemoryEventBus;
pub use redis_bus::{RedisEventBus, RedisEventBusConfig};
