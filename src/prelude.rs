pub use crate::builder::{CacheBuilder, Policy, PolicyCache};
pub use crate::ds::{FrequencyBuckets, GhostList, RecencyList, ShardSelector, SlotArena, SlotId};
pub use crate::policy::adaptive::AdaptiveCache;
pub use crate::policy::concurrent::SharedCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LruKCache;
pub use crate::policy::sharded::ShardedCache;
pub use crate::traits::{Cache, RemovableCache};
