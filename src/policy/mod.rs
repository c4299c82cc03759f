pub mod adaptive;
pub mod concurrent;
pub mod lfu;
pub mod lru;
pub mod lru_k;
pub mod sharded;
