pub mod cache;
pub mod interactions;
pub mod postgres;
pub mod watchlist;

pub use cache::{Cache, CacheKey, CacheStore, MemoryStore, RedisStore};
pub use interactions::{InteractionStore, MemoryInteractionStore, PgInteractionStore};
pub use postgres::create_pool;
pub use watchlist::{MemoryWatchlist, WatchlistStore};
