pub mod aggregator;
pub mod fallback;
pub mod normalize;
pub mod providers;
pub mod ranker;
pub mod subscription;
pub mod trends;
pub mod users;

pub use aggregator::Aggregator;
pub use ranker::Ranker;
pub use subscription::SubscriptionManager;
pub use users::{InMemoryUserStore, UserStore};
