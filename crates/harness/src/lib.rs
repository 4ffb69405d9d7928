pub mod counting;
pub mod fixtures;
pub mod store;

pub use counting::{CountingStorage, QueryCounts};
pub use store::TestStore;
