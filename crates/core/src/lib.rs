pub mod affinity;
pub mod column_value;
pub mod error;
pub mod ids;
pub mod transform;

pub use affinity::Affinity;
pub use column_value::{ColumnValue, FromColumn};
pub use error::CoreError;
pub use ids::RecordId;
pub use transform::Transform;
