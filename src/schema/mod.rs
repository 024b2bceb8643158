pub mod arrow;
pub mod build;
pub mod key;
pub mod types;

pub use arrow::{batch_to_json, star_batches};
pub use build::build;
pub use key::geo_key;
pub use types::{FactRow, GeoRow, StarSchema, TimeRow};
