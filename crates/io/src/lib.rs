// File I/O operations

pub mod error;
pub mod legacy;
pub mod native;
pub mod store;

pub use error::{CodecError, StoreError};
pub use native::{deserialize, from_bytes, load, load_into, serialize, to_bytes, ChartDocument};

/// Conventional file extension for saved charts
pub const CHART_EXTENSION: &str = "chart";
