pub mod factors;
pub mod raw;
pub mod value;

pub use factors::{FactorKey, ModelFactors};
pub use raw::{RawKey, RawMetricSet};
pub use value::Metric;
