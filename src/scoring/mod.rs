pub mod scorer;
pub mod weights;

pub use scorer::{PerformanceScore, PerformanceScorer};
pub use weights::{weights_for, Stat, StatKind};

/// Upper end of the normalized performance scale.
pub const MAX_PERFORMANCE: f64 = 10.0;
