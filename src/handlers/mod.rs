pub mod fallback;
pub mod health;
pub mod metrics;

pub use fallback::*;
pub use health::*;
pub use metrics::*;
