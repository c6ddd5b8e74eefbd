pub mod context;
pub mod nrf;
pub mod sbi;

pub use context::*;
pub use nrf::*;
pub use sbi::*;
