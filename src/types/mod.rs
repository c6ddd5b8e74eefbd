pub mod app_state;
pub mod error;
pub mod nf_profile;
pub mod nrf;

pub use app_state::*;
pub use error::*;
pub use nf_profile::*;
pub use nrf::*;
