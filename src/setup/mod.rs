//! First-boot setup handling.

pub mod first_boot;

pub use first_boot::{
    FirstBootBypass, ProvisioningState, LICENSE_CONNECTION_PATH, SETUP_STATUS_PATH,
};
