//! Utility modules
//!
//! Helper functions used throughout the codebase.

pub mod units;

// Re-export commonly used items
pub use units::{
    years_to_seconds, seconds_to_years,
    pa_to_mpa,
    celsius_to_kelvin, kelvin_to_celsius,
    m2_to_millidarcy,
};
