//! Unit conversion utilities for flow and transport runs
//!
//! Everything inside the crate is SI (s, m, Pa, K). These helpers convert
//! the units people write in configuration files and read in logs.

// ============================================================================
// Time Conversions
// ============================================================================

/// Seconds per day
pub const SECONDS_PER_DAY: f64 = 24.0 * 3600.0;

/// Seconds per year (365.25 days accounting for leap years)
pub const SECONDS_PER_YEAR: f64 = 365.25 * SECONDS_PER_DAY;

/// Convert years to seconds
///
/// # Examples
/// ```
/// use fracflow::utils::units::years_to_seconds;
/// let end_time = years_to_seconds(10.0);
/// assert!(end_time > 3.0e8);
/// ```
#[inline]
pub fn years_to_seconds(years: f64) -> f64 {
    years * SECONDS_PER_YEAR
}

/// Convert seconds to years
#[inline]
pub fn seconds_to_years(seconds: f64) -> f64 {
    seconds / SECONDS_PER_YEAR
}

// ============================================================================
// Pressure Conversions
// ============================================================================

/// Pascals to megapascals conversion factor
pub const PA_TO_MPA: f64 = 1e-6;

/// Convert pressure from Pa to MPa
#[inline]
pub fn pa_to_mpa(pa: f64) -> f64 {
    pa * PA_TO_MPA
}

// ============================================================================
// Temperature Conversions
// ============================================================================

/// 0 °C in kelvin
pub const ZERO_CELSIUS: f64 = 273.15;

#[inline]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + ZERO_CELSIUS
}

#[inline]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - ZERO_CELSIUS
}

// ============================================================================
// Permeability Conversions
// ============================================================================

/// One darcy in m²
pub const DARCY: f64 = 9.869_233e-13;

/// Convert permeability from m² to millidarcy
#[inline]
pub fn m2_to_millidarcy(k: f64) -> f64 {
    k / DARCY * 1e3
}
