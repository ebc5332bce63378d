pub const SECONDS_PER_HOUR: u32 = 3_600;

/// Standard sea-level atmospheric pressure, in Pa
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.;
pub const PASCALS_PER_HECTOPASCAL: f64 = 100.;

/// Irradiance at standard test conditions, in W/m2
pub const REFERENCE_IRRADIANCE: f64 = 1_000.;
/// Cell temperature at standard test conditions, in deg C
pub const REFERENCE_CELL_TEMPERATURE: f64 = 25.;

pub const ELEMENTARY_CHARGE: f64 = 1.60218e-19; // C
pub const BOLTZMANN_CONSTANT: f64 = 1.38066e-23; // J/K

pub(crate) fn celsius_to_kelvin(temp_c: f64) -> f64 {
    temp_c + 273.15
}

pub(crate) fn pascals_to_hectopascals(pressure: f64) -> f64 {
    pressure / PASCALS_PER_HECTOPASCAL
}
