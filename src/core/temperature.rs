use crate::core::units::REFERENCE_IRRADIANCE;
use crate::input::SapmTemperatureParameters;

/// Sandia module back-surface temperature, in deg C.
pub fn sapm_module(poa_global: f64, temp_air: f64, wind_speed: f64, a: f64, b: f64) -> f64 {
    poa_global * (a + b * wind_speed).exp() + temp_air
}

/// Sandia cell temperature, in deg C.
///
/// Arguments:
/// * `poa_global` - total irradiance in the plane of array, in W/m2
/// * `temp_air` - ambient air temperature, in deg C
/// * `wind_speed` - wind speed at 10m, in m/s
/// * `parameters` - empirical coefficients for the mounting configuration
pub fn sapm_cell(
    poa_global: f64,
    temp_air: f64,
    wind_speed: f64,
    parameters: &SapmTemperatureParameters,
) -> f64 {
    let module_temperature = sapm_module(
        poa_global,
        temp_air,
        wind_speed,
        parameters.a,
        parameters.b,
    );

    module_temperature + poa_global / REFERENCE_IRRADIANCE * parameters.delta_t
}
