use crate::core::units::{
    celsius_to_kelvin, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, REFERENCE_CELL_TEMPERATURE,
    REFERENCE_IRRADIANCE,
};
use crate::input::SapmModuleParameters;

// This module contains the Sandia array performance model (SAPM) for a
// photovoltaic module.

/// Evaluates a polynomial whose coefficients are given in ascending order.
fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0., |acc, coefficient| acc * x + coefficient)
}

/// Spectral mismatch factor F1 for the given absolute air mass.
///
/// An undefined air mass (sun below the horizon) gives a factor of 0.
pub fn sapm_spectral_loss(airmass_absolute: Option<f64>, module: &SapmModuleParameters) -> f64 {
    match airmass_absolute {
        Some(airmass) if airmass.is_finite() => {
            polyval(&module.spectral_coefficients, airmass).max(0.)
        }
        _ => 0.,
    }
}

/// Incidence angle modifier F2 for an angle of incidence in degrees.
///
/// Beam arriving from behind the plane (aoi >= 90) or at a negative angle
/// contributes nothing.
pub fn sapm_aoi_loss(aoi: f64, module: &SapmModuleParameters) -> f64 {
    if !(0. ..90.).contains(&aoi) {
        return 0.;
    }
    polyval(&module.incidence_coefficients, aoi).max(0.)
}

/// Irradiance usable by the cells, in W/m2.
///
/// Arguments:
/// * `poa_direct` - beam irradiance in the plane of array, in W/m2
/// * `poa_diffuse` - diffuse irradiance in the plane of array, in W/m2
/// * `airmass_absolute` - pressure-adjusted air mass, if the sun is up
/// * `aoi` - angle of incidence, in degrees
pub fn sapm_effective_irradiance(
    poa_direct: f64,
    poa_diffuse: f64,
    airmass_absolute: Option<f64>,
    aoi: f64,
    module: &SapmModuleParameters,
) -> f64 {
    let f1 = sapm_spectral_loss(airmass_absolute, module);
    let f2 = sapm_aoi_loss(aoi, module);

    f1 * (poa_direct * f2 + module.fd * poa_diffuse)
}

/// Five points on the module I-V curve
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SapmOutput {
    /// short circuit current, in A
    pub i_sc: f64,
    /// current at the maximum-power point, in A
    pub i_mp: f64,
    /// open circuit voltage, in V
    pub v_oc: f64,
    /// voltage at the maximum-power point, in V
    pub v_mp: f64,
    /// power at the maximum-power point, in W
    pub p_mp: f64,
    /// current at V = 0.5 Voc, in A
    pub i_x: f64,
    /// current at V = 0.5 (Voc + Vmp), in A
    pub i_xx: f64,
}

/// DC operating point of one module.
///
/// Effective irradiance of zero or below yields an all-zero operating point.
/// Non-finite inputs propagate so the caller can detect them.
pub fn sapm(
    effective_irradiance: f64,
    temp_cell: f64,
    module: &SapmModuleParameters,
) -> SapmOutput {
    if effective_irradiance <= 0. {
        return SapmOutput::default();
    }
    if !temp_cell.is_finite() {
        return SapmOutput {
            i_sc: f64::NAN,
            i_mp: f64::NAN,
            v_oc: f64::NAN,
            v_mp: f64::NAN,
            p_mp: f64::NAN,
            i_x: f64::NAN,
            i_xx: f64::NAN,
        };
    }

    let ee = effective_irradiance / REFERENCE_IRRADIANCE;
    let delta_temp = temp_cell - REFERENCE_CELL_TEMPERATURE;
    let cells_in_series = module.cells_in_series as f64;

    let beta_vmp = module.beta_vmp0 + module.m_beta_vmp * (1. - ee);
    let beta_voc = module.beta_voc0 + module.m_beta_voc * (1. - ee);

    // thermal voltage of the module diode
    let delta = module.n * BOLTZMANN_CONSTANT * celsius_to_kelvin(temp_cell) / ELEMENTARY_CHARGE;
    let log_ee = ee.ln();

    let i_sc = module.isc0 * ee * (1. + module.alpha_isc * delta_temp);
    let i_mp = module.imp0
        * (module.c0 * ee + module.c1 * ee.powi(2))
        * (1. + module.alpha_imp * delta_temp);
    let v_oc = (module.voc0 + cells_in_series * delta * log_ee + beta_voc * delta_temp).max(0.);
    let v_mp = (module.vmp0
        + module.c2 * cells_in_series * delta * log_ee
        + module.c3 * cells_in_series * (delta * log_ee).powi(2)
        + beta_vmp * delta_temp)
        .max(0.);
    let i_x = module.ix0
        * (module.c4 * ee + module.c5 * ee.powi(2))
        * (1. + module.alpha_isc * delta_temp);
    let i_xx = module.ixx0
        * (module.c6 * ee + module.c7 * ee.powi(2))
        * (1. + module.alpha_isc * delta_temp);

    SapmOutput {
        i_sc,
        i_mp,
        v_oc,
        v_mp,
        p_mp: i_mp * v_mp,
        i_x,
        i_xx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn module() -> SapmModuleParameters {
        SapmModuleParameters::default()
    }

    #[rstest]
    fn should_evaluate_polynomial_in_ascending_order() {
        assert_eq!(polyval(&[1., 2., 3.], 2.), 17.);
        assert_eq!(polyval(&[], 2.), 0.);
    }

    #[rstest]
    fn should_calculate_spectral_loss(module: SapmModuleParameters) {
        assert_relative_eq!(
            sapm_spectral_loss(Some(1.5), &module),
            1.000287,
            max_relative = 1e-6
        );
        assert_eq!(sapm_spectral_loss(None, &module), 0.);
        assert_eq!(sapm_spectral_loss(Some(f64::INFINITY), &module), 0.);
    }

    #[rstest]
    #[case(0., 1.)]
    #[case(60., 0.956464)]
    #[case(89., 0.101283)]
    #[case(90., 0.)]
    #[case(135., 0.)]
    #[case(-1., 0.)]
    fn should_calculate_aoi_loss(
        module: SapmModuleParameters,
        #[case] aoi: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(sapm_aoi_loss(aoi, &module), expected, max_relative = 1e-5);
    }

    #[rstest]
    fn effective_irradiance_should_be_zero_at_night(module: SapmModuleParameters) {
        assert_eq!(sapm_effective_irradiance(0., 40., None, 120., &module), 0.);
    }

    #[rstest]
    fn should_combine_beam_and_diffuse_into_effective_irradiance(module: SapmModuleParameters) {
        let expected = sapm_spectral_loss(Some(1.5), &module)
            * (800. * sapm_aoi_loss(20., &module) + 120.);
        assert_relative_eq!(
            sapm_effective_irradiance(800., 120., Some(1.5), 20., &module),
            expected
        );
    }

    #[rstest]
    fn should_reproduce_rated_values_at_standard_test_conditions(module: SapmModuleParameters) {
        let output = sapm(1000., 25., &module);

        assert_relative_eq!(output.i_sc, module.isc0);
        assert_relative_eq!(output.v_oc, module.voc0);
        assert_relative_eq!(output.v_mp, module.vmp0);
        assert_relative_eq!(output.i_mp, module.imp0, max_relative = 1e-6);
        assert_relative_eq!(output.p_mp, 219.6568, max_relative = 1e-6);
    }

    #[rstest]
    fn should_calculate_operating_point_at_half_irradiance(module: SapmModuleParameters) {
        let output = sapm(500., 40., &module);

        assert_relative_eq!(output.i_sc, 2.560734, max_relative = 1e-5);
        assert_relative_eq!(output.i_mp, 2.293950, max_relative = 1e-5);
        assert_relative_eq!(output.v_oc, 53.48673, max_relative = 1e-5);
        assert_relative_eq!(output.v_mp, 43.60038, max_relative = 1e-5);
        assert_relative_eq!(output.p_mp, 100.0171, max_relative = 1e-5);
    }

    #[rstest]
    #[case(0.)]
    #[case(-5.)]
    fn should_give_exactly_zero_without_effective_irradiance(
        module: SapmModuleParameters,
        #[case] effective_irradiance: f64,
    ) {
        assert_eq!(sapm(effective_irradiance, 25., &module), SapmOutput::default());
    }

    #[rstest]
    fn should_stay_finite_for_tiny_irradiance(module: SapmModuleParameters) {
        let output = sapm(1e-9, 10., &module);
        assert!(output.p_mp.is_finite());
        assert!(output.v_mp >= 0.);
        assert!(output.v_oc >= 0.);
    }

    #[rstest]
    fn should_propagate_undefined_irradiance(module: SapmModuleParameters) {
        assert!(sapm(f64::NAN, 25., &module).p_mp.is_nan());
    }

    #[rstest]
    #[case(f64::INFINITY)]
    #[case(f64::NAN)]
    fn should_be_undefined_for_undefined_cell_temperature(
        module: SapmModuleParameters,
        #[case] temp_cell: f64,
    ) {
        let output = sapm(800., temp_cell, &module);
        assert!(output.p_mp.is_nan());
        assert!(output.v_mp.is_nan());
    }
}
