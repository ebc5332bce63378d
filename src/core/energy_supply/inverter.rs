use crate::input::SandiaInverterParameters;

/// AC output of a grid-tied inverter, in W, using the Sandia inverter model.
///
/// Arguments:
/// * `v_dc` - DC voltage at the inverter input, in V
/// * `p_dc` - DC power at the inverter input, in W
/// * `inverter` - performance coefficients of the inverter
///
/// Output is clipped to the rated AC power. Below the self-consumption
/// threshold `Pso` the inverter is off and produces nothing; night-time tare
/// losses are not drawn, so the result is never negative. An undefined DC
/// operating point gives an undefined (NaN) AC output.
pub fn sandia(v_dc: f64, p_dc: f64, inverter: &SandiaInverterParameters) -> f64 {
    if !v_dc.is_finite() || !p_dc.is_finite() {
        return f64::NAN;
    }
    if p_dc < inverter.pso {
        return 0.;
    }

    let voltage_deviation = v_dc - inverter.vdco;
    let a = inverter.pdco * (1. + inverter.c1 * voltage_deviation);
    let b = inverter.pso * (1. + inverter.c2 * voltage_deviation);
    let c = inverter.c0 * (1. + inverter.c3 * voltage_deviation);

    let power_ac =
        (inverter.paco / (a - b) - c * (a - b)) * (p_dc - b) + c * (p_dc - b).powi(2);

    if power_ac.is_nan() {
        return power_ac;
    }

    power_ac.min(inverter.paco).max(0.)
}
