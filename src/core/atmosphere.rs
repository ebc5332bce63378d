use crate::core::units::SEA_LEVEL_PRESSURE;
use crate::input::AirMassModel;

/// Atmospheric pressure, in Pa, estimated from altitude above sea level, in m.
///
/// Extreme altitudes push the base of the power negative and the result is NaN;
/// callers treat that as a degraded value.
pub fn alt2pres(altitude: f64) -> f64 {
    100. * ((44331.514 - altitude) / 11880.516).powf(1. / 0.1902632)
}

/// Relative (not pressure-adjusted) air mass at sea level for the given solar
/// zenith angle, in degrees.
///
/// Returns `None` when the sun is below the horizon (zenith > 90 deg), where
/// air mass is undefined.
pub fn relative_air_mass(zenith: f64, model: AirMassModel) -> Option<f64> {
    if !zenith.is_finite() || zenith > 90. {
        return None;
    }

    let zenith_rad = zenith.to_radians();
    let cos_zenith = zenith_rad.cos();

    let air_mass = match model {
        AirMassModel::Simple => 1. / cos_zenith,
        AirMassModel::Kasten1966 => 1. / (cos_zenith + 0.15 * (93.885 - zenith).powf(-1.253)),
        AirMassModel::YoungIrvine1967 => {
            let sec_zenith = 1. / cos_zenith;
            sec_zenith * (1. - 0.0012 * (sec_zenith.powi(2) - 1.))
        }
        AirMassModel::KastenYoung1989 => {
            1. / (cos_zenith + 0.50572 * (6.07995 + (90. - zenith)).powf(-1.6364))
        }
        AirMassModel::Gueymard1993 => {
            1. / (cos_zenith + 0.00176759 * zenith * (94.37515 - zenith).powf(-1.21563))
        }
        AirMassModel::Young1994 => {
            (1.002432 * cos_zenith.powi(2) + 0.148386 * cos_zenith + 0.0096467)
                / (cos_zenith.powi(3)
                    + 0.149864 * cos_zenith.powi(2)
                    + 0.0102963 * cos_zenith
                    + 0.000303978)
        }
        AirMassModel::Pickering2002 => {
            let elevation = 90. - zenith;
            1. / (elevation + 244. / (165. + 47. * elevation.powf(1.1)))
                .to_radians()
                .sin()
        }
    };

    air_mass.is_finite().then_some(air_mass)
}

/// Air mass adjusted for site pressure (given in Pa).
pub fn absolute_air_mass(relative_air_mass: f64, pressure: f64) -> f64 {
    relative_air_mass * pressure / SEA_LEVEL_PRESSURE
}
