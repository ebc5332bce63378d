use crate::core::units::pascals_to_hectopascals;
use crate::errors::ModelError;
use chrono::{DateTime, Datelike, Utc};
use solar_positioning::{spa, time::DeltaT, RefractionCorrection};

/// Sun position per timestamp, in degrees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolarPositionSeries {
    /// zenith angle corrected for atmospheric refraction
    pub apparent_zenith: Vec<f64>,
    /// azimuth, clockwise from north
    pub azimuth: Vec<f64>,
}

/// Calculates the apparent solar position with NREL SPA for every timestamp.
///
/// Arguments:
/// * `timestamps` - UTC time index
/// * `latitude`, `longitude` - observer location, in degrees
/// * `altitude` - observer altitude, in m
/// * `pressure` - local atmospheric pressure, in Pa. A non-finite pressure
///                disables the refraction correction.
/// * `air_temps` - air temperature per timestamp, in deg C
pub fn get_solarposition(
    timestamps: &[DateTime<Utc>],
    latitude: f64,
    longitude: f64,
    altitude: f64,
    pressure: f64,
    air_temps: &[f64],
) -> Result<SolarPositionSeries, ModelError> {
    if air_temps.len() != timestamps.len() {
        return Err(ModelError::SeriesLength {
            series: "air temperature",
            expected: timestamps.len(),
            found: air_temps.len(),
        });
    }

    let mut positions = SolarPositionSeries {
        apparent_zenith: Vec::with_capacity(timestamps.len()),
        azimuth: Vec::with_capacity(timestamps.len()),
    };

    for (time, &temp_air) in timestamps.iter().zip(air_temps) {
        let delta_t = DeltaT::estimate_from_date(time.year(), time.month())?;
        let refraction = if pressure.is_finite() {
            Some(RefractionCorrection::new(
                pascals_to_hectopascals(pressure),
                temp_air,
            )?)
        } else {
            None
        };

        let position =
            spa::solar_position(*time, latitude, longitude, altitude, delta_t, refraction)?;
        positions.apparent_zenith.push(position.zenith_angle());
        positions.azimuth.push(position.azimuth());
    }

    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::atmosphere::alt2pres;
    use chrono::TimeZone;
    use rstest::*;

    #[fixture]
    fn tucson_solstice() -> Vec<DateTime<Utc>> {
        vec![
            // local midnight
            Utc.with_ymd_and_hms(1990, 6, 21, 7, 0, 0).unwrap(),
            // close to solar noon
            Utc.with_ymd_and_hms(1990, 6, 21, 19, 25, 0).unwrap(),
        ]
    }

    #[rstest]
    fn should_place_sun_near_zenith_at_summer_noon_in_tucson(tucson_solstice: Vec<DateTime<Utc>>) {
        let positions =
            get_solarposition(&tucson_solstice, 32.2, -111., 700., alt2pres(700.), &[20., 35.])
                .unwrap();

        assert!(positions.apparent_zenith[0] > 90.);
        // latitude minus solar declination at the solstice
        assert!(
            (positions.apparent_zenith[1] - 8.8).abs() < 0.5,
            "{}",
            positions.apparent_zenith[1]
        );
        assert!((0. ..360.).contains(&positions.azimuth[1]));
    }

    #[rstest]
    fn should_skip_refraction_when_pressure_is_undefined(tucson_solstice: Vec<DateTime<Utc>>) {
        let refracted =
            get_solarposition(&tucson_solstice, 32.2, -111., 700., alt2pres(700.), &[20., 35.])
                .unwrap();
        let unrefracted =
            get_solarposition(&tucson_solstice, 32.2, -111., 700., f64::NAN, &[20., 35.])
                .unwrap();

        assert!(unrefracted.apparent_zenith[1] >= refracted.apparent_zenith[1]);
        assert!(unrefracted.apparent_zenith.iter().all(|z| z.is_finite()));
    }

    #[rstest]
    fn should_reject_temperature_series_of_wrong_length(tucson_solstice: Vec<DateTime<Utc>>) {
        assert!(matches!(
            get_solarposition(&tucson_solstice, 32.2, -111., 700., alt2pres(700.), &[20.]),
            Err(ModelError::SeriesLength {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }
}
