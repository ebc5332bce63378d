use crate::errors::WeatherError;
use crate::simulation_time::SimulationTime;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One row of a normalised weather series.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct WeatherRecord {
    pub time: DateTime<Utc>,
    /// global horizontal irradiance, in W/m2
    pub ghi: f64,
    /// direct normal irradiance, in W/m2
    pub dni: f64,
    /// diffuse horizontal irradiance, in W/m2
    pub dhi: f64,
    /// air temperature at 2m, in deg C
    pub temp_air: f64,
    /// wind speed at 10m, in m/s
    pub wind_speed: f64,
}

/// Weather over one time axis for one site, held column-wise.
#[derive(Clone, Debug)]
pub struct ExternalConditions {
    simulation_time: SimulationTime,
    global_horizontal_irradiances: Vec<f64>,
    direct_normal_irradiances: Vec<f64>,
    diffuse_horizontal_irradiances: Vec<f64>,
    air_temps: Vec<f64>,
    wind_speeds: Vec<f64>,
}

/// Arguments:
/// * `timestamps` - UTC time index, strictly increasing with a uniform step
/// * `global_horizontal_irradiances` - GHI in W/m2 (one entry per timestamp)
/// * `direct_normal_irradiances` - DNI in W/m2 (one entry per timestamp)
/// * `diffuse_horizontal_irradiances` - DHI in W/m2 (one entry per timestamp)
/// * `air_temps` - air temperatures in deg C (one entry per timestamp)
/// * `wind_speeds` - wind speeds in m/s (one entry per timestamp)
impl ExternalConditions {
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        global_horizontal_irradiances: Vec<f64>,
        direct_normal_irradiances: Vec<f64>,
        diffuse_horizontal_irradiances: Vec<f64>,
        air_temps: Vec<f64>,
        wind_speeds: Vec<f64>,
    ) -> Result<Self, WeatherError> {
        let expected = timestamps.len();
        for (column, values) in [
            ("ghi", &global_horizontal_irradiances),
            ("dni", &direct_normal_irradiances),
            ("dhi", &diffuse_horizontal_irradiances),
            ("temp_air", &air_temps),
            ("wind_speed", &wind_speeds),
        ] {
            if values.len() != expected {
                return Err(WeatherError::ColumnLength {
                    column,
                    expected,
                    found: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|value| !value.is_finite()) {
                return Err(WeatherError::NonFinite { column, index });
            }
        }

        Ok(Self {
            simulation_time: SimulationTime::new(timestamps)?,
            global_horizontal_irradiances,
            direct_normal_irradiances,
            diffuse_horizontal_irradiances,
            air_temps,
            wind_speeds,
        })
    }

    pub fn from_records(records: impl IntoIterator<Item = WeatherRecord>) -> Result<Self, WeatherError> {
        let records = records.into_iter().collect::<Vec<_>>();

        Self::new(
            records.iter().map(|record| record.time).collect(),
            records.iter().map(|record| record.ghi).collect(),
            records.iter().map(|record| record.dni).collect(),
            records.iter().map(|record| record.dhi).collect(),
            records.iter().map(|record| record.temp_air).collect(),
            records.iter().map(|record| record.wind_speed).collect(),
        )
    }

    pub fn simulation_time(&self) -> &SimulationTime {
        &self.simulation_time
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        self.simulation_time.timestamps()
    }

    pub fn len(&self) -> usize {
        self.simulation_time.total_steps()
    }

    pub fn global_horizontal_irradiances(&self) -> &[f64] {
        &self.global_horizontal_irradiances
    }

    pub fn direct_normal_irradiances(&self) -> &[f64] {
        &self.direct_normal_irradiances
    }

    pub fn diffuse_horizontal_irradiances(&self) -> &[f64] {
        &self.diffuse_horizontal_irradiances
    }

    pub fn air_temps(&self) -> &[f64] {
        &self.air_temps
    }

    pub fn wind_speeds(&self) -> &[f64] {
        &self.wind_speeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TimeAxisError;
    use chrono::{TimeDelta, TimeZone};
    use rstest::*;

    #[fixture]
    fn records() -> Vec<WeatherRecord> {
        let start = Utc.with_ymd_and_hms(1990, 7, 1, 10, 0, 0).unwrap();
        (0..3)
            .map(|i| WeatherRecord {
                time: start + TimeDelta::hours(i),
                ghi: 600. + i as f64,
                dni: 700.,
                dhi: 100.,
                temp_air: 25.,
                wind_speed: 2.,
            })
            .collect()
    }

    #[rstest]
    fn should_build_columns_from_records(records: Vec<WeatherRecord>) {
        let conditions = ExternalConditions::from_records(records.clone()).unwrap();

        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions.global_horizontal_irradiances(), &[600., 601., 602.]);
        assert_eq!(conditions.direct_normal_irradiances(), &[700.; 3]);
        assert_eq!(conditions.diffuse_horizontal_irradiances(), &[100.; 3]);
        assert_eq!(conditions.air_temps(), &[25.; 3]);
        assert_eq!(conditions.wind_speeds(), &[2.; 3]);
        assert_eq!(conditions.timestamps()[2], records[2].time);
        assert_eq!(conditions.simulation_time().step_in_hours(), 1.);
    }

    #[rstest]
    fn should_reject_column_of_wrong_length(records: Vec<WeatherRecord>) {
        let timestamps = records.iter().map(|r| r.time).collect();
        let result = ExternalConditions::new(
            timestamps,
            vec![0.; 3],
            vec![0.; 3],
            vec![0.; 2],
            vec![0.; 3],
            vec![0.; 3],
        );

        assert!(matches!(
            result,
            Err(WeatherError::ColumnLength {
                column: "dhi",
                expected: 3,
                found: 2
            })
        ));
    }

    #[rstest]
    fn should_reject_non_finite_values(mut records: Vec<WeatherRecord>) {
        records[1].temp_air = f64::NAN;

        assert!(matches!(
            ExternalConditions::from_records(records),
            Err(WeatherError::NonFinite {
                column: "temp_air",
                index: 1
            })
        ));
    }

    #[rstest]
    fn should_reject_series_with_gap(mut records: Vec<WeatherRecord>) {
        records[2].time += TimeDelta::hours(1);

        assert!(matches!(
            ExternalConditions::from_records(records),
            Err(WeatherError::TimeAxis(TimeAxisError::NonUniformStep { .. }))
        ));
    }

    #[rstest]
    fn should_reject_empty_series() {
        assert!(matches!(
            ExternalConditions::from_records(vec![]),
            Err(WeatherError::TimeAxis(TimeAxisError::TooShort(0)))
        ));
    }
}
