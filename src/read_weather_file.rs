use crate::errors::WeatherError;
use crate::external_conditions::{ExternalConditions, WeatherRecord};
use csv::ReaderBuilder as CsvReaderBuilder;
use std::io::Read;

/// Reads a normalised weather CSV with the header
/// `time,ghi,dni,dhi,temp_air,wind_speed`, where `time` is RFC 3339.
pub fn weather_data_to_vec(file: impl Read) -> Result<ExternalConditions, WeatherError> {
    let mut reader = CsvReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let records = reader
        .deserialize::<WeatherRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    ExternalConditions::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TimeAxisError;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn should_read_normalised_weather_file() {
        let file = "time,ghi,dni,dhi,temp_air,wind_speed
1990-01-01T11:00:00Z,250.5,400,90,3.5,4.1
1990-01-01T12:00:00Z,300,450,95,4.0,3.9
1990-01-01T13:00:00+00:00,280,420,92,4.2,3.7
";
        let conditions = weather_data_to_vec(file.as_bytes()).unwrap();

        assert_eq!(conditions.len(), 3);
        assert_relative_eq!(conditions.global_horizontal_irradiances()[0], 250.5);
        assert_relative_eq!(conditions.direct_normal_irradiances()[1], 450.);
        assert_relative_eq!(conditions.diffuse_horizontal_irradiances()[2], 92.);
        assert_relative_eq!(conditions.air_temps()[1], 4.0);
        assert_relative_eq!(conditions.wind_speeds()[2], 3.7);
        assert_relative_eq!(conditions.simulation_time().step_in_hours(), 1.);
    }

    #[rstest]
    fn should_fail_on_unparseable_values() {
        let file = "time,ghi,dni,dhi,temp_air,wind_speed
1990-01-01T11:00:00Z,lots,400,90,3.5,4.1
";
        assert!(matches!(
            weather_data_to_vec(file.as_bytes()),
            Err(WeatherError::Csv(_))
        ));
    }

    #[rstest]
    fn should_fail_on_out_of_order_rows() {
        let file = "time,ghi,dni,dhi,temp_air,wind_speed
1990-01-01T12:00:00Z,0,0,0,3.5,4.1
1990-01-01T11:00:00Z,0,0,0,3.5,4.1
";
        assert!(matches!(
            weather_data_to_vec(file.as_bytes()),
            Err(WeatherError::TimeAxis(TimeAxisError::NotIncreasing { index: 1 }))
        ));
    }
}
