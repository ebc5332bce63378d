use crate::errors::WeatherError;
use crate::external_conditions::{ExternalConditions, WeatherRecord};
use crate::input::Site;
use crate::read_weather_file::weather_data_to_vec;
use chrono::{Datelike, NaiveDateTime};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const PVGIS_BASE_URL: &str = "https://re.jrc.ec.europa.eu/api/v5_2/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Typical meteorological year months are drawn from different years; they
/// are all placed in this year so the time index is monotonic.
const TMY_COERCE_YEAR: i32 = 1990;

/// Source of a weather series for a site. Implementations are shared between
/// the threads evaluating sites.
pub trait WeatherProvider: Send + Sync {
    fn fetch(&self, site: &Site) -> Result<ExternalConditions, WeatherError>;
}

impl<T: WeatherProvider + ?Sized> WeatherProvider for &T {
    fn fetch(&self, site: &Site) -> Result<ExternalConditions, WeatherError> {
        (**self).fetch(site)
    }
}

/// Fetches typical meteorological year data from the PVGIS web service.
#[derive(Debug)]
pub struct PvgisTmyProvider {
    client: Client,
    base_url: String,
}

impl PvgisTmyProvider {
    /// Returns a new provider against the public PVGIS service
    ///
    /// # Arguments
    ///
    /// * 'timeout' - limit on each request, including reading the response
    pub fn new(timeout: Duration) -> Result<Self, WeatherError> {
        Self::with_base_url(PVGIS_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl WeatherProvider for PvgisTmyProvider {
    fn fetch(&self, site: &Site) -> Result<ExternalConditions, WeatherError> {
        let url = format!("{}/tmy", self.base_url);
        info!(site = %site.label, %url, "Requesting typical meteorological year");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", site.latitude.to_string()),
                ("lon", site.longitude.to_string()),
                ("outputformat", "json".to_string()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let body = response.text()?;
        debug!(site = %site.label, bytes = body.len(), "Received PVGIS response");

        parse_pvgis_tmy(&body)
    }
}

#[derive(Deserialize)]
struct PvgisTmyResponse {
    outputs: PvgisTmyOutputs,
}

#[derive(Deserialize)]
struct PvgisTmyOutputs {
    tmy_hourly: Vec<PvgisTmyHour>,
}

#[derive(Deserialize)]
struct PvgisTmyHour {
    #[serde(rename = "time(UTC)")]
    time: String,
    #[serde(rename = "T2m")]
    temp_air: f64,
    #[serde(rename = "G(h)")]
    ghi: f64,
    #[serde(rename = "Gb(n)")]
    dni: f64,
    #[serde(rename = "Gd(h)")]
    dhi: f64,
    #[serde(rename = "WS10m")]
    wind_speed: f64,
}

impl TryFrom<PvgisTmyHour> for WeatherRecord {
    type Error = WeatherError;

    fn try_from(hour: PvgisTmyHour) -> Result<Self, Self::Error> {
        let time = NaiveDateTime::parse_from_str(&hour.time, "%Y%m%d:%H%M")
            .ok()
            .and_then(|time| time.with_year(TMY_COERCE_YEAR))
            .ok_or_else(|| WeatherError::Timestamp(hour.time.clone()))?
            .and_utc();

        Ok(WeatherRecord {
            time,
            ghi: hour.ghi,
            dni: hour.dni,
            dhi: hour.dhi,
            temp_air: hour.temp_air,
            wind_speed: hour.wind_speed,
        })
    }
}

/// Decodes a PVGIS TMY JSON document into a normalised weather series.
pub fn parse_pvgis_tmy(json: &str) -> Result<ExternalConditions, WeatherError> {
    let response: PvgisTmyResponse = serde_json::from_str(json)?;

    let records = response
        .outputs
        .tmy_hourly
        .into_iter()
        .map(WeatherRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    ExternalConditions::from_records(records)
}

/// Reads weather from `<directory>/<site label>.csv` files.
#[derive(Debug)]
pub struct CsvDirectoryProvider {
    directory_path: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(directory_path: PathBuf) -> Self {
        Self { directory_path }
    }

    pub fn path_for_site(&self, site: &Site) -> PathBuf {
        self.directory_path.join(format!("{}.csv", site.label))
    }
}

impl WeatherProvider for CsvDirectoryProvider {
    fn fetch(&self, site: &Site) -> Result<ExternalConditions, WeatherError> {
        let path = self.path_for_site(site);
        info!(site = %site.label, path = %path.display(), "Reading weather file");

        weather_data_to_vec(BufReader::new(File::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Etc::GMTMinus1;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;

    const PVGIS_TMY_EXCERPT: &str = r#"{
        "inputs": {"location": {"latitude": 52.5, "longitude": 13.4, "elevation": 34.0}},
        "outputs": {
            "months_selected": [{"month": 1, "year": 2007}],
            "tmy_hourly": [
                {"time(UTC)": "20070101:0000", "T2m": 3.1, "RH": 90.0, "G(h)": 0.0, "Gb(n)": 0.0, "Gd(h)": 0.0, "IR(h)": 300.0, "WS10m": 4.2, "WD10m": 240.0, "SP": 100500.0},
                {"time(UTC)": "20070101:0100", "T2m": 2.9, "RH": 91.0, "G(h)": 0.0, "Gb(n)": 0.0, "Gd(h)": 0.0, "IR(h)": 298.0, "WS10m": 4.0, "WD10m": 235.0, "SP": 100510.0},
                {"time(UTC)": "20070101:0200", "T2m": 2.7, "RH": 92.0, "G(h)": 12.5, "Gb(n)": 3.0, "Gd(h)": 11.0, "IR(h)": 297.0, "WS10m": 3.8, "WD10m": 230.0, "SP": 100520.0}
            ]
        },
        "meta": {}
    }"#;

    #[fixture]
    fn berlin() -> Site {
        Site::new(52.5, 13.4, "Berlin", 34., GMTMinus1)
    }

    #[rstest]
    fn should_map_pvgis_variables_and_coerce_year() {
        let conditions = parse_pvgis_tmy(PVGIS_TMY_EXCERPT).unwrap();

        assert_eq!(conditions.len(), 3);
        assert_eq!(
            conditions.timestamps()[0],
            Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()
        );
        assert_relative_eq!(conditions.air_temps()[1], 2.9);
        assert_relative_eq!(conditions.global_horizontal_irradiances()[2], 12.5);
        assert_relative_eq!(conditions.direct_normal_irradiances()[2], 3.);
        assert_relative_eq!(conditions.diffuse_horizontal_irradiances()[2], 11.);
        assert_relative_eq!(conditions.wind_speeds()[0], 4.2);
    }

    #[rstest]
    fn should_reject_malformed_pvgis_timestamp() {
        let json = PVGIS_TMY_EXCERPT.replace("20070101:0100", "2007-01-01 01:00");
        assert!(matches!(
            parse_pvgis_tmy(&json),
            Err(WeatherError::Timestamp(time)) if time == "2007-01-01 01:00"
        ));
    }

    #[rstest]
    fn should_reject_pvgis_error_document() {
        let json = r#"{"message": "Location over the sea. Please, select another location", "status": 400}"#;
        assert!(matches!(parse_pvgis_tmy(json), Err(WeatherError::Decode(_))));
    }

    #[rstest]
    fn should_read_weather_for_site_from_directory(berlin: Site) {
        let directory = tempfile::tempdir().unwrap();
        fs::write(
            directory.path().join("Berlin.csv"),
            "time,ghi,dni,dhi,temp_air,wind_speed
1990-06-01T10:00:00Z,600,500,150,20,3
1990-06-01T10:30:00Z,620,520,150,21,3
1990-06-01T11:00:00Z,640,540,150,22,3
",
        )
        .unwrap();
        let provider = CsvDirectoryProvider::new(directory.path().to_path_buf());

        let conditions = provider.fetch(&berlin).unwrap();

        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions.simulation_time().step_in_hours(), 0.5);
    }

    #[rstest]
    fn should_fail_when_site_file_is_missing(berlin: Site) {
        let directory = tempfile::tempdir().unwrap();
        let provider = CsvDirectoryProvider::new(directory.path().to_path_buf());

        assert!(matches!(provider.fetch(&berlin), Err(WeatherError::Io(_))));
    }

    #[rstest]
    fn should_strip_trailing_slash_from_base_url() {
        let provider =
            PvgisTmyProvider::with_base_url("http://localhost:1/api/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.base_url, "http://localhost:1/api");
    }
}
