use crate::report::AnnualEnergyReport;
use anyhow::anyhow;
use csv::WriterBuilder;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::{self, File};
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub const CHART_LOCATION_KEY: &str = "forecast";
pub const SUMMARY_LOCATION_KEY: &str = "summary";

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Filesystem path for artifacts that must be written by path rather than
    /// through a writer, such as rendered images. `None` if the output has no
    /// filesystem location.
    fn path_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<Option<PathBuf>>;
    /// Whether this output can be considered a no-op and therefore that any code that only writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }

    fn location(&self, location_key: &str, file_extension: &str) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.directory_path)?;
        let file_name = formatx!(&self.file_template, location_key, file_extension)
            .map_err(|err| anyhow!("Invalid output file template: {err:?}"))?;
        Ok(self.directory_path.join(file_name))
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(BufWriter::new(File::create(
            self.location(location_key, file_extension)?,
        )?))
    }

    fn path_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        Ok(Some(self.location(location_key, file_extension)?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }

    fn path_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        <FileOutput as Output>::path_for_location_key(self, location_key, file_extension)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn path_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<Option<PathBuf>> {
        Ok(None)
    }

    fn is_noop(&self) -> bool {
        true
    }
}

/// Writes one CSV row per evaluated site.
pub fn write_summary_file(output: &impl Output, report: &AnnualEnergyReport) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key(SUMMARY_LOCATION_KEY, "csv")?;
    let mut writer = WriterBuilder::new().flexible(false).from_writer(writer);

    writer.write_record([
        "Site",
        "Annual energy",
        "Peak AC power",
        "Peak time (local)",
        "Degraded samples",
    ])?;
    writer.write_record(["", "[Wh]", "[W]", "", "[count]"])?;

    for (label, site_yield) in report.energies() {
        writer.write_record([
            label.to_string(),
            site_yield.annual_energy.to_string(),
            site_yield.peak_ac_power.to_string(),
            site_yield
                .peak_time
                .map(|time| time.to_rfc3339())
                .unwrap_or_default(),
            site_yield.degraded_samples.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SiteYield;
    use chrono::TimeZone;
    use chrono_tz::Etc::GMTMinus1;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn report() -> AnnualEnergyReport {
        let mut report = AnnualEnergyReport::default();
        report
            .insert(
                "Berlin",
                SiteYield {
                    annual_energy: 312_456.5,
                    peak_ac_power: 231.25,
                    peak_time: Some(GMTMinus1.with_ymd_and_hms(1990, 6, 3, 13, 0, 0).unwrap()),
                    degraded_samples: 0,
                },
            )
            .unwrap();
        report
            .insert(
                "Nowhere",
                SiteYield {
                    annual_energy: 0.,
                    peak_ac_power: 0.,
                    peak_time: None,
                    degraded_samples: 3,
                },
            )
            .unwrap();
        report
    }

    #[rstest]
    fn should_place_artifacts_using_template() {
        let directory = tempfile::tempdir().unwrap();
        let output = FileOutput::new(directory.path().join("img"), "pv_ac_{}.{}".to_string());

        let path = output
            .path_for_location_key(CHART_LOCATION_KEY, "png")
            .unwrap()
            .unwrap();

        assert_eq!(path, directory.path().join("img").join("pv_ac_forecast.png"));
        assert!(directory.path().join("img").is_dir());
    }

    #[rstest]
    fn should_write_summary_file(report: AnnualEnergyReport) {
        let directory = tempfile::tempdir().unwrap();
        let output = FileOutput::new(directory.path().to_path_buf(), "pv_ac_{}.{}".to_string());

        write_summary_file(&output, &report).unwrap();

        let contents = fs::read_to_string(directory.path().join("pv_ac_summary.csv")).unwrap();
        assert_eq!(
            contents,
            "Site,Annual energy,Peak AC power,Peak time (local),Degraded samples
,[Wh],[W],,[count]
Berlin,312456.5,231.25,1990-06-03T13:00:00+01:00,0
Nowhere,0,0,,3
"
        );
    }

    #[rstest]
    fn sink_output_should_discard_everything(report: AnnualEnergyReport) {
        let output = SinkOutput;

        assert!(output.is_noop());
        assert_eq!(output.path_for_location_key(CHART_LOCATION_KEY, "png").unwrap(), None);
        write_summary_file(&output, &report).unwrap();
    }
}
