#![allow(clippy::too_many_arguments)]

pub mod core;
pub mod errors;
pub mod external_conditions;
pub mod input;
pub mod output;
pub mod read_weather_file;
pub mod render;
pub mod report;
pub mod simulation_time;
pub mod weather_provider;


use crate::core::pv_system::PvSystem;
use crate::errors::{PvYieldError, ReportError, SiteError};
use crate::input::{ingest_for_processing, ProjectInput, Site};
use crate::output::{write_summary_file, Output, CHART_LOCATION_KEY};
use crate::render::render_report;
pub use crate::report::AnnualEnergyReport;
use crate::report::SiteYield;
use crate::weather_provider::WeatherProvider;
use bitflags::bitflags;
use rayon::prelude::*;
use std::io::Read;
use tracing::{error, info};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ProjectFlags: u32 {
        /// evaluate sites one after another on the calling thread
        const SEQUENTIAL = 0b1;
        const WRITE_SUMMARY = 0b10;
    }
}

pub fn run_project(
    input: impl Read,
    provider: &impl WeatherProvider,
    output: impl Output,
    flags: &ProjectFlags,
) -> Result<AnnualEnergyReport, PvYieldError> {
    let input = ingest_for_processing(input)?;

    run_project_from_input(&input, provider, output, flags)
}

/// As `run_project`, for a project that has already been deserialised.
pub fn run_project_from_input(
    input: &ProjectInput,
    provider: &impl WeatherProvider,
    output: impl Output,
    flags: &ProjectFlags,
) -> Result<AnnualEnergyReport, PvYieldError> {
    input.validate()?;

    info!(
        sites = input.sites.len(),
        sky_diffuse_model = %input.models.sky_diffuse_model,
        extra_radiation_method = %input.models.extra_radiation_method,
        airmass_model = %input.models.airmass_model,
        "Starting annual energy calculation"
    );

    let report = calculate_annual_energy(input, provider, flags)?;

    write_outputs(&output, &report, flags)?;

    Ok(report)
}

/// Evaluates every site of the catalog. A site whose weather or model chain
/// fails is recorded as a failure and the remaining sites are still evaluated.
pub fn calculate_annual_energy(
    input: &ProjectInput,
    provider: &impl WeatherProvider,
    flags: &ProjectFlags,
) -> Result<AnnualEnergyReport, ReportError> {
    // collecting into a Vec keeps catalog order in both cases
    let results: Vec<(&Site, Result<SiteYield, SiteError>)> =
        if flags.contains(ProjectFlags::SEQUENTIAL) {
            input
                .sites
                .iter()
                .map(|site| (site, evaluate_site(site, input, provider)))
                .collect()
        } else {
            input
                .sites
                .par_iter()
                .map(|site| (site, evaluate_site(site, input, provider)))
                .collect()
        };

    let mut report = AnnualEnergyReport::default();

    for (site, result) in results {
        match result {
            Ok(site_yield) => {
                info!(
                    site = %site.label,
                    annual_energy = site_yield.annual_energy,
                    "Site evaluated"
                );
                report.insert(&site.label, site_yield)?;
            }
            Err(err) => {
                error!(site = %site.label, error = %err, "Site could not be evaluated");
                report.insert_failure(&site.label, err.to_string())?;
            }
        }
    }

    Ok(report)
}

/// Fetches the weather for a site and runs the model chain over it.
pub fn evaluate_site(
    site: &Site,
    input: &ProjectInput,
    provider: &impl WeatherProvider,
) -> Result<SiteYield, SiteError> {
    info!(site = %site.label, "Evaluating site");

    let weather = provider.fetch(site)?;
    let evaluation = PvSystem::new(
        site,
        input.surface_azimuth,
        &input.equipment,
        &input.models,
    )
    .evaluate(&weather)?;

    Ok(SiteYield::from_evaluation(&evaluation, site.timezone))
}

fn write_outputs(
    output: &impl Output,
    report: &AnnualEnergyReport,
    flags: &ProjectFlags,
) -> Result<(), PvYieldError> {
    if output.is_noop() {
        return Ok(());
    }

    if let Some(path) = output
        .path_for_location_key(CHART_LOCATION_KEY, "png")
        .map_err(PvYieldError::Output)?
    {
        render_report(report, &path)?;
        info!(path = %path.display(), "Annual energy chart written");
    }

    if flags.contains(ProjectFlags::WRITE_SUMMARY) {
        write_summary_file(output, report).map_err(PvYieldError::Output)?;
    }

    Ok(())
}
