extern crate pvyield;

use anyhow::Context;
use clap::Parser;
use pvyield::input::{
    ingest_for_processing, AirMassModel, ExtraRadiationMethod, ProjectInput, SkyDiffuseModel,
};
use pvyield::output::FileOutput;
use pvyield::weather_provider::{
    CsvDirectoryProvider, PvgisTmyProvider, WeatherProvider, DEFAULT_TIMEOUT_SECS,
};
use pvyield::{run_project_from_input, AnnualEnergyReport, ProjectFlags};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct PvYieldArgs {
    #[arg(
        long,
        help = "Path to project input in .json format; the four reference sites are used if omitted"
    )]
    input: Option<PathBuf>,
    #[arg(
        long,
        help = "Directory of <site label>.csv weather files to use instead of PVGIS"
    )]
    weather_dir: Option<PathBuf>,
    #[arg(long, default_value = "img", help = "Directory to write artifacts to")]
    output_dir: PathBuf,
    #[arg(
        long,
        default_value_t = false,
        help = "Also write a CSV summary of each site"
    )]
    summary: bool,
    #[arg(long, help = "Sky diffuse model, e.g. haydavies or perez")]
    sky_diffuse_model: Option<SkyDiffuseModel>,
    #[arg(long, help = "Extraterrestrial irradiance method, e.g. spencer")]
    extra_radiation_method: Option<ExtraRadiationMethod>,
    #[arg(long, help = "Relative air mass model, e.g. kastenyoung1989")]
    airmass_model: Option<AirMassModel>,
    #[arg(
        long,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Timeout in seconds for each weather service request"
    )]
    timeout_secs: u64,
    #[arg(
        long,
        default_value_t = false,
        help = "Evaluate sites one at a time"
    )]
    sequential: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

fn main() -> anyhow::Result<()> {
    let args = PvYieldArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::INFO);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)
        .context("setting tracing subscriber failed")?;

    let mut input = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Could not open input file {}", path.display()))?;
            ingest_for_processing(BufReader::new(file))?
        }
        None => ProjectInput::default(),
    };
    apply_model_overrides(&mut input, &args);

    let mut flags = ProjectFlags::empty();
    if args.sequential {
        flags.insert(ProjectFlags::SEQUENTIAL);
    }
    if args.summary {
        flags.insert(ProjectFlags::WRITE_SUMMARY);
    }

    let output = FileOutput::new(args.output_dir.clone(), "pv_ac_{}.{}".to_string());

    let report = match &args.weather_dir {
        Some(directory) => run(
            &input,
            CsvDirectoryProvider::new(directory.clone()),
            &output,
            &flags,
        )?,
        None => run(
            &input,
            PvgisTmyProvider::new(Duration::from_secs(args.timeout_secs))?,
            &output,
            &flags,
        )?,
    };

    for (label, site_yield) in report.energies() {
        info!(site = %label, annual_energy_wh = site_yield.annual_energy, "Annual energy");
    }
    for failure in report.failures() {
        warn!(site = %failure.label, reason = %failure.reason, "Site excluded from report");
    }

    Ok(())
}

fn run(
    input: &ProjectInput,
    provider: impl WeatherProvider,
    output: &FileOutput,
    flags: &ProjectFlags,
) -> anyhow::Result<AnnualEnergyReport> {
    Ok(run_project_from_input(input, &provider, output, flags)?)
}

fn apply_model_overrides(input: &mut ProjectInput, args: &PvYieldArgs) {
    if let Some(model) = args.sky_diffuse_model {
        input.models.sky_diffuse_model = model;
    }
    if let Some(method) = args.extra_radiation_method {
        input.models.extra_radiation_method = method;
    }
    if let Some(model) = args.airmass_model {
        input.models.airmass_model = model;
    }
}
