use thiserror::Error;

#[derive(Debug, Error)]
pub enum PvYieldError {
    #[error("Project input was considered invalid due to error: {0}")]
    InvalidInput(#[from] InputError),
    #[error("Error while assembling annual energy report: {0}")]
    Report(#[from] ReportError),
    #[error("Error during report rendering: {0}")]
    Rendering(#[from] RenderError),
    #[error("Error writing output: {0}")]
    Output(anyhow::Error),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Could not parse project input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Site catalog is empty")]
    EmptyCatalog,
    #[error("Site label '{0}' appears more than once in the catalog")]
    DuplicateLabel(String),
    #[error("Site label '{0}' cannot be used as a file name")]
    InvalidLabel(String),
    #[error("Site '{label}' has out-of-range coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        label: String,
        latitude: f64,
        longitude: f64,
    },
    #[error("Site '{label}' has a non-finite altitude ({altitude})")]
    InvalidAltitude { label: String, altitude: f64 },
    #[error("Surface azimuth {0} is outside [0, 360)")]
    InvalidSurfaceAzimuth(f64),
    #[error("Equipment profile is invalid: {0}")]
    InvalidEquipment(String),
}

/// A failure to obtain a usable weather series for a site.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Weather service responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Could not decode weather service response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Could not read weather data: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse weather CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not parse weather timestamp '{0}'")]
    Timestamp(String),
    #[error("Weather column '{column}' has {found} values but the time index has {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Weather column '{column}' holds a non-finite value at index {index}")]
    NonFinite { column: &'static str, index: usize },
    #[error("Weather time index is invalid: {0}")]
    TimeAxis(#[from] TimeAxisError),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TimeAxisError {
    #[error("a series needs at least 2 timestamps to define a step, found {0}")]
    TooShort(usize),
    #[error("timestamp at index {index} does not follow its predecessor")]
    NotIncreasing { index: usize },
    #[error("step at index {index} is {found_secs}s where {expected_secs}s was expected")]
    NonUniformStep {
        index: usize,
        expected_secs: i64,
        found_secs: i64,
    },
}

/// A failure inside the physical model chain for one site.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Solar position calculation failed: {0}")]
    SolarPosition(#[from] solar_positioning::Error),
    #[error("Series '{series}' has {found} values where {expected} were expected")]
    SeriesLength {
        series: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Everything that can go wrong while evaluating a single site. These are
/// contained at the site boundary and never abort a run.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Weather(#[from] WeatherError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Annual energy for site '{0}' was recorded twice")]
    DuplicateEntry(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Could not prepare chart location: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not draw chart: {0}")]
    Drawing(String),
    #[error("Nothing to render: no site produced an annual energy value")]
    EmptyReport,
}
