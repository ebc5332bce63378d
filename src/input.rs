use crate::errors::InputError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufReader, Read};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub fn ingest_for_processing(json: impl Read) -> Result<ProjectInput, InputError> {
    let input: ProjectInput = serde_json::from_reader(BufReader::new(json))?;
    input.validate()?;
    Ok(input)
}

/// Orientation of every array: south-facing.
const DEFAULT_SURFACE_AZIMUTH: f64 = 180.;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectInput {
    pub sites: Vec<Site>,
    #[serde(default)]
    pub equipment: EquipmentProfile,
    #[serde(default)]
    pub models: ModelSelection,
    /// in degrees, clockwise from north
    #[serde(default = "default_surface_azimuth")]
    pub surface_azimuth: f64,
}

fn default_surface_azimuth() -> f64 {
    DEFAULT_SURFACE_AZIMUTH
}

impl ProjectInput {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.sites.is_empty() {
            return Err(InputError::EmptyCatalog);
        }

        let mut labels = HashSet::with_capacity(self.sites.len());
        for site in &self.sites {
            if !labels.insert(site.label.as_str()) {
                return Err(InputError::DuplicateLabel(site.label.clone()));
            }
            site.validate()?;
        }

        if !(0.0..360.0).contains(&self.surface_azimuth) {
            return Err(InputError::InvalidSurfaceAzimuth(self.surface_azimuth));
        }

        self.equipment.validate()
    }
}

impl Default for ProjectInput {
    /// The four sites compared by the reference run, with the reference equipment.
    fn default() -> Self {
        Self {
            sites: vec![
                Site::new(32.2, -111.0, "Tucson", 700., Tz::Etc__GMTPlus7),
                Site::new(35.1, -106.6, "Albuquerque", 1500., Tz::Etc__GMTPlus7),
                Site::new(37.8, -122.4, "San Francisco", 10., Tz::Etc__GMTPlus8),
                Site::new(52.5, 13.4, "Berlin", 34., Tz::Etc__GMTMinus1),
            ],
            equipment: Default::default(),
            models: Default::default(),
            surface_azimuth: DEFAULT_SURFACE_AZIMUTH,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Site {
    /// in degrees, north positive
    pub latitude: f64,
    /// in degrees, east positive
    pub longitude: f64,
    pub label: String,
    /// in metres above sea level, may be negative
    pub altitude: f64,
    pub timezone: Tz,
}

impl Site {
    pub fn new(latitude: f64, longitude: f64, label: &str, altitude: f64, timezone: Tz) -> Self {
        Self {
            latitude,
            longitude,
            label: label.to_string(),
            altitude,
            timezone,
        }
    }

    fn validate(&self) -> Result<(), InputError> {
        // labels name the site's weather file and must stay within its directory
        if self.label.trim().is_empty()
            || self.label.starts_with('.')
            || self.label.contains(['/', '\\'])
        {
            return Err(InputError::InvalidLabel(self.label.clone()));
        }
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(InputError::InvalidCoordinates {
                label: self.label.clone(),
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        if !self.altitude.is_finite() {
            return Err(InputError::InvalidAltitude {
                label: self.label.clone(),
                altitude: self.altitude,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSelection {
    #[serde(default)]
    pub sky_diffuse_model: SkyDiffuseModel,
    #[serde(default)]
    pub extra_radiation_method: ExtraRadiationMethod,
    #[serde(default)]
    pub airmass_model: AirMassModel,
    #[serde(default = "default_ground_albedo")]
    pub ground_albedo: f64,
}

fn default_ground_albedo() -> f64 {
    0.25
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            sky_diffuse_model: Default::default(),
            extra_radiation_method: Default::default(),
            airmass_model: Default::default(),
            ground_albedo: default_ground_albedo(),
        }
    }
}

/// Sky diffuse transposition models for plane-of-array irradiance.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SkyDiffuseModel {
    Isotropic,
    Klucher,
    #[default]
    HayDavies,
    Reindl,
    King,
    Perez,
}

/// Methods for extraterrestrial normal irradiance as a function of day of year.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExtraRadiationMethod {
    #[default]
    Spencer,
    Asce,
    Iso52010,
}

/// Relative (sea level) optical air mass approximations.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    IntoStaticStr,
    PartialEq,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AirMassModel {
    Simple,
    Kasten1966,
    YoungIrvine1967,
    #[default]
    KastenYoung1989,
    Gueymard1993,
    Young1994,
    Pickering2002,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentProfile {
    #[serde(default)]
    pub module: SapmModuleParameters,
    #[serde(default)]
    pub inverter: SandiaInverterParameters,
    #[serde(default)]
    pub temperature_model: ThermalModel,
}

impl EquipmentProfile {
    fn validate(&self) -> Result<(), InputError> {
        let module = &self.module;
        if module.cells_in_series == 0 {
            return Err(InputError::InvalidEquipment(
                "module must have at least one cell in series".to_string(),
            ));
        }
        let inverter = &self.inverter;
        if inverter.paco <= 0. || inverter.pdco <= inverter.pso {
            return Err(InputError::InvalidEquipment(format!(
                "inverter ratings are inconsistent (Paco={}, Pdco={}, Pso={})",
                inverter.paco, inverter.pdco, inverter.pso
            )));
        }
        Ok(())
    }
}

/// Module record for the Sandia PV Array Performance Model, keyed as in the Sandia module database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SapmModuleParameters {
    #[serde(rename = "Cells_in_Series")]
    pub cells_in_series: u32,
    #[serde(rename = "Isco")]
    pub isc0: f64,
    #[serde(rename = "Voco")]
    pub voc0: f64,
    #[serde(rename = "Impo")]
    pub imp0: f64,
    #[serde(rename = "Vmpo")]
    pub vmp0: f64,
    #[serde(rename = "Aisc")]
    pub alpha_isc: f64,
    #[serde(rename = "Aimp")]
    pub alpha_imp: f64,
    #[serde(rename = "Bvoco")]
    pub beta_voc0: f64,
    #[serde(rename = "Mbvoc")]
    pub m_beta_voc: f64,
    #[serde(rename = "Bvmpo")]
    pub beta_vmp0: f64,
    #[serde(rename = "Mbvmp")]
    pub m_beta_vmp: f64,
    /// diode ideality factor
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "C0")]
    pub c0: f64,
    #[serde(rename = "C1")]
    pub c1: f64,
    #[serde(rename = "C2")]
    pub c2: f64,
    #[serde(rename = "C3")]
    pub c3: f64,
    #[serde(rename = "C4")]
    pub c4: f64,
    #[serde(rename = "C5")]
    pub c5: f64,
    #[serde(rename = "C6")]
    pub c6: f64,
    #[serde(rename = "C7")]
    pub c7: f64,
    #[serde(rename = "IXO")]
    pub ix0: f64,
    #[serde(rename = "IXXO")]
    pub ixx0: f64,
    /// air mass polynomial coefficients A0..A4
    #[serde(rename = "A")]
    pub spectral_coefficients: [f64; 5],
    /// angle of incidence polynomial coefficients B0..B5
    #[serde(rename = "B")]
    pub incidence_coefficients: [f64; 6],
    /// fraction of diffuse irradiance used by the module
    #[serde(rename = "FD")]
    pub fd: f64,
}

impl Default for SapmModuleParameters {
    /// Canadian Solar CS5P-220M (2009)
    fn default() -> Self {
        Self {
            cells_in_series: 96,
            isc0: 5.09115,
            voc0: 59.2608,
            imp0: 4.54629,
            vmp0: 48.3156,
            alpha_isc: 0.000397,
            alpha_imp: 0.000181,
            beta_voc0: -0.21696,
            m_beta_voc: 0.,
            beta_vmp0: -0.235488,
            m_beta_vmp: 0.,
            n: 1.4032,
            c0: 1.01284,
            c1: -0.0128398,
            c2: 0.279317,
            c3: -7.24463,
            c4: 0.996446,
            c5: 0.003554,
            c6: 1.15535,
            c7: -0.155353,
            ix0: 4.97599,
            ixx0: 3.18803,
            spectral_coefficients: [0.928385, 0.068093, -0.0157738, 0.0016606, -6.93e-05],
            incidence_coefficients: [1., -0.002438, 0.0003103, -1.246e-05, 2.11e-07, -1.36e-09],
            fd: 1.,
        }
    }
}

/// Inverter record for the Sandia grid-connected inverter model, keyed as in the CEC inverter database.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SandiaInverterParameters {
    /// rated AC output, in W
    #[serde(rename = "Paco")]
    pub paco: f64,
    /// DC input at which rated AC output is reached, in W
    #[serde(rename = "Pdco")]
    pub pdco: f64,
    /// DC voltage at which rated AC output is reached, in V
    #[serde(rename = "Vdco")]
    pub vdco: f64,
    /// DC power needed to start the inversion process, in W
    #[serde(rename = "Pso")]
    pub pso: f64,
    #[serde(rename = "C0")]
    pub c0: f64,
    #[serde(rename = "C1")]
    pub c1: f64,
    #[serde(rename = "C2")]
    pub c2: f64,
    #[serde(rename = "C3")]
    pub c3: f64,
    /// night-time tare loss, in W
    #[serde(rename = "Pnt")]
    pub pnt: f64,
}

impl Default for SandiaInverterParameters {
    /// ABB MICRO-0.25-I-OUTD-US-208 (208V)
    fn default() -> Self {
        Self {
            paco: 250.,
            pdco: 259.588593,
            vdco: 40.,
            pso: 2.089607,
            c0: -4.1e-05,
            c1: -9.1e-05,
            c2: 0.000494,
            c3: -0.013171,
            pnt: 0.075,
        }
    }
}

/// Thermal coefficients of the Sandia cell temperature model, either a named
/// mounting preset or explicit values.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThermalModel {
    Preset(MountingConfiguration),
    Custom(SapmTemperatureParameters),
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self::Preset(MountingConfiguration::OpenRackGlassGlass)
    }
}

impl ThermalModel {
    pub fn parameters(&self) -> SapmTemperatureParameters {
        match self {
            ThermalModel::Preset(mounting) => mounting.parameters(),
            ThermalModel::Custom(parameters) => *parameters,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MountingConfiguration {
    OpenRackGlassGlass,
    CloseMountGlassGlass,
    OpenRackGlassPolymer,
    InsulatedBackGlassPolymer,
}

impl MountingConfiguration {
    pub fn parameters(&self) -> SapmTemperatureParameters {
        let (a, b, delta_t) = match self {
            MountingConfiguration::OpenRackGlassGlass => (-3.47, -0.0594, 3.),
            MountingConfiguration::CloseMountGlassGlass => (-2.98, -0.0471, 1.),
            MountingConfiguration::OpenRackGlassPolymer => (-3.56, -0.0750, 3.),
            MountingConfiguration::InsulatedBackGlassPolymer => (-2.81, -0.0455, 0.),
        };
        SapmTemperatureParameters { a, b, delta_t }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SapmTemperatureParameters {
    /// upper limit of module temperature at low wind speed and high irradiance
    pub a: f64,
    /// rate of module temperature decrease with increasing wind speed
    pub b: f64,
    /// difference between cell and module back surface temperature at 1000 W/m2
    #[serde(rename = "deltaT")]
    pub delta_t: f64,
}
