use crate::core::atmosphere::{absolute_air_mass, alt2pres, relative_air_mass};
use crate::core::energy_supply::inverter::sandia;
use crate::core::energy_supply::pv::{sapm, sapm_effective_irradiance};
use crate::core::irradiance::{aoi, get_extra_radiation, get_total_irradiance};
use crate::core::solar_position::get_solarposition;
use crate::core::temperature::sapm_cell;
use crate::errors::ModelError;
use crate::external_conditions::ExternalConditions;
use crate::input::{EquipmentProfile, ModelSelection, Site};
use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

/// A fixed-tilt array of one module feeding one inverter at a site. The array
/// is tilted at the site latitude.
#[derive(Debug)]
pub struct PvSystem<'a> {
    site: &'a Site,
    surface_tilt: f64,
    surface_azimuth: f64,
    equipment: &'a EquipmentProfile,
    models: &'a ModelSelection,
}

/// AC output of a site over its weather time axis.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteEvaluation {
    pub timestamps: Vec<DateTime<Utc>>,
    /// AC power per timestamp, in W
    pub ac_power: Vec<f64>,
    pub step_in_hours: f64,
    /// number of timestamps where the model chain produced an undefined value
    /// and the AC power was replaced by 0
    pub degraded_samples: usize,
}

impl<'a> PvSystem<'a> {
    /// Arguments:
    /// * `site` - location of the array
    /// * `surface_azimuth` - azimuth the array faces, clockwise from north, in degrees
    /// * `equipment` - module, inverter and mounting
    /// * `models` - choice of transposition, extraterrestrial and air mass models
    pub fn new(
        site: &'a Site,
        surface_azimuth: f64,
        equipment: &'a EquipmentProfile,
        models: &'a ModelSelection,
    ) -> Self {
        Self {
            site,
            surface_tilt: site.latitude,
            surface_azimuth,
            equipment,
            models,
        }
    }

    pub fn surface_tilt(&self) -> f64 {
        self.surface_tilt
    }

    /// Runs the model chain for every timestamp of the weather series.
    #[instrument(skip_all, fields(site = %self.site.label))]
    pub fn evaluate(&self, weather: &ExternalConditions) -> Result<SiteEvaluation, ModelError> {
        let pressure = alt2pres(self.site.altitude);
        if !pressure.is_finite() {
            warn!(
                altitude = self.site.altitude,
                "Atmospheric pressure is undefined at this altitude; no output will be produced"
            );
        }

        let solar_position = get_solarposition(
            weather.timestamps(),
            self.site.latitude,
            self.site.longitude,
            self.site.altitude,
            pressure,
            weather.air_temps(),
        )?;

        let module = &self.equipment.module;
        let inverter = &self.equipment.inverter;
        let thermal_parameters = self.equipment.temperature_model.parameters();

        let mut ac_power = Vec::with_capacity(weather.len());
        let mut degraded_samples = 0;

        for iteration in weather.simulation_time().iter() {
            let t_idx = iteration.index;
            let solar_zenith = solar_position.apparent_zenith[t_idx];
            let solar_azimuth = solar_position.azimuth[t_idx];
            let dni = weather.direct_normal_irradiances()[t_idx];
            let ghi = weather.global_horizontal_irradiances()[t_idx];
            let dhi = weather.diffuse_horizontal_irradiances()[t_idx];

            let dni_extra = get_extra_radiation(iteration.time, self.models.extra_radiation_method);
            let airmass_relative = relative_air_mass(solar_zenith, self.models.airmass_model);
            let airmass_absolute = airmass_relative.map(|am| absolute_air_mass(am, pressure));

            let aoi = aoi(
                self.surface_tilt,
                self.surface_azimuth,
                solar_zenith,
                solar_azimuth,
            );
            let poa = get_total_irradiance(
                self.surface_tilt,
                self.surface_azimuth,
                solar_zenith,
                solar_azimuth,
                dni,
                ghi,
                dhi,
                dni_extra,
                airmass_relative,
                self.models.ground_albedo,
                self.models.sky_diffuse_model,
            );

            let temp_cell = sapm_cell(
                poa.poa_global,
                weather.air_temps()[t_idx],
                weather.wind_speeds()[t_idx],
                &thermal_parameters,
            );
            let effective_irradiance = sapm_effective_irradiance(
                poa.poa_direct,
                poa.poa_diffuse,
                airmass_absolute,
                aoi,
                module,
            );
            let dc = sapm(effective_irradiance, temp_cell, module);
            let power_ac = sandia(dc.v_mp, dc.p_mp, inverter);

            if power_ac.is_finite() {
                ac_power.push(power_ac);
            } else {
                degraded_samples += 1;
                ac_power.push(0.);
            }
        }

        if degraded_samples > 0 {
            warn!(
                degraded_samples,
                "AC power was undefined for some timestamps and has been set to zero"
            );
        }

        Ok(SiteEvaluation {
            timestamps: weather.timestamps().to_vec(),
            ac_power,
            step_in_hours: weather.simulation_time().step_in_hours(),
            degraded_samples,
        })
    }
}
