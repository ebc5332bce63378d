use crate::core::pv_system::SiteEvaluation;
use crate::errors::ReportError;
use chrono::DateTime;
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::Serialize;

/// Energy delivered over the series, in Wh, from AC power in W sampled at a
/// fixed step in hours.
pub fn annual_energy(ac_power: &[f64], step_in_hours: f64) -> f64 {
    ac_power.iter().sum::<f64>() * step_in_hours
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SiteYield {
    /// in Wh
    pub annual_energy: f64,
    /// in W
    pub peak_ac_power: f64,
    /// local time of the first timestamp at peak power; `None` if the site
    /// never produced power
    pub peak_time: Option<DateTime<Tz>>,
    pub degraded_samples: usize,
}

impl SiteYield {
    pub fn from_evaluation(evaluation: &SiteEvaluation, timezone: Tz) -> Self {
        let peak = evaluation
            .ac_power
            .iter()
            .enumerate()
            .filter(|(_, power)| **power > 0.)
            .fold(None, |peak: Option<(usize, f64)>, (idx, &power)| match peak {
                Some((_, peak_power)) if peak_power >= power => peak,
                _ => Some((idx, power)),
            });

        Self {
            annual_energy: annual_energy(&evaluation.ac_power, evaluation.step_in_hours),
            peak_ac_power: peak.map_or(0., |(_, power)| power),
            peak_time: peak.map(|(idx, _)| evaluation.timestamps[idx].with_timezone(&timezone)),
            degraded_samples: evaluation.degraded_samples,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SiteFailure {
    pub label: String,
    pub reason: String,
}

/// Annual energy per site, in catalog order, along with the sites that could
/// not be evaluated.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnnualEnergyReport {
    energies: IndexMap<String, SiteYield>,
    failures: Vec<SiteFailure>,
}

impl AnnualEnergyReport {
    /// Records the yield for a site. Each site is written exactly once.
    pub fn insert(&mut self, label: &str, site_yield: SiteYield) -> Result<(), ReportError> {
        if self.energies.contains_key(label) || self.failures.iter().any(|f| f.label == label) {
            return Err(ReportError::DuplicateEntry(label.to_string()));
        }
        self.energies.insert(label.to_string(), site_yield);
        Ok(())
    }

    pub fn insert_failure(&mut self, label: &str, reason: String) -> Result<(), ReportError> {
        if self.energies.contains_key(label) || self.failures.iter().any(|f| f.label == label) {
            return Err(ReportError::DuplicateEntry(label.to_string()));
        }
        self.failures.push(SiteFailure {
            label: label.to_string(),
            reason,
        });
        Ok(())
    }

    pub fn energies(&self) -> &IndexMap<String, SiteYield> {
        &self.energies
    }

    /// Annual energy for a site, in Wh
    pub fn annual_energy(&self, label: &str) -> Option<f64> {
        self.energies.get(label).map(|site_yield| site_yield.annual_energy)
    }

    pub fn failures(&self) -> &[SiteFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }
}
