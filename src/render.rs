use crate::errors::RenderError;
use crate::report::AnnualEnergyReport;
use plotters::prelude::*;
use std::fs;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1024, 640);
const CHART_TITLE: &str = "Annual PV AC energy forecast";
const X_AXIS_LABEL: &str = "Site";
const Y_AXIS_LABEL: &str = "Annual energy (W hr)";
/// headroom above the tallest bar, as a fraction of its height
const Y_AXIS_HEADROOM: f64 = 0.1;

/// Renders one bar per site, in report order, to a PNG at `path`. The parent
/// directory is created if missing.
pub fn render_report(report: &AnnualEnergyReport, path: &Path) -> Result<(), RenderError> {
    if report.is_empty() {
        return Err(RenderError::EmptyReport);
    }
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let labels = report.energies().keys().cloned().collect::<Vec<_>>();
    let energies = report
        .energies()
        .values()
        .map(|site_yield| site_yield.annual_energy)
        .collect::<Vec<_>>();

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d(
            (0u32..labels.len() as u32).into_segmented(),
            0f64..y_axis_max(&energies),
        )
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(X_AXIS_LABEL)
        .y_desc(Y_AXIS_LABEL)
        .x_labels(labels.len())
        .x_label_formatter(&|segment| segment_label(&labels, segment))
        .y_label_formatter(&|energy| format!("{energy:.0}"))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(drawing_error)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(30)
                .data(
                    energies
                        .iter()
                        .enumerate()
                        .map(|(idx, energy)| (idx as u32, *energy)),
                ),
        )
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;

    Ok(())
}

fn drawing_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(err.to_string())
}

/// Upper bound of the energy axis. A report where no site produced energy
/// still gets a usable axis.
fn y_axis_max(energies: &[f64]) -> f64 {
    let max_energy = energies
        .iter()
        .copied()
        .filter(|energy| energy.is_finite())
        .fold(0., f64::max);

    if max_energy > 0. {
        max_energy * (1. + Y_AXIS_HEADROOM)
    } else {
        1.
    }
}

fn segment_label(labels: &[String], segment: &SegmentValue<u32>) -> String {
    match segment {
        SegmentValue::CenterOf(idx) => labels.get(*idx as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SiteYield;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_leave_headroom_above_tallest_bar() {
        assert_relative_eq!(y_axis_max(&[100., 400., 250.]), 440.);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0., 0.])]
    #[case(&[f64::NAN])]
    fn should_keep_usable_axis_without_energy(#[case] energies: &[f64]) {
        assert_eq!(y_axis_max(energies), 1.);
    }

    #[rstest]
    fn should_label_segment_centres_with_site_names() {
        let labels = vec!["Tucson".to_string(), "Berlin".to_string()];

        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(1)), "Berlin");
        assert_eq!(segment_label(&labels, &SegmentValue::Exact(1)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::CenterOf(5)), "");
        assert_eq!(segment_label(&labels, &SegmentValue::Last), "");
    }

    #[rstest]
    fn should_render_png_creating_parent_directory() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("img").join("pv_ac_forecast.png");
        let mut report = AnnualEnergyReport::default();
        report
            .insert(
                "Tucson",
                SiteYield {
                    annual_energy: 412_000.,
                    peak_ac_power: 250.,
                    peak_time: None,
                    degraded_samples: 0,
                },
            )
            .unwrap();

        render_report(&report, &path).unwrap();

        let contents = fs::read(&path).unwrap();
        assert!(contents.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[rstest]
    fn should_refuse_to_render_empty_report() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("img").join("pv_ac_forecast.png");

        assert!(matches!(
            render_report(&AnnualEnergyReport::default(), &path),
            Err(RenderError::EmptyReport)
        ));
        assert!(!path.exists());
    }
}
