use crate::input::{ExtraRadiationMethod, SkyDiffuseModel};
use chrono::{DateTime, Datelike, Utc};
use std::f64::consts::PI;

/// Solar constant used by the Spencer and ASCE day-angle formulations, in W/m2
pub const SOLAR_CONSTANT: f64 = 1366.1;
/// Solar constant given by ISO 52010, in W/m2
const ISO_52010_SOLAR_CONSTANT: f64 = 1367.;

/// Lower bound on cos(zenith) when forming the beam projection ratio, so that
/// circumsolar terms do not explode near the horizon
const MIN_COS_ZENITH: f64 = 0.01745;

/// Extraterrestrial normal irradiance, in W/m2, for the day of year of `time`.
pub fn get_extra_radiation(time: DateTime<Utc>, method: ExtraRadiationMethod) -> f64 {
    let day_of_year = time.ordinal() as f64;

    match method {
        ExtraRadiationMethod::Spencer => {
            let b = 2. * PI * (day_of_year - 1.) / 365.;
            SOLAR_CONSTANT
                * (1.00011
                    + 0.034221 * b.cos()
                    + 0.00128 * b.sin()
                    + 0.000719 * (2. * b).cos()
                    + 0.000077 * (2. * b).sin())
        }
        ExtraRadiationMethod::Asce => {
            let b = 2. * PI * day_of_year / 365.;
            SOLAR_CONSTANT * (1. + 0.033 * b.cos())
        }
        ExtraRadiationMethod::Iso52010 => {
            let earth_orbit_deviation = 360. / 365. * day_of_year;
            ISO_52010_SOLAR_CONSTANT * (1. + 0.033 * earth_orbit_deviation.to_radians().cos())
        }
    }
}

/// Dot product of the surface normal and the unit vector towards the sun,
/// clipped to [-1, 1]. All angles in degrees.
pub fn aoi_projection(
    surface_tilt: f64,
    surface_azimuth: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
) -> f64 {
    let projection = surface_tilt.to_radians().cos() * solar_zenith.to_radians().cos()
        + surface_tilt.to_radians().sin()
            * solar_zenith.to_radians().sin()
            * (solar_azimuth - surface_azimuth).to_radians().cos();

    projection.clamp(-1., 1.)
}

/// Angle of incidence of the solar beam on the surface, in degrees.
pub fn aoi(surface_tilt: f64, surface_azimuth: f64, solar_zenith: f64, solar_azimuth: f64) -> f64 {
    aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth)
        .acos()
        .to_degrees()
}

fn beam_projection_ratio(projection: f64, solar_zenith: f64) -> f64 {
    projection.max(0.) / solar_zenith.to_radians().cos().max(MIN_COS_ZENITH)
}

fn isotropic_view_factor(surface_tilt: f64) -> f64 {
    0.5 * (1. + surface_tilt.to_radians().cos())
}

pub fn isotropic(surface_tilt: f64, dhi: f64) -> f64 {
    dhi * isotropic_view_factor(surface_tilt)
}

pub fn klucher(
    surface_tilt: f64,
    surface_azimuth: f64,
    dhi: f64,
    ghi: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
) -> f64 {
    let cos_tt = aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth).max(0.);

    // modulating function, collapses to the isotropic model under overcast skies
    let f = if ghi > 0. {
        1. - (dhi / ghi).powi(2)
    } else {
        0.
    };

    let term1 = isotropic_view_factor(surface_tilt);
    let term2 = 1. + f * (0.5 * surface_tilt).to_radians().sin().powi(3);
    let term3 = 1. + f * cos_tt.powi(2) * solar_zenith.to_radians().sin().powi(3);

    dhi * term1 * term2 * term3
}

pub fn haydavies(
    surface_tilt: f64,
    surface_azimuth: f64,
    dhi: f64,
    dni: f64,
    dni_extra: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
) -> f64 {
    let rb = beam_projection_ratio(
        aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth),
        solar_zenith,
    );
    // anisotropy index
    let ai = dni / dni_extra;

    let poa_isotropic = (dhi * (1. - ai) * isotropic_view_factor(surface_tilt)).max(0.);
    let poa_circumsolar = (dhi * ai * rb).max(0.);

    poa_isotropic + poa_circumsolar
}

pub fn reindl(
    surface_tilt: f64,
    surface_azimuth: f64,
    dhi: f64,
    dni: f64,
    ghi: f64,
    dni_extra: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
) -> f64 {
    let rb = beam_projection_ratio(
        aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth),
        solar_zenith,
    );
    let ai = dni / dni_extra;
    let horizontal_beam = (dni * solar_zenith.to_radians().cos()).max(0.);

    // horizon brightening; no beam means no brightening
    let term3 = if ghi > 0. {
        1. + (horizontal_beam / ghi).sqrt() * (0.5 * surface_tilt).to_radians().sin().powi(3)
    } else {
        1.
    };

    (dhi * (ai * rb + (1. - ai) * isotropic_view_factor(surface_tilt) * term3)).max(0.)
}

pub fn king(surface_tilt: f64, dhi: f64, ghi: f64, solar_zenith: f64) -> f64 {
    let sky_diffuse = dhi * (1. + surface_tilt.to_radians().cos()) / 2.
        + ghi * (0.012 * solar_zenith - 0.04) * (1. - surface_tilt.to_radians().cos()) / 2.;

    sky_diffuse.max(0.)
}

struct BrightnessCoefficientsRow {
    f11: f64,
    f12: f64,
    f13: f64,
    f21: f64,
    f22: f64,
    f23: f64,
}

// Perez (1990) all-sites composite coefficients, as tabulated in ISO 52010 Table 8
static BRIGHTNESS_COEFFICIENTS: [BrightnessCoefficientsRow; 8] = [
    BrightnessCoefficientsRow {
        f11: -0.008,
        f12: 0.588,
        f13: -0.062,
        f21: -0.06,
        f22: 0.072,
        f23: -0.022,
    },
    BrightnessCoefficientsRow {
        f11: 0.13,
        f12: 0.683,
        f13: -0.151,
        f21: -0.019,
        f22: 0.066,
        f23: -0.029,
    },
    BrightnessCoefficientsRow {
        f11: 0.33,
        f12: 0.487,
        f13: -0.221,
        f21: 0.055,
        f22: -0.064,
        f23: -0.026,
    },
    BrightnessCoefficientsRow {
        f11: 0.568,
        f12: 0.187,
        f13: -0.295,
        f21: 0.109,
        f22: -0.152,
        f23: -0.014,
    },
    BrightnessCoefficientsRow {
        f11: 0.873,
        f12: -0.392,
        f13: -0.362,
        f21: 0.226,
        f22: -0.462,
        f23: 0.001,
    },
    BrightnessCoefficientsRow {
        f11: 1.132,
        f12: -1.237,
        f13: -0.412,
        f21: 0.288,
        f22: -0.823,
        f23: 0.056,
    },
    BrightnessCoefficientsRow {
        f11: 1.06,
        f12: -1.6,
        f13: -0.359,
        f21: 0.264,
        f22: -1.127,
        f23: 0.131,
    },
    BrightnessCoefficientsRow {
        f11: 0.678,
        f12: -0.327,
        f13: -0.25,
        f21: 0.156,
        f22: -1.377,
        f23: 0.251,
    },
];

/// Looks up the brightness coefficient row for a sky clearness `e`. Bins are
/// closed on the right, from overcast (first row) to clear (last row).
fn brightness_coefficients(e: f64) -> &'static BrightnessCoefficientsRow {
    &BRIGHTNESS_COEFFICIENTS[if e <= 1.065 {
        0usize
    } else if e <= 1.23 {
        1usize
    } else if e <= 1.5 {
        2usize
    } else if e <= 1.95 {
        3usize
    } else if e <= 2.8 {
        4usize
    } else if e <= 4.5 {
        5usize
    } else if e <= 6.2 {
        6usize
    } else {
        7usize
    }]
}

const CLEARNESS_FORMULA_K: f64 = 1.041;

/// Perez anisotropic sky diffuse model.
///
/// Arguments:
/// * `airmass` - relative air mass; `None` (sun below horizon) yields no diffuse
///               irradiance on the plane
pub fn perez(
    surface_tilt: f64,
    surface_azimuth: f64,
    dhi: f64,
    dni: f64,
    dni_extra: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
    airmass: Option<f64>,
) -> f64 {
    let Some(airmass) = airmass else {
        return 0.;
    };
    if dhi <= 0. {
        return 0.;
    }

    let z = solar_zenith.to_radians();
    let kappa_z3 = CLEARNESS_FORMULA_K * z.powi(3);

    // sky brightness
    let delta = dhi * airmass / dni_extra;
    // sky clearness
    let e = ((dhi + dni) / dhi + kappa_z3) / (1. + kappa_z3);

    let coefficients = brightness_coefficients(e);
    let f1 = (coefficients.f11 + coefficients.f12 * delta + coefficients.f13 * z).max(0.);
    let f2 = coefficients.f21 + coefficients.f22 * delta + coefficients.f23 * z;

    let a = aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth).max(0.);
    let b = solar_zenith
        .to_radians()
        .cos()
        .max(85f64.to_radians().cos());

    let term1 = (1. - f1) * isotropic_view_factor(surface_tilt);
    let term2 = f1 * a / b;
    let term3 = f2 * surface_tilt.to_radians().sin();

    (dhi * (term1 + term2 + term3)).max(0.)
}

/// Sky diffuse irradiance on the tilted plane, in W/m2, using the selected model.
pub fn get_sky_diffuse(
    model: SkyDiffuseModel,
    surface_tilt: f64,
    surface_azimuth: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
    dni: f64,
    ghi: f64,
    dhi: f64,
    dni_extra: f64,
    airmass: Option<f64>,
) -> f64 {
    match model {
        SkyDiffuseModel::Isotropic => isotropic(surface_tilt, dhi),
        SkyDiffuseModel::Klucher => klucher(
            surface_tilt,
            surface_azimuth,
            dhi,
            ghi,
            solar_zenith,
            solar_azimuth,
        ),
        SkyDiffuseModel::HayDavies => haydavies(
            surface_tilt,
            surface_azimuth,
            dhi,
            dni,
            dni_extra,
            solar_zenith,
            solar_azimuth,
        ),
        SkyDiffuseModel::Reindl => reindl(
            surface_tilt,
            surface_azimuth,
            dhi,
            dni,
            ghi,
            dni_extra,
            solar_zenith,
            solar_azimuth,
        ),
        SkyDiffuseModel::King => king(surface_tilt, dhi, ghi, solar_zenith),
        SkyDiffuseModel::Perez => perez(
            surface_tilt,
            surface_azimuth,
            dhi,
            dni,
            dni_extra,
            solar_zenith,
            solar_azimuth,
            airmass,
        ),
    }
}

/// Ground-reflected irradiance on the tilted plane, in W/m2.
pub fn get_ground_diffuse(surface_tilt: f64, ghi: f64, albedo: f64) -> f64 {
    ghi * albedo * (1. - surface_tilt.to_radians().cos()) * 0.5
}

/// Irradiance components in the plane of array, in W/m2
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneOfArrayIrradiance {
    pub poa_global: f64,
    pub poa_direct: f64,
    pub poa_diffuse: f64,
    pub poa_sky_diffuse: f64,
    pub poa_ground_diffuse: f64,
}

pub fn poa_components(
    aoi: f64,
    dni: f64,
    poa_sky_diffuse: f64,
    poa_ground_diffuse: f64,
) -> PlaneOfArrayIrradiance {
    let poa_direct = (dni * aoi.to_radians().cos()).max(0.);
    let poa_diffuse = poa_sky_diffuse + poa_ground_diffuse;

    PlaneOfArrayIrradiance {
        poa_global: poa_direct + poa_diffuse,
        poa_direct,
        poa_diffuse,
        poa_sky_diffuse,
        poa_ground_diffuse,
    }
}

/// Transposes horizontal irradiance onto the tilted plane.
pub fn get_total_irradiance(
    surface_tilt: f64,
    surface_azimuth: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
    dni: f64,
    ghi: f64,
    dhi: f64,
    dni_extra: f64,
    airmass: Option<f64>,
    albedo: f64,
    model: SkyDiffuseModel,
) -> PlaneOfArrayIrradiance {
    let poa_sky_diffuse = get_sky_diffuse(
        model,
        surface_tilt,
        surface_azimuth,
        solar_zenith,
        solar_azimuth,
        dni,
        ghi,
        dhi,
        dni_extra,
        airmass,
    );
    let poa_ground_diffuse = get_ground_diffuse(surface_tilt, ghi, albedo);
    let aoi = aoi(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth);

    poa_components(aoi, dni, poa_sky_diffuse, poa_ground_diffuse)
}
