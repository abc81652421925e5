//! CF-convention axis detection.
//!
//! The checks run in a fixed order and stop at the first hit: the `axis` attribute, the
//! `standard_name` attribute, the `units` attribute, then the variable name.

use crate::array::Coordinate;
use crate::axes::{AxisTag, Evidence};
use crate::Classifier;

const STANDARD_NAMES: &[(&str, AxisTag)] = &[
    ("longitude", AxisTag::X),
    ("grid_longitude", AxisTag::X),
    ("projection_x_coordinate", AxisTag::X),
    ("latitude", AxisTag::Y),
    ("grid_latitude", AxisTag::Y),
    ("projection_y_coordinate", AxisTag::Y),
    ("altitude", AxisTag::Z),
    ("height", AxisTag::Z),
    ("depth", AxisTag::Z),
    ("air_pressure", AxisTag::Z),
    ("geopotential_height", AxisTag::Z),
    ("atmosphere_ln_pressure_coordinate", AxisTag::Z),
    ("atmosphere_sigma_coordinate", AxisTag::Z),
    ("atmosphere_hybrid_sigma_pressure_coordinate", AxisTag::Z),
    ("ocean_sigma_coordinate", AxisTag::Z),
    ("ocean_s_coordinate", AxisTag::Z),
    ("ocean_s_coordinate_g1", AxisTag::Z),
    ("ocean_s_coordinate_g2", AxisTag::Z),
    ("ocean_double_sigma_coordinate", AxisTag::Z),
    ("time", AxisTag::Time),
    ("forecast_reference_time", AxisTag::Time),
    ("forecast_period", AxisTag::Time),
];

const PRESSURE_UNITS: &[&str] = &["Pa", "hPa", "mbar", "millibar", "bar", "atm"];

const X_NAMES: &[&str] = &["lon", "longitude", "x"];
const Y_NAMES: &[&str] = &["lat", "latitude", "y"];
const Z_NAMES: &[&str] = &[
    "z", "lev", "level", "depth", "altitude", "height", "isobaric", "pressure", "sigma", "s_rho",
    "zlev",
];
const TIME_NAMES: &[&str] = &["time"];

const COMPONENT_DIMS: &[&str] = &[
    "band",
    "bands",
    "component",
    "components",
    "channel",
    "channels",
    "rgb",
];

/// [`Classifier`] following the CF metadata conventions, with room for project specific
/// coordinate names
#[derive(Debug, Clone, Default)]
pub struct CfClassifier {
    custom: Vec<(String, AxisTag)>,
}

impl CfClassifier {
    /// treat coordinates called `name` (case insensitive) as `tag`, ahead of the builtin names
    pub fn with_name<S: Into<String>>(mut self, name: S, tag: AxisTag) -> Self {
        self.custom.push((name.into(), tag));
        self
    }

    fn by_axis_attribute(coord: &Coordinate) -> Option<AxisTag> {
        let axis = coord.attrs().get("axis")?;
        match axis.to_ascii_uppercase().as_str() {
            "X" => Some(AxisTag::X),
            "Y" => Some(AxisTag::Y),
            "Z" => Some(AxisTag::Z),
            "T" => Some(AxisTag::Time),
            _ => None,
        }
    }

    fn by_standard_name(coord: &Coordinate) -> Option<AxisTag> {
        let standard_name = coord.attrs().get("standard_name")?;
        STANDARD_NAMES
            .iter()
            .find(|(name, _)| *name == standard_name.as_str())
            .map(|(_, tag)| *tag)
    }

    fn by_units(coord: &Coordinate) -> Option<AxisTag> {
        let units = coord.attrs().get("units")?;

        if PRESSURE_UNITS.contains(&units.as_str()) {
            return Some(AxisTag::Z);
        }

        // degree, degrees, degree_east, degrees_E, degreesnorth, ...
        let lower = units.to_ascii_lowercase();
        let rest = lower.strip_prefix("degree")?;
        let rest = rest.strip_prefix('s').unwrap_or(rest);
        let rest = rest.strip_prefix('_').unwrap_or(rest);

        match rest {
            "east" | "e" => Some(AxisTag::X),
            "north" | "n" => Some(AxisTag::Y),
            _ => None,
        }
    }

    fn by_name(&self, name: &str) -> Option<AxisTag> {
        if let Some((_, tag)) = self
            .custom
            .iter()
            .find(|(custom, _)| custom.eq_ignore_ascii_case(name))
        {
            return Some(*tag);
        }

        let matches = |names: &[&str]| names.iter().any(|n| n.eq_ignore_ascii_case(name));

        if matches(X_NAMES) {
            Some(AxisTag::X)
        } else if matches(Y_NAMES) {
            Some(AxisTag::Y)
        } else if matches(Z_NAMES) {
            Some(AxisTag::Z)
        } else if matches(TIME_NAMES) {
            Some(AxisTag::Time)
        } else {
            None
        }
    }
}

impl Classifier for CfClassifier {
    fn classify(&self, name: &str, coord: &Coordinate) -> Option<(AxisTag, Evidence)> {
        if let Some(tag) = Self::by_axis_attribute(coord) {
            return Some((tag, Evidence::AxisAttribute));
        }
        if let Some(tag) = Self::by_standard_name(coord) {
            return Some((tag, Evidence::StandardName));
        }
        if let Some(tag) = Self::by_units(coord) {
            return Some((tag, Evidence::Units));
        }
        self.by_name(name).map(|tag| (tag, Evidence::Name))
    }

    fn is_component_dim(&self, dim: &str) -> bool {
        COMPONENT_DIMS.iter().any(|n| n.eq_ignore_ascii_case(dim))
    }
}
