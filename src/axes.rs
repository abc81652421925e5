//! Deciding which coordinate variable plays which logical axis.
//!
//! Explicit overrides always win. Every other coordinate is offered to a [`Classifier`], which
//! answers with an axis and the [`Evidence`] it relied on; per axis only the candidates with the
//! strongest evidence are considered, and exactly one of them must remain.

use crate::prelude::*;
use crate::Classifier;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// logical role of a coordinate or dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AxisTag {
    X,
    Y,
    Z,
    Component,
    Time,
}

impl AxisTag {
    pub const ALL: [AxisTag; 5] = [
        AxisTag::X,
        AxisTag::Y,
        AxisTag::Z,
        AxisTag::Component,
        AxisTag::Time,
    ];

    pub const SPATIAL: [AxisTag; 3] = [AxisTag::X, AxisTag::Y, AxisTag::Z];

    pub(crate) fn index(self) -> usize {
        match self {
            AxisTag::X => 0,
            AxisTag::Y => 1,
            AxisTag::Z => 2,
            AxisTag::Component => 3,
            AxisTag::Time => 4,
        }
    }
}

impl fmt::Display for AxisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisTag::X => "X",
            AxisTag::Y => "Y",
            AxisTag::Z => "Z",
            AxisTag::Component => "component",
            AxisTag::Time => "time",
        };
        write!(f, "{name}")
    }
}

/// What a classification was based on, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Evidence {
    /// an explicit `axis` attribute (`X`, `Y`, `Z`, `T`)
    AxisAttribute,
    /// a recognised CF `standard_name`
    StandardName,
    /// units that only make sense along one axis, such as `degrees_east`
    Units,
    /// the variable name alone
    Name,
}

/// Explicitly chosen coordinate names, one per axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AxisOverrides {
    pub x: Option<String>,
    pub y: Option<String>,
    pub z: Option<String>,
    pub component: Option<String>,
    pub time: Option<String>,
}

impl AxisOverrides {
    pub fn with_x<S: Into<String>>(mut self, name: S) -> Self {
        self.x = Some(name.into());
        self
    }

    pub fn with_y<S: Into<String>>(mut self, name: S) -> Self {
        self.y = Some(name.into());
        self
    }

    pub fn with_z<S: Into<String>>(mut self, name: S) -> Self {
        self.z = Some(name.into());
        self
    }

    pub fn with_component<S: Into<String>>(mut self, name: S) -> Self {
        self.component = Some(name.into());
        self
    }

    pub fn with_time<S: Into<String>>(mut self, name: S) -> Self {
        self.time = Some(name.into());
        self
    }

    pub fn get(&self, tag: AxisTag) -> Option<&str> {
        match tag {
            AxisTag::X => self.x.as_deref(),
            AxisTag::Y => self.y.as_deref(),
            AxisTag::Z => self.z.as_deref(),
            AxisTag::Component => self.component.as_deref(),
            AxisTag::Time => self.time.as_deref(),
        }
    }
}

/// The resolved name bound to each axis
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AxisMap {
    names: [Option<String>; 5],
}

impl AxisMap {
    pub fn get(&self, tag: AxisTag) -> Option<&str> {
        self.names[tag.index()].as_deref()
    }

    pub fn bind<S: Into<String>>(&mut self, tag: AxisTag, name: S) {
        self.names[tag.index()] = Some(name.into());
    }

    /// the bound names of X, Y and Z
    pub fn spatial(&self) -> [Option<&str>; 3] {
        AxisTag::SPATIAL.map(|tag| self.get(tag))
    }

    /// a copy of the map with `tag` unbound
    pub fn without(&self, tag: AxisTag) -> AxisMap {
        let mut map = self.clone();
        map.names[tag.index()] = None;
        map
    }

    /// the tag a name is bound to, if any
    pub fn tag_of(&self, name: &str) -> Option<AxisTag> {
        AxisTag::ALL
            .into_iter()
            .find(|tag| self.get(*tag) == Some(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisTag, &str)> {
        AxisTag::ALL
            .into_iter()
            .filter_map(move |tag| self.get(tag).map(|name| (tag, name)))
    }
}

/// Resolve every axis of `array`.
///
/// X and Y must resolve to exactly one name. Z and time may be absent but never ambiguous. The
/// component axis is best effort: a single candidate is bound, anything else leaves it unbound.
pub fn resolve<A, C>(array: &A, overrides: &AxisOverrides, classifier: &C) -> Result<AxisMap, Error>
where
    A: LabeledArray + ?Sized,
    C: Classifier + ?Sized,
{
    let mut map = AxisMap::default();

    for tag in AxisTag::ALL {
        if let Some(name) = overrides.get(tag) {
            if !array.contains(name) {
                let mut available: Vec<String> = array.coords().keys().cloned().collect();
                available.extend(array.dims().iter().cloned());
                available.sort();
                available.dedup();
                return Err(Error::InvalidAxis {
                    axis: tag,
                    name: name.to_string(),
                    available,
                });
            }
            map.bind(tag, name);
        }
    }

    let mut candidates: BTreeMap<AxisTag, (Evidence, Vec<String>)> = BTreeMap::new();

    for (name, coord) in array.coords() {
        if coord.ndim() == 0 || map.tag_of(name).is_some() {
            continue;
        }

        let (tag, evidence) = match classifier.classify(name, coord) {
            Some(found) => found,
            None => continue,
        };

        if map.get(tag).is_some() {
            continue;
        }

        let entry = candidates
            .entry(tag)
            .or_insert_with(|| (evidence, Vec::new()));
        if evidence < entry.0 {
            *entry = (evidence, vec![name.clone()]);
        } else if evidence == entry.0 {
            entry.1.push(name.clone());
        }
    }

    for tag in AxisTag::ALL {
        if map.get(tag).is_some() {
            continue;
        }

        let (evidence, names) = candidates.remove(&tag).unwrap_or((Evidence::Name, Vec::new()));

        match (tag, names.len()) {
            (_, 1) => {
                debug!(axis = %tag, name = %names[0], ?evidence, "resolved axis");
                map.bind(tag, names[0].clone());
            }
            (AxisTag::X | AxisTag::Y, _) => {
                return Err(Error::AmbiguousAxis {
                    axis: tag,
                    candidates: names,
                })
            }
            (AxisTag::Z | AxisTag::Time, 0) => (),
            (AxisTag::Z | AxisTag::Time, _) => {
                return Err(Error::AmbiguousAxis {
                    axis: tag,
                    candidates: names,
                })
            }
            (AxisTag::Component, _) => {
                if names.len() > 1 {
                    debug!(?names, "several component candidates, leaving the component axis unbound");
                }
            }
        }
    }

    if map.get(AxisTag::Component).is_none() {
        if let Some(dim) = component_dim(array, &map, classifier) {
            debug!(dim = %dim, "resolved component axis from dimension name");
            map.bind(AxisTag::Component, dim);
        }
    }

    Ok(map)
}

/// The dimension an axis name refers to: the name itself for a dimension, the only dimension of
/// a one dimensional coordinate, `None` otherwise.
pub(crate) fn dim_of<A>(array: &A, name: &str) -> Option<String>
where
    A: LabeledArray + ?Sized,
{
    if array.dim_len(name).is_some() {
        return Some(name.to_string());
    }
    match array.coord(name) {
        Some(coord) if coord.ndim() == 1 => Some(coord.dims()[0].clone()),
        _ => None,
    }
}

/// a single bare dimension that looks like a component axis and is not used by a bound axis
fn component_dim<A, C>(array: &A, map: &AxisMap, classifier: &C) -> Option<String>
where
    A: LabeledArray + ?Sized,
    C: Classifier + ?Sized,
{
    let used: Vec<&str> = map
        .iter()
        .flat_map(|(_, name)| match array.coord(name) {
            Some(coord) => coord.dims().iter().map(String::as_str).collect::<Vec<_>>(),
            None => vec![name],
        })
        .collect();

    let mut found = array
        .dims()
        .iter()
        .filter(|dim| !used.contains(&dim.as_str()) && classifier.is_component_dim(dim));

    match (found.next(), found.next()) {
        (Some(dim), None) => Some(dim.clone()),
        _ => None,
    }
}
