//! Laying coordinate variables out on mesh points.
//!
//! Up to three dimensions of the array become the `I`, `J` and `K` directions of the mesh
//! (`I` fastest). Each of the X, Y and Z coordinates is then described relative to those
//! directions: a constant, a one dimensional axis along one direction, or a full `(nk, nj, ni)`
//! array.

use crate::axes::{AxisMap, AxisTag};
use crate::prelude::*;
use crate::utils;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// evenly spaced, axis aligned
    Uniform,
    /// axis aligned with arbitrary spacing
    Rectilinear,
    /// curvilinear, every point positioned individually
    Structured,
}

/// whether data values sit on the mesh points or inside its cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Centering {
    #[default]
    Point,
    /// coordinates describe cell edges, one longer than the data along every spatial dimension
    Cell,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandOptions {
    pub centering: Centering,
    /// spacing given to non-numeric coordinates, by coordinate name
    pub scales: BTreeMap<String, f64>,
}

impl ExpandOptions {
    pub(crate) fn scale(&self, name: &str) -> f64 {
        self.scales.get(name).copied().unwrap_or(1.0)
    }
}

/// The array dimensions mapped onto the `I`, `J` and `K` directions of a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialLayout {
    slots: [Option<String>; 3],
    data_shape: [usize; 3],
    centering: Centering,
    structured: bool,
}

impl SpatialLayout {
    /// dimension name of each direction, `None` for a collapsed direction
    pub fn slots(&self) -> [Option<&str>; 3] {
        [
            self.slots[0].as_deref(),
            self.slots[1].as_deref(),
            self.slots[2].as_deref(),
        ]
    }

    /// direction a dimension is mapped to
    pub fn slot_of(&self, dim: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.as_deref() == Some(dim))
    }

    /// number of mesh points along each direction
    pub fn dimensions(&self) -> [usize; 3] {
        let mut dims = self.data_shape;
        if self.centering == Centering::Cell {
            for (slot, n) in dims.iter_mut().enumerate() {
                if self.slots[slot].is_some() {
                    *n += 1;
                }
            }
        }
        dims
    }

    /// number of data values along each direction, per component
    pub fn data_shape(&self) -> [usize; 3] {
        self.data_shape
    }

    pub fn centering(&self) -> Centering {
        self.centering
    }

    pub fn n_points(&self) -> usize {
        self.dimensions().iter().product()
    }

    pub(crate) fn is_structured(&self) -> bool {
        self.structured
    }
}

/// One spatial coordinate relative to the mesh directions
#[derive(Debug, Clone, PartialEq)]
pub enum AxisCoordinate {
    /// the same value at every point
    Constant(f64),
    /// varies along direction `slot` only
    Edges { slot: usize, values: Array1<f64> },
    /// one value per point, shaped `(nk, nj, ni)`
    Full(Array3<f64>),
}

impl AxisCoordinate {
    /// value at point `[i, j, k]`
    pub fn at(&self, ijk: [usize; 3]) -> f64 {
        match self {
            AxisCoordinate::Constant(value) => *value,
            AxisCoordinate::Edges { slot, values } => values[ijk[*slot]],
            AxisCoordinate::Full(values) => values[[ijk[2], ijk[1], ijk[0]]],
        }
    }
}

/// Every spatial coordinate expanded to the points of one layout
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedCoordinates {
    topology: Topology,
    layout: SpatialLayout,
    axes: [AxisCoordinate; 3],
}

impl ExpandedCoordinates {
    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn layout(&self) -> &SpatialLayout {
        &self.layout
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.layout.dimensions()
    }

    pub fn n_points(&self) -> usize {
        self.layout.n_points()
    }

    /// the expanded X, Y or Z coordinate. `None` for the non-spatial tags.
    pub fn axis(&self, tag: AxisTag) -> Option<&AxisCoordinate> {
        AxisTag::SPATIAL
            .iter()
            .position(|t| *t == tag)
            .map(|idx| &self.axes[idx])
    }

    pub(crate) fn axes(&self) -> &[AxisCoordinate; 3] {
        &self.axes
    }

    /// position of point `p`
    pub fn point(&self, p: usize) -> Option<[f64; 3]> {
        if p >= self.n_points() {
            return None;
        }
        let ijk = utils::point_ijk(p, self.dimensions());
        Some([self.axes[0].at(ijk), self.axes[1].at(ijk), self.axes[2].at(ijk)])
    }

    /// the X, Y or Z coordinate broadcast to every point, shaped `(nk, nj, ni)`
    pub fn values(&self, tag: AxisTag) -> Option<Array3<f64>> {
        let axis = self.axis(tag)?;
        let [ni, nj, nk] = self.dimensions();
        Some(Array3::from_shape_fn((nk, nj, ni), |(k, j, i)| axis.at([i, j, k])))
    }
}

/// bound X, Y and Z coordinates of `array`, in that order
fn spatial_coords<'a, A>(
    array: &'a A,
    axes: &AxisMap,
) -> Result<[Option<(&'a str, &'a Coordinate)>; 3], Error>
where
    A: LabeledArray + ?Sized,
{
    let mut out = [None, None, None];

    for (slot, tag) in AxisTag::SPATIAL.into_iter().enumerate() {
        let name = match axes.get(tag) {
            Some(name) => name,
            None => continue,
        };

        let (name, coord) = array
            .coords()
            .get_key_value(name)
            .ok_or_else(|| Error::MissingCoordinate {
                axis: tag,
                name: name.to_string(),
            })?;
        out[slot] = Some((name.as_str(), coord));
    }

    Ok(out)
}

/// Map the dimensions of the bound spatial coordinates onto mesh directions.
///
/// Only metadata is read, so this is cheap even for arrays that are not loaded.
pub fn layout<A>(array: &A, axes: &AxisMap, centering: Centering) -> Result<SpatialLayout, Error>
where
    A: LabeledArray + ?Sized,
{
    let coords = spatial_coords(array, axes)?;

    for (name, coord) in coords.iter().flatten() {
        if let Some(dim) = coord.dims().iter().find(|d| array.dim_len(d).is_none()) {
            return Err(ShapeMismatch::of(
                *name,
                format!("dimension `{dim}` is not a dimension of the data"),
            )
            .into());
        }
    }

    let structured = is_structured(&coords);

    let mut slots: Vec<String> = Vec::with_capacity(3);
    if structured {
        // the highest rank coordinate fixes the order, ties going to X, then Y, then Z
        let mut by_rank: Vec<&Coordinate> = coords.iter().flatten().map(|(_, c)| *c).collect();
        by_rank.sort_by_key(|c| std::cmp::Reverse(c.ndim()));

        for coord in by_rank {
            for dim in coord.dims().iter().rev() {
                if !slots.contains(dim) {
                    slots.push(dim.clone());
                }
            }
        }
    } else {
        for (_, coord) in coords.iter().flatten() {
            if let Some(dim) = coord.dims().first() {
                slots.push(dim.clone());
            }
        }
    }

    if slots.len() > 3 {
        return Err(ShapeMismatch::of(
            slots.join(","),
            "spatial coordinates span more than three dimensions",
        )
        .into());
    }

    let mut layout = SpatialLayout {
        slots: [None, None, None],
        data_shape: [1, 1, 1],
        centering,
        structured,
    };

    if structured {
        for (slot, dim) in slots.into_iter().enumerate() {
            layout.data_shape[slot] = array.dim_len(&dim).unwrap_or(1);
            layout.slots[slot] = Some(dim);
        }
    } else {
        // X, Y and Z keep their own direction even if one of them is collapsed
        for (slot, entry) in coords.iter().enumerate() {
            if let Some(dim) = entry.and_then(|(_, c)| c.dims().first()) {
                layout.data_shape[slot] = array.dim_len(dim).unwrap_or(1);
                layout.slots[slot] = Some(dim.clone());
            }
        }
    }

    check_lengths(array, &coords, &layout)?;

    debug!(
        slots = ?layout.slots(),
        dimensions = ?layout.dimensions(),
        structured,
        "computed spatial layout"
    );

    Ok(layout)
}

fn is_structured(coords: &[Option<(&str, &Coordinate)>; 3]) -> bool {
    let bound: Vec<&Coordinate> = coords.iter().flatten().map(|(_, c)| *c).collect();

    if bound.iter().any(|c| c.ndim() >= 2) {
        return true;
    }

    bound.iter().enumerate().any(|(idx, a)| {
        bound[idx + 1..]
            .iter()
            .any(|b| a.dims().iter().any(|d| b.dims().contains(d)))
    })
}

fn check_lengths<A>(
    array: &A,
    coords: &[Option<(&str, &Coordinate)>; 3],
    layout: &SpatialLayout,
) -> Result<(), Error>
where
    A: LabeledArray + ?Sized,
{
    let points = layout.dimensions();

    for (name, coord) in coords.iter().flatten() {
        for (dim, len) in coord.dims().iter().zip(coord.shape()) {
            let slot = layout.slot_of(dim).ok_or_else(|| {
                ShapeMismatch::of(*name, format!("dimension `{dim}` is not a spatial dimension"))
            })?;

            if len != points[slot] {
                let data_len = array.dim_len(dim).unwrap_or(0);
                let reason = match layout.centering {
                    Centering::Point => {
                        format!("length {len} along `{dim}` where the data has {data_len}")
                    }
                    Centering::Cell => format!(
                        "length {len} along `{dim}`, cell centered data with {data_len} cells needs {} edges",
                        data_len + 1
                    ),
                };
                return Err(ShapeMismatch::of(*name, reason).into());
            }
        }
    }

    Ok(())
}

fn numeric_1d(coord: &Coordinate, scale: f64) -> Array1<f64> {
    coord.numeric(scale).iter().copied().collect()
}

fn refine_topology(
    layout: &SpatialLayout,
    coords: &[Option<(&str, &Coordinate)>; 3],
    options: &ExpandOptions,
) -> Topology {
    if layout.is_structured() {
        return Topology::Structured;
    }

    let uniform = coords.iter().flatten().all(|(name, coord)| {
        coord.ndim() == 0
            || utils::uniform_spacing(numeric_1d(coord, options.scale(name)).as_slice().unwrap_or(&[]))
                .is_some()
    });

    if uniform {
        Topology::Uniform
    } else {
        Topology::Rectilinear
    }
}

/// the topology the bound spatial coordinates call for, without expanding anything
pub fn topology<A>(array: &A, axes: &AxisMap, options: &ExpandOptions) -> Result<Topology, Error>
where
    A: LabeledArray + ?Sized,
{
    let layout = layout(array, axes, options.centering)?;
    let coords = spatial_coords(array, axes)?;
    Ok(refine_topology(&layout, &coords, options))
}

/// Expand the X, Y and Z coordinates of `array` to its mesh points.
///
/// A missing axis (typically Z) is a constant `0`, a zero dimensional coordinate a constant at
/// its value.
pub fn expand<A>(array: &A, axes: &AxisMap, options: &ExpandOptions) -> Result<ExpandedCoordinates, Error>
where
    A: LabeledArray + ?Sized,
{
    let layout = layout(array, axes, options.centering)?;
    let coords = spatial_coords(array, axes)?;
    let topology = refine_topology(&layout, &coords, options);
    let [ni, nj, nk] = layout.dimensions();

    let mut expanded = [
        AxisCoordinate::Constant(0.0),
        AxisCoordinate::Constant(0.0),
        AxisCoordinate::Constant(0.0),
    ];

    for (axis, entry) in coords.iter().enumerate() {
        let (name, coord) = match entry {
            Some(entry) => *entry,
            None => continue,
        };
        let values = coord.numeric(options.scale(name));

        expanded[axis] = match coord.ndim() {
            0 => AxisCoordinate::Constant(values.iter().next().copied().unwrap_or(0.0)),
            1 => {
                let slot = layout.slot_of(&coord.dims()[0]).ok_or_else(|| {
                    ShapeMismatch::of(name, "coordinate dimension is not a spatial dimension")
                })?;
                AxisCoordinate::Edges {
                    slot,
                    values: values.iter().copied().collect(),
                }
            }
            _ => {
                let slots = coord
                    .dims()
                    .iter()
                    .map(|d| {
                        layout
                            .slot_of(d)
                            .ok_or_else(|| ShapeMismatch::of(name, format!("`{d}` is not a spatial dimension")))
                    })
                    .collect::<Result<Vec<usize>, ShapeMismatch>>()?;

                let mut index = vec![0; slots.len()];
                let full = Array3::from_shape_fn((nk, nj, ni), |(k, j, i)| {
                    let ijk = [i, j, k];
                    for (a, slot) in slots.iter().enumerate() {
                        index[a] = ijk[*slot];
                    }
                    values[index.as_slice()]
                });
                AxisCoordinate::Full(full)
            }
        };
    }

    debug!(?topology, n_points = layout.n_points(), "expanded coordinates");

    Ok(ExpandedCoordinates {
        topology,
        layout,
        axes: expanded,
    })
}
