//! container types for labeled arrays and their coordinate variables

mod data_array;
mod dataset;
mod lazy;

pub use data_array::DataArray;
pub use dataset::{Dataset, Variable};
pub use lazy::LazyArray;

use crate::error::{OutOfRange, ShapeMismatch};
use crate::Error;

use ndarray::{Array, Array1, ArrayD, Axis, Dimension, IxDyn};
use num_traits::ToPrimitive;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// attribute metadata such as CF `axis`, `standard_name` or `units`
pub type Attrs = BTreeMap<String, String>;

/// coordinate variables by name
pub type Coords = BTreeMap<String, Coordinate>;

/// per-dimension selection used to materialize part of a [`LabeledArray`](crate::LabeledArray)
///
/// dimensions without an entry are kept whole
pub type Selection = BTreeMap<String, Selector>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Selector {
    /// pick a single index and drop the dimension
    Index(usize),
    /// keep a strided range of the dimension
    Slab(Slab),
}

/// `start..stop` with a step, `stop = None` meaning the end of the dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Slab {
    pub start: usize,
    pub stop: Option<usize>,
    pub step: usize,
}

impl Slab {
    pub fn new(start: usize, stop: Option<usize>, step: usize) -> Self {
        Self { start, stop, step }
    }

    /// the whole dimension, sampled every `step` elements
    pub fn every(step: usize) -> Self {
        Self::new(0, None, step)
    }

    /// indices selected out of a dimension of length `len`
    pub fn indices(&self, len: usize) -> Result<Vec<usize>, Error> {
        if self.step == 0 {
            return Err(OutOfRange::new("slab step".into(), "0".into(), "[1, inf)".into()).into());
        }
        if self.start > len {
            return Err(OutOfRange::new(
                "slab start".into(),
                self.start.to_string(),
                format!("[0, {len}]"),
            )
            .into());
        }

        let stop = self.stop.unwrap_or(len).min(len);
        Ok((self.start..stop.max(self.start)).step_by(self.step).collect())
    }

    /// edge indices bounding the cells selected out of `cells` cells (`cells + 1` edges).
    ///
    /// With a step larger than one every coarse cell spans `step` original cells, the last one
    /// is clipped to the final edge.
    pub fn edge_indices(&self, cells: usize) -> Result<Vec<usize>, Error> {
        let mut edges = self.indices(cells)?;
        if let Some(&last) = edges.last() {
            edges.push((last + self.step).min(cells));
        }
        Ok(edges)
    }

    /// number of elements selected out of a dimension of length `len`
    pub fn len(&self, len: usize) -> Result<usize, Error> {
        Ok(self.indices(len)?.len())
    }
}

/// values of a coordinate variable
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValues {
    Numeric(ArrayD<f64>),
    /// one dimensional non-numeric labels such as band names or formatted dates
    Labels(Vec<String>),
}

/// A coordinate variable: values over a subset of the dimensions of the array it belongs to.
///
/// Along a dimension a coordinate normally has the same length as the data. Coordinates of
/// cell-centered data describe cell edges instead and are one element longer.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    dims: Vec<String>,
    values: CoordValues,
    attrs: Attrs,
}

impl Coordinate {
    /// a one dimensional coordinate along `dim`
    pub fn from_vec<T: ToPrimitive>(dim: &str, values: Vec<T>) -> Self {
        let values: Vec<f64> = values.iter().map(to_f64).collect();

        Self {
            dims: vec![dim.to_string()],
            values: CoordValues::Numeric(Array1::from(values).into_dyn()),
            attrs: Attrs::new(),
        }
    }

    /// a coordinate of any rank, one dimension name per axis of `values`
    pub fn from_array<T, D>(dims: &[&str], values: Array<T, D>) -> Result<Self, Error>
    where
        T: ToPrimitive,
        D: Dimension,
    {
        if dims.len() != values.ndim() {
            return Err(ShapeMismatch::of(
                dims.join(","),
                format!(
                    "{} dimension names given for a {} dimensional coordinate",
                    dims.len(),
                    values.ndim()
                ),
            )
            .into());
        }

        Ok(Self {
            dims: dims.iter().map(|d| d.to_string()).collect(),
            values: CoordValues::Numeric(values.map(to_f64).into_dyn()),
            attrs: Attrs::new(),
        })
    }

    /// a zero dimensional coordinate, what is left of a coordinate after indexing its dimension
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            values: CoordValues::Numeric(ArrayD::from_elem(IxDyn(&[]), value)),
            attrs: Attrs::new(),
        }
    }

    /// a one dimensional non-numeric coordinate
    pub fn labels<S: Into<String>>(dim: &str, labels: Vec<S>) -> Self {
        Self {
            dims: vec![dim.to_string()],
            values: CoordValues::Labels(labels.into_iter().map(Into::into).collect()),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    pub fn shape(&self) -> Vec<usize> {
        match &self.values {
            CoordValues::Numeric(values) => values.shape().to_vec(),
            CoordValues::Labels(labels) => vec![labels.len()],
        }
    }

    /// length along `dim`, if the coordinate spans it
    pub fn len_along(&self, dim: &str) -> Option<usize> {
        let idx = self.dims.iter().position(|d| d == dim)?;
        self.shape().get(idx).copied()
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn values(&self) -> &CoordValues {
        &self.values
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, CoordValues::Numeric(_))
    }

    /// numeric values of the coordinate. Labels are replaced by their index times `scale`.
    pub fn numeric(&self, scale: f64) -> ArrayD<f64> {
        match &self.values {
            CoordValues::Numeric(values) => values.clone(),
            CoordValues::Labels(labels) => {
                ArrayD::from_shape_fn(IxDyn(&[labels.len()]), |idx| idx[0] as f64 * scale)
            }
        }
    }

    /// human readable label of every element along a one dimensional coordinate
    pub fn display_labels(&self) -> Vec<String> {
        match &self.values {
            CoordValues::Numeric(values) => values.iter().map(|v| v.to_string()).collect(),
            CoordValues::Labels(labels) => labels.clone(),
        }
    }

    /// slice the coordinate along the selected dimensions of its parent array. `dim_lens` holds
    /// the data lengths of the parent before selection, which tells edge coordinates apart.
    pub(crate) fn select(
        &self,
        name: &str,
        selection: &Selection,
        dim_lens: &BTreeMap<String, usize>,
    ) -> Result<Coordinate, Error> {
        let mut dims = self.dims.clone();
        let mut values = self.values.clone();

        // walk backwards so that dropping an axis does not shift the ones still to visit
        for axis in (0..self.dims.len()).rev() {
            let dim = &self.dims[axis];
            let selector = match selection.get(dim) {
                Some(selector) => selector,
                None => continue,
            };

            let own_len = self.shape()[axis];
            let is_edge = match dim_lens.get(dim) {
                Some(&data_len) if own_len == data_len => false,
                Some(&data_len) if own_len == data_len + 1 => true,
                Some(&data_len) => {
                    return Err(ShapeMismatch::of(
                        name,
                        format!("length {own_len} along `{dim}` where the data has {data_len}"),
                    )
                    .into())
                }
                None => continue,
            };

            let data_len = if is_edge { own_len - 1 } else { own_len };

            match *selector {
                Selector::Index(idx) => {
                    if idx >= data_len {
                        return Err(OutOfRange::index(dim, idx, data_len).into());
                    }
                    dims.remove(axis);
                    values = match values {
                        CoordValues::Numeric(arr) => {
                            CoordValues::Numeric(arr.index_axis_move(Axis(axis), idx))
                        }
                        // a labeled coordinate indexed down to nothing keeps the position
                        CoordValues::Labels(_) => CoordValues::Numeric(ArrayD::from_elem(
                            IxDyn(&[]),
                            idx as f64,
                        )),
                    };
                }
                Selector::Slab(slab) => {
                    let indices = if is_edge {
                        slab.edge_indices(data_len)?
                    } else {
                        slab.indices(data_len)?
                    };
                    values = match values {
                        CoordValues::Numeric(arr) => {
                            CoordValues::Numeric(arr.select(Axis(axis), &indices))
                        }
                        CoordValues::Labels(labels) => CoordValues::Labels(
                            indices.iter().map(|&i| labels[i].clone()).collect(),
                        ),
                    };
                }
            }
        }

        Ok(Coordinate {
            dims,
            values,
            attrs: self.attrs.clone(),
        })
    }
}

/// dimensions and lengths that remain after applying `selection`
pub(crate) fn selected_shape(
    dims: &[String],
    shape: &[usize],
    selection: &Selection,
) -> Result<(Vec<String>, Vec<usize>), Error> {
    check_selection(dims, selection)?;

    let mut out_dims = Vec::with_capacity(dims.len());
    let mut out_shape = Vec::with_capacity(dims.len());

    for (dim, &len) in dims.iter().zip(shape) {
        match selection.get(dim) {
            Some(Selector::Index(idx)) => {
                if *idx >= len {
                    return Err(OutOfRange::index(dim, *idx, len).into());
                }
            }
            Some(Selector::Slab(slab)) => {
                out_dims.push(dim.clone());
                out_shape.push(slab.len(len)?);
            }
            None => {
                out_dims.push(dim.clone());
                out_shape.push(len);
            }
        }
    }

    Ok((out_dims, out_shape))
}

/// apply `selection` to an array whose axes are named by `dims`
pub(crate) fn select_values(
    values: &ArrayD<f64>,
    dims: &[String],
    selection: &Selection,
) -> Result<ArrayD<f64>, Error> {
    check_selection(dims, selection)?;

    let mut out = values.clone();
    for axis in (0..dims.len()).rev() {
        match selection.get(&dims[axis]) {
            Some(Selector::Index(idx)) => {
                let len = out.len_of(Axis(axis));
                if *idx >= len {
                    return Err(OutOfRange::index(&dims[axis], *idx, len).into());
                }
                out = out.index_axis_move(Axis(axis), *idx);
            }
            Some(Selector::Slab(slab)) => {
                let indices = slab.indices(out.len_of(Axis(axis)))?;
                out = out.select(Axis(axis), &indices);
            }
            None => (),
        }
    }

    Ok(out)
}

/// slice every coordinate variable of an array alongside its values
pub(crate) fn select_coords(
    coords: &Coords,
    dims: &[String],
    shape: &[usize],
    selection: &Selection,
) -> Result<Coords, Error> {
    let dim_lens: BTreeMap<String, usize> = dims.iter().cloned().zip(shape.iter().copied()).collect();

    coords
        .iter()
        .map(|(name, coord)| Ok((name.clone(), coord.select(name, selection, &dim_lens)?)))
        .collect()
}

fn check_selection(dims: &[String], selection: &Selection) -> Result<(), Error> {
    match selection.keys().find(|key| !dims.contains(key)) {
        Some(key) => Err(ShapeMismatch::of(key.as_str(), "selected dimension does not exist").into()),
        None => Ok(()),
    }
}

pub(crate) fn to_f64<T: ToPrimitive>(value: &T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
