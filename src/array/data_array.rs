use super::{select_coords, select_values, to_f64, Attrs, Coordinate, Coords, Selection};
use crate::error::ShapeMismatch;
use crate::prelude::*;

/// An in-memory labeled array.
///
/// Values are stored as `f64` regardless of the element type they were built from. Coordinate
/// lengths are not checked here, only once the array is laid out on a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray {
    name: Option<String>,
    dims: Vec<String>,
    values: ArrayD<f64>,
    coords: Coords,
    attrs: Attrs,
}

impl DataArray {
    pub fn new<T, D>(dims: &[&str], values: Array<T, D>) -> Result<Self, Error>
    where
        T: ToPrimitive,
        D: Dimension,
    {
        let dims: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
        Self::from_parts(None, dims, values.map(to_f64).into_dyn(), Coords::new(), Attrs::new())
    }

    pub(crate) fn from_parts(
        name: Option<String>,
        dims: Vec<String>,
        values: ArrayD<f64>,
        coords: Coords,
        attrs: Attrs,
    ) -> Result<Self, Error> {
        if dims.len() != values.ndim() {
            return Err(ShapeMismatch::of(
                name.as_deref().unwrap_or("data"),
                format!(
                    "{} dimension names given for {} dimensional values",
                    dims.len(),
                    values.ndim()
                ),
            )
            .into());
        }

        for (idx, dim) in dims.iter().enumerate() {
            if dims[..idx].contains(dim) {
                return Err(ShapeMismatch::of(dim.as_str(), "dimension name is repeated").into());
            }
        }

        Ok(Self {
            name,
            dims,
            values,
            coords,
            attrs,
        })
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_coord<S: Into<String>>(mut self, name: S, coord: Coordinate) -> Self {
        self.coords.insert(name.into(), coord);
        self
    }

    pub fn with_attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    pub fn into_values(self) -> ArrayD<f64> {
        self.values
    }

    /// value at the given `(dimension, index)` pairs; every dimension has to be named once
    pub fn at(&self, index: &[(&str, usize)]) -> Option<f64> {
        if index.len() != self.dims.len() {
            return None;
        }

        let mut position = vec![0; self.dims.len()];
        for (dim, idx) in index {
            let axis = self.dims.iter().position(|d| d == dim)?;
            position[axis] = *idx;
        }

        self.values.get(position.as_slice()).copied()
    }
}

impl LabeledArray for DataArray {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn dims(&self) -> &[String] {
        &self.dims
    }

    fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    fn coords(&self) -> &Coords {
        &self.coords
    }

    fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    fn materialize(&self, selection: &Selection) -> Result<DataArray, Error> {
        if selection.is_empty() {
            return Ok(self.clone());
        }

        let (dims, _) = super::selected_shape(&self.dims, self.shape(), selection)?;
        let values = select_values(&self.values, &self.dims, selection)?;
        let coords = select_coords(&self.coords, &self.dims, self.shape(), selection)?;

        DataArray::from_parts(self.name.clone(), dims, values, coords, self.attrs.clone())
    }
}
