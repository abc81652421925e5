//! # Traits
//!
//! The seams between `xvtk` and the outside world. [`LabeledArray`] is the input side: any
//! labeled array store (in memory, chunked on disk, remote) can be meshed by implementing it.
//! [`Classifier`] is the convention layer that guesses which coordinate plays which axis.
//! [`DataSet`] is the read interface shared by every mesh type, and [`Renderer`] is whatever
//! consumes a finished mesh.

use crate::array::{Attrs, Coordinate, Coords, DataArray, Selection};
use crate::axes::{AxisTag, Evidence};
use crate::mesh::{Attributes, Mesh};
use crate::Error;

/// Read access to a labeled n-dimensional array.
///
/// Metadata (dimensions, coordinates, attributes) is expected to be cheap and always in memory.
/// The values themselves are only realized through [`LabeledArray::materialize`], which
/// receives the exact block the caller needs. Implementations backed by chunked or remote
/// storage should only read the chunks that intersect the selection.
pub trait LabeledArray {
    /// name of the variable, used as the name of the mesh array
    fn name(&self) -> Option<&str>;

    /// ordered dimension names
    fn dims(&self) -> &[String];

    /// length along each of [`LabeledArray::dims`]
    fn shape(&self) -> &[usize];

    /// coordinate variables by name
    fn coords(&self) -> &Coords;

    /// attribute metadata of the variable itself
    fn attrs(&self) -> &Attrs;

    /// realize the block described by `selection` as an in-memory array.
    ///
    /// Dimensions selected with [`Selector::Index`](crate::Selector::Index) are dropped from
    /// the result, coordinate variables are sliced alongside the values.
    fn materialize(&self, selection: &Selection) -> Result<DataArray, Error>;

    fn dim_len(&self, dim: &str) -> Option<usize> {
        self.dims()
            .iter()
            .position(|d| d == dim)
            .map(|idx| self.shape()[idx])
    }

    fn coord(&self, name: &str) -> Option<&Coordinate> {
        self.coords().get(name)
    }

    /// true if `name` is either a coordinate variable or a dimension of this array
    fn contains(&self, name: &str) -> bool {
        self.coords().contains_key(name) || self.dims().iter().any(|d| d == name)
    }

    /// realize the entire array
    fn load(&self) -> Result<DataArray, Error> {
        self.materialize(&Selection::new())
    }
}

impl<T: LabeledArray + ?Sized> LabeledArray for &T {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }
    fn dims(&self) -> &[String] {
        (**self).dims()
    }
    fn shape(&self) -> &[usize] {
        (**self).shape()
    }
    fn coords(&self) -> &Coords {
        (**self).coords()
    }
    fn attrs(&self) -> &Attrs {
        (**self).attrs()
    }
    fn materialize(&self, selection: &Selection) -> Result<DataArray, Error> {
        (**self).materialize(selection)
    }
}

impl<T: LabeledArray + ?Sized> LabeledArray for std::rc::Rc<T> {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }
    fn dims(&self) -> &[String] {
        (**self).dims()
    }
    fn shape(&self) -> &[usize] {
        (**self).shape()
    }
    fn coords(&self) -> &Coords {
        (**self).coords()
    }
    fn attrs(&self) -> &Attrs {
        (**self).attrs()
    }
    fn materialize(&self, selection: &Selection) -> Result<DataArray, Error> {
        (**self).materialize(selection)
    }
}

/// Decides which logical axis a coordinate variable represents.
///
/// The resolver only trusts the strongest [`Evidence`] found for each axis, so a classifier
/// should report the evidence it actually used rather than a flat answer.
pub trait Classifier {
    fn classify(&self, name: &str, coord: &Coordinate) -> Option<(AxisTag, Evidence)>;

    /// whether a bare dimension (one without a coordinate variable) looks like a component
    /// axis such as the bands of an RGB image
    fn is_component_dim(&self, _dim: &str) -> bool {
        false
    }
}

/// Common read / write access to the geometry and arrays of every mesh type
pub trait DataSet {
    /// number of points along the i, j, k directions. Point clouds report `[n, 1, 1]`.
    fn dimensions(&self) -> [usize; 3];

    fn n_points(&self) -> usize;

    fn n_cells(&self) -> usize;

    /// position of point `id`, following the `i`-fastest point ordering
    fn point(&self, id: usize) -> Option<[f64; 3]>;

    fn point_data(&self) -> &Attributes;

    fn point_data_mut(&mut self) -> &mut Attributes;

    fn cell_data(&self) -> &Attributes;

    fn cell_data_mut(&mut self) -> &mut Attributes;

    fn points(&self) -> Vec<[f64; 3]> {
        (0..self.n_points()).filter_map(|id| self.point(id)).collect()
    }

    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`, or `None` for a mesh without points
    fn bounds(&self) -> Option<[f64; 6]> {
        let mut points = (0..self.n_points()).filter_map(|id| self.point(id));
        let first = points.next()?;
        let mut bounds = [first[0], first[0], first[1], first[1], first[2], first[2]];

        for p in points {
            for axis in 0..3 {
                bounds[2 * axis] = bounds[2 * axis].min(p[axis]);
                bounds[2 * axis + 1] = bounds[2 * axis + 1].max(p[axis]);
            }
        }

        Some(bounds)
    }
}

/// Anything that consumes a finished mesh: an interactive plotter, an image exporter, a file
/// sink. [`VtkFileSink`](crate::VtkFileSink) is the one shipped with this crate.
pub trait Renderer {
    type Options;
    type Error: std::error::Error + 'static;

    fn render(&mut self, mesh: &Mesh, options: &Self::Options) -> Result<(), Self::Error>;
}
