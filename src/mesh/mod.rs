//! # Mesh types
//!
//! The four kinds of dataset that can be built from a labeled array:
//!
//! * [`ImageData`]: evenly spaced and axis aligned, described by an origin and a spacing
//! * [`RectilinearGrid`]: axis aligned with one coordinate vector per direction
//! * [`StructuredGrid`]: curvilinear, every point stored explicitly
//! * [`PointCloud`]: unconnected points, one vertex cell each
//!
//! All of them order points with `i` fastest: point `p = i + ni * (j + nj * k)`. Arrays attached
//! as point data hold one tuple per point in that order, arrays attached as cell data one tuple
//! per cell in the same `i`-fastest order over the cell indices.
//!
//! [`Mesh`] wraps the four of them and implements [`DataSet`] so that callers can query
//! geometry and arrays without matching on the variant.

mod image;
mod points;
mod rectilinear;
mod structured;

pub use image::ImageData;
pub use points::PointCloud;
pub use rectilinear::RectilinearGrid;
pub use structured::StructuredGrid;

use crate::prelude::*;
use crate::utils;

use derive_more::From;
use std::rc::Rc;

/// a named, possibly vector valued, array attached to the points or cells of a mesh
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct FieldArray {
    pub name: String,
    /// tuples stored one after the other, components fastest
    pub values: Vec<f64>,
    pub components: usize,
}

impl FieldArray {
    pub fn scalars<S: Into<String>>(name: S, values: Vec<f64>) -> Self {
        Self::new(name.into(), values, 1)
    }

    /// number of tuples
    pub fn len(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// the value of one component of tuple `idx`
    pub fn get(&self, idx: usize, component: usize) -> Option<f64> {
        if component >= self.components {
            return None;
        }
        self.values.get(idx * self.components + component).copied()
    }

    /// `[min, max]` over the finite values of one component, or of the whole array when
    /// `component` is `None`
    pub fn range(&self, component: Option<usize>) -> Option<[f64; 2]> {
        match component {
            Some(c) if c >= self.components => None,
            Some(c) => utils::min_max(self.values.iter().skip(c).step_by(self.components).copied()),
            None => utils::min_max(self.values.iter().copied()),
        }
    }
}

/// named arrays of a mesh, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Deref)]
pub struct Attributes(Vec<FieldArray>);

impl Attributes {
    /// add an array, replacing any array of the same name
    pub fn insert(&mut self, array: FieldArray) {
        match self.0.iter_mut().find(|a| a.name == array.name) {
            Some(existing) => *existing = array,
            None => self.0.push(array),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldArray> {
        self.0.iter().find(|a| a.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldArray> {
        let idx = self.0.iter().position(|a| a.name == name)?;
        Some(self.0.remove(idx))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|a| a.name.as_str())
    }
}

/// Any of the supported mesh types
#[derive(Debug, Clone, PartialEq, From)]
pub enum Mesh {
    Image(ImageData),
    Rectilinear(RectilinearGrid),
    Structured(StructuredGrid),
    Points(PointCloud),
}

/// The shared output of an [`AlgorithmSource`](crate::AlgorithmSource). The mesh behind the
/// handle is replaced in place on every rebuild, so a renderer can hold on to it.
pub type MeshHandle = Rc<RefCell<Mesh>>;

impl Default for Mesh {
    fn default() -> Self {
        Mesh::Rectilinear(RectilinearGrid::default())
    }
}

impl Mesh {
    /// name of the VTK XML dataset type
    pub fn vtk_type(&self) -> &'static str {
        match self {
            Mesh::Image(_) => "ImageData",
            Mesh::Rectilinear(_) => "RectilinearGrid",
            Mesh::Structured(_) => "StructuredGrid",
            Mesh::Points(_) => "PolyData",
        }
    }

    /// conventional file extension of the VTK XML format for this mesh
    pub fn extension(&self) -> &'static str {
        match self {
            Mesh::Image(_) => "vti",
            Mesh::Rectilinear(_) => "vtr",
            Mesh::Structured(_) => "vts",
            Mesh::Points(_) => "vtp",
        }
    }

    fn dataset(&self) -> &dyn DataSet {
        match self {
            Mesh::Image(mesh) => mesh,
            Mesh::Rectilinear(mesh) => mesh,
            Mesh::Structured(mesh) => mesh,
            Mesh::Points(mesh) => mesh,
        }
    }

    fn dataset_mut(&mut self) -> &mut dyn DataSet {
        match self {
            Mesh::Image(mesh) => mesh,
            Mesh::Rectilinear(mesh) => mesh,
            Mesh::Structured(mesh) => mesh,
            Mesh::Points(mesh) => mesh,
        }
    }
}

impl DataSet for Mesh {
    fn dimensions(&self) -> [usize; 3] {
        self.dataset().dimensions()
    }

    fn n_points(&self) -> usize {
        self.dataset().n_points()
    }

    fn n_cells(&self) -> usize {
        self.dataset().n_cells()
    }

    fn point(&self, id: usize) -> Option<[f64; 3]> {
        self.dataset().point(id)
    }

    fn point_data(&self) -> &Attributes {
        self.dataset().point_data()
    }

    fn point_data_mut(&mut self) -> &mut Attributes {
        self.dataset_mut().point_data_mut()
    }

    fn cell_data(&self) -> &Attributes {
        self.dataset().cell_data()
    }

    fn cell_data_mut(&mut self) -> &mut Attributes {
        self.dataset_mut().cell_data_mut()
    }

    fn bounds(&self) -> Option<[f64; 6]> {
        self.dataset().bounds()
    }
}
