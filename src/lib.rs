//! # xvtk
//!
//! Build VTK-style meshes from labeled, coordinate-aware n-dimensional arrays.
//!
//! A [`LabeledArray`] has named dimensions, coordinate variables over subsets of those
//! dimensions and free-form attributes. `xvtk` works out which coordinates play the X / Y / Z
//! role (explicitly or through CF-style conventions), decides which mesh topology fits the
//! coordinates, broadcasts lower-rank coordinates to every mesh point and flattens the data
//! values in the mesh's native point order:
//!
//! ```
//! use xvtk::prelude::*;
//!
//! let temperature = ndarray::Array3::<f64>::zeros((2, 3, 4));
//! let array = xvtk::DataArray::new(&["z", "lat", "lon"], temperature)
//!     .unwrap()
//!     .with_name("temperature")
//!     .with_coord("lon", Coordinate::from_vec("lon", vec![0., 1., 2., 3.]))
//!     .with_coord("lat", Coordinate::from_vec("lat", vec![10., 20., 40.]))
//!     .with_coord("z", Coordinate::from_vec("z", vec![0., 100.]));
//!
//! let mesh = array.mesh_accessor().mesh(&MeshOptions::default()).unwrap();
//!
//! assert_eq!(mesh.n_points(), 24);
//! assert_eq!(mesh.dimensions(), [4, 3, 2]);
//! ```
//!
//! ## Point ordering
//!
//! Every mesh, every expanded coordinate buffer and every flattened data buffer share one
//! ordering: point `p = i + ni * (j + nj * k)`, with `i` varying fastest. For
//! rectilinear and uniform grids `i` runs along X, `j` along Y and `k` along Z. For structured
//! grids `i` runs along the last dimension of the highest-rank coordinate variable.
//!
//! ## Lazy sources
//!
//! [`AlgorithmSource`] wraps the same pipeline for interactive use: it tracks which settings
//! changed, materializes only the time step and resolution it needs and rewrites one shared
//! output mesh in place.

pub mod accessor;
pub mod array;
pub mod axes;
pub mod build;
pub mod cf;
pub mod convert;
mod error;
pub mod expand;
pub mod mesh;
pub mod prelude;
pub mod source;
mod traits;
mod utils;
mod write_vtk;

pub use traits::{Classifier, DataSet, LabeledArray, Renderer};

pub use accessor::{MeshAccessor, MeshOptions, Meshable, PlotError};
pub use array::{Attrs, CoordValues, Coordinate, Coords, DataArray, Dataset, LazyArray, Selection};
pub use array::{Selector, Slab, Variable};
pub use axes::{resolve, AxisMap, AxisOverrides, AxisTag, Evidence};
pub use build::{build, MeshType};
pub use cf::CfClassifier;
pub use convert::mesh_to_dataset;
pub use error::{OutOfRange, ShapeMismatch};
pub use expand::{expand, AxisCoordinate, Centering, ExpandOptions, ExpandedCoordinates};
pub use expand::{SpatialLayout, Topology};
pub use mesh::{Attributes, FieldArray, Mesh, MeshHandle};
pub use mesh::{ImageData, PointCloud, RectilinearGrid, StructuredGrid};
pub use source::{AlgorithmSource, Filter, SourceState, Status, TimeSelector};
pub use write_vtk::{write_vtk, Encoding, VtkFileSink};

pub use ndarray;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("`{name}` was requested as the {axis} axis but is not a coordinate or dimension of the array. Available: {available:?}")]
    InvalidAxis {
        axis: AxisTag,
        name: String,
        available: Vec<String>,
    },
    #[error("could not pick a single {axis} axis (candidates: {candidates:?}); pass the coordinate name explicitly")]
    AmbiguousAxis {
        axis: AxisTag,
        candidates: Vec<String>,
    },
    #[error("the {axis} axis is bound to `{name}` but the array has no coordinate variable of that name")]
    MissingCoordinate { axis: AxisTag, name: String },
    #[error("{0}")]
    ShapeMismatch(#[from] ShapeMismatch),
    #[error("dimension `{dim}` still has length {len}; index it down to a single value before meshing")]
    UnreducedDimension { dim: String, len: usize },
    #[error("{0}")]
    OutOfRange(#[from] OutOfRange),
    #[error("cannot convert a {0} mesh into a dataset")]
    UnsupportedTopology(&'static str),
    #[error("no variable named `{0}` in the dataset")]
    MissingVariable(String),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Could not write XML data: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
    #[cfg(feature = "serde")]
    #[error("Could not (de)serialize source state: `{0}`")]
    State(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
