//! Common traits and types that are useful for working with `xvtk`
#![allow(unused_imports)]

pub use crate::traits::{Classifier, DataSet, LabeledArray, Renderer};

pub use crate::accessor::{MeshAccessor, MeshOptions, Meshable};
pub use crate::array::{Coordinate, DataArray, Dataset, LazyArray, Selection, Selector, Slab};
pub use crate::axes::{AxisOverrides, AxisTag};
pub use crate::build::MeshType;
pub use crate::expand::{Centering, Topology};
pub use crate::mesh::{Mesh, MeshHandle};
pub use crate::source::{AlgorithmSource, SourceState, TimeSelector};

pub(crate) use crate::error::{OutOfRange, ShapeMismatch};
pub(crate) use crate::Error;

pub(crate) use std::cell::{Cell, RefCell};
pub(crate) use std::collections::BTreeMap;
pub(crate) use std::io::Write;

pub(crate) use derive_more::{Constructor, Deref, DerefMut};
pub(crate) use tracing::{debug, error, info, warn};

pub(crate) use ndarray::{Array, Array1, Array2, Array3, Array4, ArrayD, Dimension, IxDyn};
pub(crate) use num_traits::ToPrimitive;
