//! The user facing entry point: [`MeshAccessor`] and the [`Meshable`] extension trait.

use crate::axes::{self, AxisMap, AxisOverrides};
use crate::build::{self, MeshType};
use crate::expand::{self, Centering, ExpandOptions, ExpandedCoordinates, Topology};
use crate::prelude::*;
use crate::source::{AlgorithmSource, SourceState};
use crate::{CfClassifier, Classifier, Renderer};

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything that decides how an array is turned into a mesh
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeshOptions {
    pub axes: AxisOverrides,
    pub mesh_type: MeshType,
    pub centering: Centering,
    /// spacing given to non-numeric coordinates, by coordinate name
    pub scales: BTreeMap<String, f64>,
}

impl MeshOptions {
    pub fn with_axes(mut self, axes: AxisOverrides) -> Self {
        self.axes = axes;
        self
    }

    pub fn with_mesh_type(mut self, mesh_type: MeshType) -> Self {
        self.mesh_type = mesh_type;
        self
    }

    pub fn with_centering(mut self, centering: Centering) -> Self {
        self.centering = centering;
        self
    }

    pub fn with_scale<S: Into<String>>(mut self, coordinate: S, scale: f64) -> Self {
        self.scales.insert(coordinate.into(), scale);
        self
    }

    pub(crate) fn expand_options(&self) -> ExpandOptions {
        ExpandOptions {
            centering: self.centering,
            scales: self.scales.clone(),
        }
    }
}

/// Failure of [`MeshAccessor::plot`]: either the mesh could not be built or the renderer failed
#[derive(thiserror::Error, Debug)]
pub enum PlotError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Mesh(#[from] Error),
    #[error("renderer failed: {0}")]
    Render(#[source] E),
}

/// Mesh building view over one labeled array.
///
/// Resolved axes are cached per set of overrides, everything else is recomputed on every call
/// so that the accessor never holds on to data.
pub struct MeshAccessor<'a, A: ?Sized, C = CfClassifier> {
    array: &'a A,
    classifier: C,
    cache: RefCell<HashMap<AxisOverrides, AxisMap>>,
}

impl<'a, A> MeshAccessor<'a, A>
where
    A: LabeledArray + ?Sized,
{
    pub fn new(array: &'a A) -> Self {
        Self {
            array,
            classifier: CfClassifier::default(),
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl<'a, A, C> MeshAccessor<'a, A, C>
where
    A: LabeledArray + ?Sized,
    C: Classifier,
{
    /// use another axis classifier. Cached axes are discarded.
    pub fn with_classifier<D: Classifier>(self, classifier: D) -> MeshAccessor<'a, A, D> {
        MeshAccessor {
            array: self.array,
            classifier,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn array(&self) -> &'a A {
        self.array
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// resolve the axes of the array
    pub fn axes(&self, overrides: &AxisOverrides) -> Result<AxisMap, Error> {
        if let Some(map) = self.cache.borrow().get(overrides) {
            return Ok(map.clone());
        }

        let map = axes::resolve(self.array, overrides, &self.classifier)?;
        self.cache
            .borrow_mut()
            .insert(overrides.clone(), map.clone());
        Ok(map)
    }

    /// the topology the coordinates allow, read from metadata only
    pub fn topology(&self, options: &MeshOptions) -> Result<Topology, Error> {
        let axes = self.axes(&options.axes)?;
        expand::topology(self.array, &axes, &options.expand_options())
    }

    /// the spatial coordinates expanded to the mesh points
    pub fn coordinates(&self, options: &MeshOptions) -> Result<ExpandedCoordinates, Error> {
        let axes = self.axes(&options.axes)?;
        expand::expand(self.array, &axes, &options.expand_options())
    }

    /// Build a mesh of the whole array.
    ///
    /// Dimensions that are neither spatial nor the component axis must have length one. This is
    /// checked before any value is loaded.
    pub fn mesh(&self, options: &MeshOptions) -> Result<Mesh, Error> {
        let axes = self.axes(&options.axes)?;
        let layout = expand::layout(self.array, &axes, options.centering)?;
        let component = build::component_dim(self.array, &axes);
        build::check_reduced(self.array, &layout, component.as_deref(), &Selection::new())?;

        let data = self.array.load()?;
        let coords = expand::expand(&data, &axes, &options.expand_options())?;
        build::build(&coords, &axes, &data, options.mesh_type)
    }

    /// build a mesh and hand it to `renderer`
    pub fn plot<R: Renderer>(
        &self,
        options: &MeshOptions,
        renderer: &mut R,
        render_options: &R::Options,
    ) -> Result<(), PlotError<R::Error>> {
        let mesh = self.mesh(options)?;
        renderer
            .render(&mesh, render_options)
            .map_err(PlotError::Render)
    }

    /// a lazy source over the array, starting from `state`
    pub fn algorithm(&self, state: SourceState) -> Result<AlgorithmSource<&'a A, C>, Error>
    where
        C: Clone,
    {
        AlgorithmSource::with_classifier(self.array, self.classifier.clone()).with_state(state)
    }
}

/// Adds [`Meshable::mesh_accessor`] to every [`LabeledArray`]
pub trait Meshable: LabeledArray {
    fn mesh_accessor(&self) -> MeshAccessor<'_, Self> {
        MeshAccessor::new(self)
    }
}

impl<T: LabeledArray + ?Sized> Meshable for T {}
