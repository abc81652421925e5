//! # Lazy algorithm source
//!
//! [`AlgorithmSource`] keeps the settings of an interactive view over a (possibly huge) labeled
//! array: which time step, which resolution, which vertical level. Changing a setting only
//! marks the source dirty; the mesh is rebuilt on the next pull ([`AlgorithmSource::update`])
//! and only the block needed for that mesh is ever materialized.
//!
//! The output lives behind a [`MeshHandle`] created once with the source. Every rebuild replaces
//! the mesh behind the handle, so a renderer holding the handle always sees the latest mesh.

use crate::accessor::{MeshOptions, PlotError};
use crate::array::{Dataset, Selection, Selector, Slab};
use crate::axes::{self, AxisMap, AxisOverrides, AxisTag};
use crate::build::{self, MeshType};
use crate::expand::{self, Centering};
use crate::mesh::{FieldArray, Mesh, MeshHandle};
use crate::prelude::*;
use crate::utils;
use crate::{CfClassifier, Classifier, Renderer};

use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dirty tracking state of an [`AlgorithmSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// the output matches the settings
    Clean,
    /// a setting changed since the last successful rebuild
    Dirty,
    Rebuilding,
}

/// The settings of an [`AlgorithmSource`]. Serializable with the `serde` feature so that a view
/// can be saved and restored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SourceState {
    pub mesh: MeshOptions,
    pub time_index: usize,
    /// fraction of the points kept along every spatial direction, in `(0, 1]`
    pub resolution: f64,
    /// a single vertical level to show
    pub z_index: Option<usize>,
    /// explicit slabs per dimension, used instead of `resolution` when set
    pub slicing: Option<BTreeMap<String, Slab>>,
    /// variables of the companion dataset attached as extra arrays
    pub arrays: Vec<String>,
}

impl Default for SourceState {
    fn default() -> Self {
        Self {
            mesh: MeshOptions::default(),
            time_index: 0,
            resolution: 1.0,
            z_index: None,
            slicing: None,
            arrays: Vec::new(),
        }
    }
}

impl SourceState {
    pub fn with_mesh(mut self, mesh: MeshOptions) -> Self {
        self.mesh = mesh;
        self
    }

    pub fn with_time_index(mut self, time_index: usize) -> Self {
        self.time_index = time_index;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_z_index(mut self, z_index: usize) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn with_slicing(mut self, slicing: BTreeMap<String, Slab>) -> Self {
        self.slicing = Some(slicing);
        self
    }

    pub fn with_arrays(mut self, arrays: Vec<String>) -> Self {
        self.arrays = arrays;
        self
    }

    /// step taken along every spatial dimension for the current resolution
    pub fn stride(&self) -> usize {
        ((1.0 / self.resolution).round() as usize).max(1)
    }

    /// the state as pretty printed JSON
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// parse a state saved with [`SourceState::to_json`]. Missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

/// How to pick a time step
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSelector {
    Index(usize),
    /// the step whose numeric time coordinate is closest
    Value(f64),
    /// the step whose label matches exactly
    Label(String),
}

impl From<usize> for TimeSelector {
    fn from(idx: usize) -> Self {
        TimeSelector::Index(idx)
    }
}

impl From<f64> for TimeSelector {
    fn from(value: f64) -> Self {
        TimeSelector::Value(value)
    }
}

impl From<&str> for TimeSelector {
    fn from(label: &str) -> Self {
        TimeSelector::Label(label.to_string())
    }
}

impl From<String> for TimeSelector {
    fn from(label: String) -> Self {
        TimeSelector::Label(label)
    }
}

/// A step run on every freshly built mesh, in the order the filters were added
pub type Filter = Rc<dyn Fn(Mesh) -> Result<Mesh, Error>>;

/// Lazily rebuilt mesh over a labeled array. See the [module documentation](self).
pub struct AlgorithmSource<A, C = CfClassifier> {
    array: A,
    classifier: C,
    companion: Option<Dataset>,
    state: RefCell<SourceState>,
    status: Cell<Status>,
    requeued: Cell<bool>,
    filters: RefCell<Vec<Filter>>,
    output: MeshHandle,
}

impl<A: LabeledArray> AlgorithmSource<A> {
    pub fn new(array: A) -> Self {
        Self::with_classifier(array, CfClassifier::default())
    }
}

impl<A, C> AlgorithmSource<A, C>
where
    A: LabeledArray,
    C: Classifier,
{
    pub fn with_classifier(array: A, classifier: C) -> Self {
        Self {
            array,
            classifier,
            companion: None,
            state: RefCell::new(SourceState::default()),
            status: Cell::new(Status::Dirty),
            requeued: Cell::new(false),
            filters: RefCell::new(Vec::new()),
            output: Rc::new(RefCell::new(Mesh::default())),
        }
    }

    /// start from `state`, which is validated first
    pub fn with_state(self, state: SourceState) -> Result<Self, Error> {
        self.set_state(state)?;
        Ok(self)
    }

    /// dataset whose variables can be attached next to the main array, see
    /// [`SourceState::arrays`]
    pub fn with_companion(mut self, dataset: Dataset) -> Self {
        self.companion = Some(dataset);
        self.mark_dirty();
        self
    }

    pub fn array(&self) -> &A {
        &self.array
    }

    pub fn status(&self) -> Status {
        self.status.get()
    }

    /// a copy of the current settings
    pub fn state(&self) -> SourceState {
        self.state.borrow().clone()
    }

    /// the shared output mesh. It is empty until the first successful rebuild.
    pub fn output(&self) -> MeshHandle {
        Rc::clone(&self.output)
    }

    /// Flag the output as stale. During a rebuild the flag is kept for after the rebuild, so
    /// the source ends up dirty again.
    pub fn mark_dirty(&self) {
        if self.status.get() == Status::Rebuilding {
            self.requeued.set(true);
        } else {
            self.status.set(Status::Dirty);
        }
    }

    /// validate `state` against the array and replace the current settings with it
    pub fn set_state(&self, state: SourceState) -> Result<(), Error> {
        self.validate(&state)?;
        *self.state.borrow_mut() = state;
        self.mark_dirty();
        Ok(())
    }

    /// apply `change` to a copy of the settings and keep it only if it validates
    fn modify<F: FnOnce(&mut SourceState)>(&self, change: F) -> Result<(), Error> {
        let mut state = self.state();
        change(&mut state);
        self.set_state(state)
    }

    pub fn set_time<T: Into<TimeSelector>>(&self, time: T) -> Result<(), Error> {
        let idx = self.time_index_of(&time.into())?;
        self.modify(|state| state.time_index = idx)
    }

    pub fn set_resolution(&self, resolution: f64) -> Result<(), Error> {
        self.modify(|state| state.resolution = resolution)
    }

    pub fn set_z_index(&self, z_index: Option<usize>) -> Result<(), Error> {
        self.modify(|state| state.z_index = z_index)
    }

    pub fn set_slicing(&self, slicing: Option<BTreeMap<String, Slab>>) -> Result<(), Error> {
        self.modify(|state| state.slicing = slicing)
    }

    pub fn set_axes(&self, axes: AxisOverrides) -> Result<(), Error> {
        self.modify(|state| state.mesh.axes = axes)
    }

    pub fn set_mesh_type(&self, mesh_type: MeshType) -> Result<(), Error> {
        self.modify(|state| state.mesh.mesh_type = mesh_type)
    }

    pub fn set_centering(&self, centering: Centering) -> Result<(), Error> {
        self.modify(|state| state.mesh.centering = centering)
    }

    pub fn set_arrays(&self, arrays: Vec<String>) -> Result<(), Error> {
        self.modify(|state| state.arrays = arrays)
    }

    pub fn add_filter<F>(&self, filter: F)
    where
        F: Fn(Mesh) -> Result<Mesh, Error> + 'static,
    {
        self.filters.borrow_mut().push(Rc::new(filter));
        self.mark_dirty();
    }

    pub fn clear_filters(&self) {
        self.filters.borrow_mut().clear();
        self.mark_dirty();
    }

    /// restore settings saved with [`AlgorithmSource::to_json`]
    #[cfg(feature = "serde")]
    pub fn load_state(&self, json: &str) -> Result<(), Error> {
        self.set_state(SourceState::from_json(json)?)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, Error> {
        self.state.borrow().to_json()
    }

    /// resolve the axes for the current overrides
    pub fn axes(&self) -> Result<AxisMap, Error> {
        axes::resolve(&self.array, &self.state.borrow().mesh.axes, &self.classifier)
    }

    /// the dimension of the time axis, if the array has one
    fn time_dim(&self, axes: &AxisMap) -> Option<String> {
        axes::dim_of(&self.array, axes.get(AxisTag::Time)?)
    }

    /// number of time steps, `1` for an array without time axis
    fn time_len(&self, axes: &AxisMap) -> usize {
        self.time_dim(axes)
            .and_then(|dim| self.array.dim_len(&dim))
            .unwrap_or(1)
    }

    /// largest valid time index
    pub fn max_time_index(&self) -> Result<usize, Error> {
        Ok(self.time_len(&self.axes()?).saturating_sub(1))
    }

    /// a label for every time step, empty for an array without time axis
    pub fn time_labels(&self) -> Result<Vec<String>, Error> {
        let axes = self.axes()?;
        let name = match axes.get(AxisTag::Time) {
            Some(name) => name,
            None => return Ok(Vec::new()),
        };

        match self.array.coord(name) {
            Some(coord) if coord.ndim() == 1 => Ok(coord.display_labels()),
            _ => Ok((0..self.time_len(&axes)).map(|t| t.to_string()).collect()),
        }
    }

    /// label of the current time step
    pub fn time_label(&self) -> Result<Option<String>, Error> {
        let idx = self.state.borrow().time_index;
        Ok(self.time_labels()?.into_iter().nth(idx))
    }

    fn time_index_of(&self, time: &TimeSelector) -> Result<usize, Error> {
        match time {
            TimeSelector::Index(idx) => Ok(*idx),
            TimeSelector::Value(value) => {
                let axes = self.axes()?;
                let coord = axes
                    .get(AxisTag::Time)
                    .and_then(|name| self.array.coord(name))
                    .filter(|coord| coord.ndim() == 1 && coord.is_numeric());

                coord
                    .and_then(|coord| utils::nearest_index(coord.numeric(1.0).iter().copied(), *value))
                    .ok_or_else(|| {
                        OutOfRange::new(
                            "time".into(),
                            value.to_string(),
                            "a numeric time coordinate".into(),
                        )
                        .into()
                    })
            }
            TimeSelector::Label(label) => {
                let labels = self.time_labels()?;
                labels.iter().position(|l| l == label).ok_or_else(|| {
                    OutOfRange::new("time".into(), label.clone(), format!("{labels:?}")).into()
                })
            }
        }
    }

    fn validate(&self, state: &SourceState) -> Result<(), Error> {
        if !(state.resolution > 0.0 && state.resolution <= 1.0) {
            return Err(OutOfRange::new(
                "resolution".into(),
                state.resolution.to_string(),
                "(0, 1]".into(),
            )
            .into());
        }

        let axes = axes::resolve(&self.array, &state.mesh.axes, &self.classifier)?;

        let steps = self.time_len(&axes);
        if state.time_index >= steps {
            return Err(OutOfRange::index("time_index", state.time_index, steps).into());
        }

        if let Some(z_index) = state.z_index {
            let levels = self.z_dim(&axes)?.1;
            if z_index >= levels {
                return Err(OutOfRange::index("z_index", z_index, levels).into());
            }
        }

        if let Some(slicing) = &state.slicing {
            for (dim, slab) in slicing {
                let len = self.array.dim_len(dim).ok_or_else(|| {
                    ShapeMismatch::of(dim.as_str(), "sliced dimension does not exist")
                })?;
                slab.indices(len)?;
            }
        }

        Ok(())
    }

    /// dimension and length of the vertical axis
    fn z_dim(&self, axes: &AxisMap) -> Result<(String, usize), Error> {
        let name = axes.get(AxisTag::Z).ok_or_else(|| Error::AmbiguousAxis {
            axis: AxisTag::Z,
            candidates: Vec::new(),
        })?;

        let dim = axes::dim_of(&self.array, name).ok_or_else(|| {
            ShapeMismatch::of(name, "a vertical index needs a one dimensional Z coordinate")
        })?;
        let len = self.array.dim_len(&dim).unwrap_or(1);
        Ok((dim, len))
    }

    /// Rebuild the output if any setting changed since the last rebuild.
    ///
    /// Returns whether a rebuild ran. On failure the source stays dirty and the output keeps
    /// the last good mesh.
    pub fn rebuild_if_dirty(&self) -> Result<bool, Error> {
        if self.status.get() == Status::Clean {
            return Ok(false);
        }

        self.status.set(Status::Rebuilding);
        self.requeued.set(false);

        let state = self.state();
        let filters: Vec<Filter> = self.filters.borrow().clone();

        match self.generate(&state, &filters) {
            Ok(mesh) => {
                info!(
                    n_points = mesh.n_points(),
                    n_cells = mesh.n_cells(),
                    time_index = state.time_index,
                    "rebuilt mesh"
                );
                *self.output.borrow_mut() = mesh;

                let next = if self.requeued.get() {
                    Status::Dirty
                } else {
                    Status::Clean
                };
                self.status.set(next);
                Ok(true)
            }
            Err(err) => {
                error!(%err, "rebuilding the mesh failed");
                self.status.set(Status::Dirty);
                Err(err)
            }
        }
    }

    /// bring the output up to date and return its handle
    pub fn update(&self) -> Result<MeshHandle, Error> {
        self.rebuild_if_dirty()?;
        Ok(self.output())
    }

    /// bring the output up to date and return a copy of it
    pub fn apply(&self) -> Result<Mesh, Error> {
        self.rebuild_if_dirty()?;
        Ok(self.output.borrow().clone())
    }

    /// bring the output up to date and hand it to `renderer`
    pub fn render<R: Renderer>(
        &self,
        renderer: &mut R,
        options: &R::Options,
    ) -> Result<(), PlotError<R::Error>> {
        self.rebuild_if_dirty()?;
        renderer
            .render(&self.output.borrow(), options)
            .map_err(PlotError::Render)
    }

    /// `[min, max]` of the main array of the up to date output
    pub fn data_range(&self) -> Result<Option<[f64; 2]>, Error> {
        self.rebuild_if_dirty()?;
        let name = self.array.name().unwrap_or("data");
        let mesh = self.output.borrow();
        let array = mesh
            .point_data()
            .get(name)
            .or_else(|| mesh.cell_data().get(name));
        Ok(array.and_then(|a| a.range(None)))
    }

    fn generate(&self, state: &SourceState, filters: &[Filter]) -> Result<Mesh, Error> {
        let axes = axes::resolve(&self.array, &state.mesh.axes, &self.classifier)?;
        let mut selection = Selection::new();

        match self.time_dim(&axes) {
            Some(dim) => {
                let steps = self.array.dim_len(&dim).unwrap_or(1);
                if state.time_index >= steps {
                    return Err(OutOfRange::index("time_index", state.time_index, steps).into());
                }
                selection.insert(dim, Selector::Index(state.time_index));
            }
            None if state.time_index > 0 => {
                return Err(OutOfRange::index("time_index", state.time_index, 1).into());
            }
            None => (),
        }
        let axes = axes.without(AxisTag::Time);

        if let Some(z_index) = state.z_index {
            let (dim, levels) = self.z_dim(&axes)?;
            if z_index >= levels {
                return Err(OutOfRange::index("z_index", z_index, levels).into());
            }
            selection.insert(dim, Selector::Index(z_index));
        }

        let layout = expand::layout(&self.array, &axes, state.mesh.centering)?;
        let mut options = state.mesh.expand_options();

        let slabs: Vec<(String, Slab)> = match &state.slicing {
            Some(slicing) => slicing.iter().map(|(d, s)| (d.clone(), *s)).collect(),
            None => {
                let stride = state.stride();
                layout
                    .slots()
                    .iter()
                    .flatten()
                    .filter(|dim| stride > 1 && !selection.contains_key(**dim))
                    .map(|dim| (dim.to_string(), Slab::every(stride)))
                    .collect()
            }
        };

        for (dim, slab) in slabs {
            // non-numeric coordinates along a sampled dimension keep their true spacing
            for (name, coord) in self.array.coords() {
                if !coord.is_numeric() && coord.dims().first() == Some(&dim) {
                    let scale = options.scale(name) * slab.step as f64;
                    options.scales.insert(name.clone(), scale);
                }
            }
            selection.insert(dim, Selector::Slab(slab));
        }

        let component = build::component_dim(&self.array, &axes);
        build::check_reduced(&self.array, &layout, component.as_deref(), &selection)?;

        let data = self.array.materialize(&selection)?;
        let coords = expand::expand(&data, &axes, &options)?;
        let mut mesh = build::build(&coords, &axes, &data, state.mesh.mesh_type)?;

        for name in &state.arrays {
            let companion = self
                .companion
                .as_ref()
                .ok_or_else(|| Error::MissingVariable(name.clone()))?;
            let extra = companion.data_array(name)?;

            let mut dims: Vec<&String> = extra.dims().iter().collect();
            let mut expected: Vec<&String> = self.array.dims().iter().collect();
            dims.sort();
            expected.sort();
            if dims != expected {
                warn!(array = %name, dims = ?extra.dims(), "skipping companion array with different dimensions");
                continue;
            }

            let extra = extra.materialize(&selection)?;
            let (values, components) =
                build::flatten_values(&extra, coords.layout(), component.as_deref())?;
            let field = FieldArray::new(name.clone(), values, components);

            match state.mesh.centering {
                Centering::Point => mesh.point_data_mut().insert(field),
                Centering::Cell => mesh.cell_data_mut().insert(field),
            }
        }

        for filter in filters {
            mesh = filter(mesh)?;
        }

        Ok(mesh)
    }
}

impl<A, C> fmt::Display for AlgorithmSource<A, C>
where
    A: LabeledArray,
    C: Classifier,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();

        writeln!(f, "AlgorithmSource:")?;
        writeln!(f, "  array: {}", self.array.name().unwrap_or("<unnamed>"))?;
        writeln!(f, "  dims: {:?} {:?}", self.array.dims(), self.array.shape())?;

        match self.axes() {
            Ok(axes) => {
                let bound: Vec<String> = axes
                    .iter()
                    .map(|(tag, name)| format!("{tag}={name}"))
                    .collect();
                writeln!(f, "  axes: {}", bound.join(" "))?;
                writeln!(
                    f,
                    "  time_index: {} of {}",
                    state.time_index,
                    self.time_len(&axes)
                )?;
            }
            Err(err) => writeln!(f, "  axes: {err}")?,
        }

        writeln!(f, "  resolution: {}", state.resolution)?;
        if let Some(z_index) = state.z_index {
            writeln!(f, "  z_index: {z_index}")?;
        }
        if let Some(slicing) = &state.slicing {
            writeln!(f, "  slicing: {slicing:?}")?;
        }
        writeln!(f, "  mesh_type: {:?}", state.mesh.mesh_type)?;
        write!(f, "  status: {:?}", self.status.get())
    }
}

impl<A, C> fmt::Debug for AlgorithmSource<A, C>
where
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmSource")
            .field("array", &self.array)
            .field("state", &self.state.borrow())
            .field("status", &self.status.get())
            .field("filters", &self.filters.borrow().len())
            .finish()
    }
}
