//! Turning expanded coordinates and a data array into a [`Mesh`].

use crate::axes::{AxisMap, AxisTag};
use crate::expand::{AxisCoordinate, Centering, ExpandedCoordinates, SpatialLayout, Topology};
use crate::mesh::{FieldArray, ImageData, Mesh, PointCloud, RectilinearGrid, StructuredGrid};
use crate::prelude::*;
use crate::utils;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which kind of mesh to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MeshType {
    /// the cheapest mesh type the coordinates allow
    #[default]
    Auto,
    Uniform,
    Rectilinear,
    Structured,
    /// every expanded point as an unconnected vertex
    Points,
}

impl From<Topology> for MeshType {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::Uniform => MeshType::Uniform,
            Topology::Rectilinear => MeshType::Rectilinear,
            Topology::Structured => MeshType::Structured,
        }
    }
}

/// Build the geometry described by `coords` and attach the values of `data` to it.
///
/// `data` must be laid out like the array `coords` were expanded from: every dimension that is
/// neither spatial nor the component axis has to be reduced to length one.
pub fn build(
    coords: &ExpandedCoordinates,
    axes: &AxisMap,
    data: &DataArray,
    mesh_type: MeshType,
) -> Result<Mesh, Error> {
    let layout = coords.layout();
    let component = component_dim(data, axes);
    let (values, components) = flatten_values(data, layout, component.as_deref())?;

    let target = match mesh_type {
        MeshType::Auto => MeshType::from(coords.topology()),
        forced => forced,
    };

    let mut mesh: Mesh = match target {
        MeshType::Auto | MeshType::Uniform => uniform(coords)?.into(),
        MeshType::Rectilinear => rectilinear(coords)?.into(),
        MeshType::Structured => {
            debug!(n_points = coords.n_points(), "copying structured grid points");
            StructuredGrid::new(coords.dimensions(), interleaved_points(coords))?.into()
        }
        MeshType::Points => {
            if layout.centering() == Centering::Cell {
                return Err(ShapeMismatch::of(
                    data.name().unwrap_or("data"),
                    "cell centered data cannot be attached to a point cloud",
                )
                .into());
            }
            PointCloud::from_interleaved(interleaved_points(coords))?.into()
        }
    };

    let name = data.name().unwrap_or("data").to_string();
    let array = FieldArray::new(name, values, components);

    match layout.centering() {
        Centering::Point => mesh.point_data_mut().insert(array),
        Centering::Cell => mesh.cell_data_mut().insert(array),
    }

    Ok(mesh)
}

/// the dimension holding the components, if the component axis is bound and present
pub(crate) fn component_dim<A>(array: &A, axes: &AxisMap) -> Option<String>
where
    A: LabeledArray + ?Sized,
{
    crate::axes::dim_of(array, axes.get(AxisTag::Component)?)
}

/// Fail with [`Error::UnreducedDimension`] if a dimension left over by `selection` would need
/// to be reduced before building. Only metadata is read.
pub(crate) fn check_reduced<A>(
    array: &A,
    layout: &SpatialLayout,
    component: Option<&str>,
    selection: &Selection,
) -> Result<(), Error>
where
    A: LabeledArray + ?Sized,
{
    for (dim, &len) in array.dims().iter().zip(array.shape()) {
        if matches!(selection.get(dim), Some(Selector::Index(_))) {
            continue;
        }
        if layout.slot_of(dim).is_some() || component == Some(dim.as_str()) || len <= 1 {
            continue;
        }
        return Err(Error::UnreducedDimension {
            dim: dim.clone(),
            len,
        });
    }
    Ok(())
}

/// one direction of an axis aligned grid: the coordinate values along direction `direction`
fn aligned_axis(coords: &ExpandedCoordinates, direction: usize) -> Result<Vec<f64>, Error> {
    let n = coords.dimensions()[direction];
    let tag = AxisTag::SPATIAL[direction];

    match &coords.axes()[direction] {
        AxisCoordinate::Constant(value) if n == 1 => Ok(vec![*value]),
        AxisCoordinate::Edges { slot, values } if *slot == direction => Ok(values.to_vec()),
        _ => Err(ShapeMismatch::of(
            tag.to_string(),
            "coordinate is not aligned with a grid direction, use a structured mesh",
        )
        .into()),
    }
}

fn rectilinear(coords: &ExpandedCoordinates) -> Result<RectilinearGrid, Error> {
    Ok(RectilinearGrid::new(
        aligned_axis(coords, 0)?,
        aligned_axis(coords, 1)?,
        aligned_axis(coords, 2)?,
    ))
}

fn uniform(coords: &ExpandedCoordinates) -> Result<ImageData, Error> {
    let mut origin = [0.0; 3];
    let mut spacing = [1.0; 3];

    for direction in 0..3 {
        let values = aligned_axis(coords, direction)?;
        let (o, s) = utils::uniform_spacing(&values).ok_or_else(|| {
            ShapeMismatch::of(
                AxisTag::SPATIAL[direction].to_string(),
                "coordinate is not evenly spaced",
            )
        })?;
        origin[direction] = o;
        spacing[direction] = s;
    }

    Ok(ImageData::new(coords.dimensions(), origin, spacing))
}

/// `x0, y0, z0, x1, ...` over every point in `i` fastest order
fn interleaved_points(coords: &ExpandedCoordinates) -> Vec<f64> {
    let [ni, nj, nk] = coords.dimensions();
    let axes = coords.axes();
    let mut points = Vec::with_capacity(3 * ni * nj * nk);

    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                let ijk = [i, j, k];
                points.extend(axes.iter().map(|axis| axis.at(ijk)));
            }
        }
    }

    points
}

#[derive(Clone, Copy)]
enum DimRole {
    Slot(usize),
    Component,
    Single,
}

/// Flatten `array` into the `(k, j, i, component)` order of the mesh, component fastest.
///
/// Returns the values and the number of components.
pub(crate) fn flatten_values(
    array: &DataArray,
    layout: &SpatialLayout,
    component: Option<&str>,
) -> Result<(Vec<f64>, usize), Error> {
    let data_shape = layout.data_shape();
    let mut components = 1;

    let roles = array
        .dims()
        .iter()
        .zip(array.shape())
        .map(|(dim, &len)| {
            if let Some(slot) = layout.slot_of(dim) {
                if len != data_shape[slot] {
                    return Err(Error::from(ShapeMismatch::of(
                        dim.as_str(),
                        format!("data has length {len}, the mesh expects {}", data_shape[slot]),
                    )));
                }
                Ok(DimRole::Slot(slot))
            } else if component == Some(dim.as_str()) {
                components = len;
                Ok(DimRole::Component)
            } else if len == 1 {
                Ok(DimRole::Single)
            } else {
                Err(Error::UnreducedDimension {
                    dim: dim.clone(),
                    len,
                })
            }
        })
        .collect::<Result<Vec<DimRole>, Error>>()?;

    let values = array.values();
    let [ni, nj, nk] = data_shape;
    let mut index = vec![0; roles.len()];

    let flat = Array4::from_shape_fn((nk, nj, ni, components), |(k, j, i, c)| {
        let ijk = [i, j, k];
        for (slot, role) in index.iter_mut().zip(&roles) {
            *slot = match role {
                DimRole::Slot(s) => ijk[*s],
                DimRole::Component => c,
                DimRole::Single => 0,
            };
        }
        values[index.as_slice()]
    });

    Ok((flat.into_raw_vec(), components))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::{expand, ExpandOptions};
    use crate::{resolve, AxisOverrides, CfClassifier};

    fn resolved(array: &DataArray) -> (AxisMap, ExpandedCoordinates) {
        let axes = resolve(array, &AxisOverrides::default(), &CfClassifier::default()).unwrap();
        let coords = expand(array, &axes, &ExpandOptions::default()).unwrap();
        (axes, coords)
    }

    fn rgb_image() -> DataArray {
        let values = Array3::from_shape_fn((3, 2, 4), |(b, y, x)| (100 * b + 10 * y + x) as f64);
        DataArray::new(&["band", "y", "x"], values)
            .unwrap()
            .with_name("image")
            .with_coord("x", Coordinate::from_vec("x", vec![0., 1., 2., 3.]))
            .with_coord("y", Coordinate::from_vec("y", vec![0., 1.]))
    }

    #[test]
    fn components_are_interleaved() {
        let array = rgb_image();
        let (axes, coords) = resolved(&array);
        let mesh = build(&coords, &axes, &array, MeshType::Auto).unwrap();

        assert!(matches!(mesh, Mesh::Image(_)));
        let field = mesh.point_data().get("image").unwrap();
        assert_eq!(field.components, 3);
        assert_eq!(field.len(), 8);
        // point 5 is (i = 1, j = 1)
        assert_eq!(
            (0..3).map(|c| field.get(5, c).unwrap()).collect::<Vec<_>>(),
            vec![11., 111., 211.]
        );
    }

    #[test]
    fn forced_types() {
        let array = rgb_image();
        let (axes, coords) = resolved(&array);

        let grid = build(&coords, &axes, &array, MeshType::Rectilinear).unwrap();
        let structured = build(&coords, &axes, &array, MeshType::Structured).unwrap();
        let cloud = build(&coords, &axes, &array, MeshType::Points).unwrap();

        assert_eq!(grid.points(), structured.points());
        assert_eq!(grid.points(), cloud.points());
        assert_eq!(cloud.n_cells(), 8);
        assert_eq!(structured.vtk_type(), "StructuredGrid");
    }

    #[test]
    fn uniform_refused_for_uneven_spacing() {
        let array = rgb_image().with_coord("x", Coordinate::from_vec("x", vec![0., 1., 2., 5.]));
        let (axes, coords) = resolved(&array);
        assert!(matches!(
            build(&coords, &axes, &array, MeshType::Uniform),
            Err(Error::ShapeMismatch(_))
        ));
        assert!(matches!(
            build(&coords, &axes, &array, MeshType::Auto),
            Ok(Mesh::Rectilinear(_))
        ));
    }

    #[test]
    fn unreduced_time() {
        let array = DataArray::new(&["time", "y", "x"], Array3::<f64>::zeros((2, 2, 2)))
            .unwrap()
            .with_coord("x", Coordinate::from_vec("x", vec![0., 1.]))
            .with_coord("y", Coordinate::from_vec("y", vec![0., 1.]));
        let (axes, coords) = resolved(&array);

        match build(&coords, &axes, &array, MeshType::Auto) {
            Err(Error::UnreducedDimension { dim, len }) => {
                assert_eq!(dim, "time");
                assert_eq!(len, 2);
            }
            other => panic!("expected an unreduced time dimension, got {other:?}"),
        }
    }

    #[test]
    fn cell_data() {
        let array = DataArray::new(&["y", "x"], Array2::from_shape_fn((2, 3), |(y, x)| (10 * y + x) as f64))
            .unwrap()
            .with_coord("x", Coordinate::from_vec("x", vec![0., 1., 2., 4.]))
            .with_coord("y", Coordinate::from_vec("y", vec![0., 1., 2.]));
        let axes = resolve(&array, &AxisOverrides::default(), &CfClassifier::default()).unwrap();
        let options = ExpandOptions {
            centering: Centering::Cell,
            ..Default::default()
        };
        let coords = expand(&array, &axes, &options).unwrap();
        let mesh = build(&coords, &axes, &array, MeshType::Auto).unwrap();

        assert_eq!(mesh.dimensions(), [4, 3, 1]);
        assert_eq!(mesh.n_cells(), 6);
        let field = mesh.cell_data().get("data").unwrap();
        assert_eq!(field.values, vec![0., 1., 2., 10., 11., 12.]);
        assert!(mesh.point_data().is_empty());

        assert!(build(&coords, &axes, &array, MeshType::Points).is_err());
    }
}
