//! Converting meshes back into labeled datasets.

use crate::array::{Coordinate, Dataset};
use crate::mesh::{Attributes, FieldArray, Mesh};
use crate::prelude::*;

/// Turn a grid mesh back into a [`Dataset`].
///
/// Rectilinear and uniform grids get one dimensional `x`, `y` and `z` coordinates over
/// dimensions of the same name. Structured grids get three dimensional `x`, `y` and `z`
/// coordinates over `(zi, yi, xi)`. Point arrays become variables over the point dimensions
/// (plus `component` for vector arrays), cell arrays variables over `z_cell`, `y_cell` and
/// `x_cell`.
///
/// Point clouds carry no grid structure and fail with [`Error::UnsupportedTopology`].
pub fn mesh_to_dataset(mesh: &Mesh) -> Result<Dataset, Error> {
    let [ni, nj, nk] = mesh.dimensions();

    let (mut dataset, point_dims) = match mesh {
        Mesh::Rectilinear(grid) => (
            Dataset::new()
                .with_coord("x", Coordinate::from_vec("x", grid.x.clone()))
                .with_coord("y", Coordinate::from_vec("y", grid.y.clone()))
                .with_coord("z", Coordinate::from_vec("z", grid.z.clone())),
            ["z", "y", "x"],
        ),
        Mesh::Image(image) => (
            Dataset::new()
                .with_coord("x", Coordinate::from_vec("x", image.axis(0)))
                .with_coord("y", Coordinate::from_vec("y", image.axis(1)))
                .with_coord("z", Coordinate::from_vec("z", image.axis(2))),
            ["z", "y", "x"],
        ),
        Mesh::Structured(grid) => {
            let dims = ["zi", "yi", "xi"];
            let mut dataset = Dataset::new();
            for (name, values) in [("x", grid.x()), ("y", grid.y()), ("z", grid.z())] {
                let values = Array3::from_shape_vec((nk, nj, ni), values)
                    .map_err(|e| ShapeMismatch::of(name, e.to_string()))?;
                dataset = dataset.with_coord(name, Coordinate::from_array(&dims, values)?);
            }
            (dataset, dims)
        }
        Mesh::Points(_) => return Err(Error::UnsupportedTopology("PolyData")),
    };

    dataset
        .attrs
        .insert("mesh_type".into(), mesh.vtk_type().into());

    let cells = [nk, nj, ni].map(|n| if n > 1 { n - 1 } else { 1 });

    dataset = attach(dataset, mesh.point_data(), &point_dims, [nk, nj, ni])?;
    dataset = attach(dataset, mesh.cell_data(), &["z_cell", "y_cell", "x_cell"], cells)?;

    Ok(dataset)
}

fn attach(
    mut dataset: Dataset,
    arrays: &Attributes,
    dims: &[&str; 3],
    shape: [usize; 3],
) -> Result<Dataset, Error> {
    for array in arrays.iter() {
        dataset = attach_one(dataset, array, dims, shape)?;
    }
    Ok(dataset)
}

fn attach_one(
    dataset: Dataset,
    array: &FieldArray,
    dims: &[&str; 3],
    shape: [usize; 3],
) -> Result<Dataset, Error> {
    let mut var_dims = dims.to_vec();
    let mut var_shape = shape.to_vec();
    if array.components > 1 {
        var_dims.push("component");
        var_shape.push(array.components);
    }

    let values = ArrayD::from_shape_vec(IxDyn(&var_shape), array.values.clone())
        .map_err(|e| ShapeMismatch::of(array.name.as_str(), e.to_string()))?;

    dataset.with_variable(&array.name, &var_dims, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{PointCloud, RectilinearGrid, StructuredGrid};

    #[test]
    fn rectilinear_with_vectors() {
        let mut grid = RectilinearGrid::new(vec![0., 1., 3.], vec![0., 2.], vec![5.]);
        grid.point_data.insert(FieldArray::new(
            "uv".into(),
            (0..12).map(f64::from).collect(),
            2,
        ));
        grid.cell_data
            .insert(FieldArray::scalars("area", vec![2., 4.]));

        let dataset = mesh_to_dataset(&Mesh::from(grid)).unwrap();
        assert_eq!(dataset.names().collect::<Vec<_>>(), vec!["area", "uv"]);

        let uv = dataset.variable("uv").unwrap();
        assert_eq!(uv.dims, vec!["z", "y", "x", "component"]);
        assert_eq!(uv.values.shape(), &[1, 2, 3, 2]);
        assert_eq!(uv.values[[0, 1, 2, 1]], 11.);

        let area = dataset.variable("area").unwrap();
        assert_eq!(area.values.shape(), &[1, 1, 2]);
    }

    #[test]
    fn structured_coordinates() {
        let points = vec![0., 0., 0., 1., 0.5, 0., 0., 1., 0., 1., 1.5, 0.];
        let grid = StructuredGrid::new([2, 2, 1], points).unwrap();
        let dataset = mesh_to_dataset(&grid.into()).unwrap();

        let y = dataset.coords.get("y").unwrap();
        assert_eq!(y.dims(), &["zi", "yi", "xi"]);
        assert_eq!(
            y.numeric(1.0).iter().copied().collect::<Vec<_>>(),
            vec![0., 0.5, 1., 1.5]
        );
    }

    #[test]
    fn point_clouds_are_unsupported() {
        let cloud = PointCloud::new(vec![[0., 0., 0.]]);
        assert!(matches!(
            mesh_to_dataset(&cloud.into()),
            Err(Error::UnsupportedTopology("PolyData"))
        ));
    }
}
