use approx::assert_abs_diff_eq;
use ndarray::{Array2, Array3};

use xvtk::prelude::*;
use xvtk::{mesh_to_dataset, Error, FieldArray, PointCloud};

fn remesh(mesh: &Mesh, name: &str) -> Mesh {
    let dataset = mesh_to_dataset(mesh).unwrap();
    let array = dataset.data_array(name).unwrap();
    array.mesh_accessor().mesh(&MeshOptions::default()).unwrap()
}

#[test]
fn rectilinear_round_trip() {
    let values = Array3::from_shape_fn((2, 3, 4), |(k, j, i)| (k * 12 + j * 4 + i) as f64);
    let array = DataArray::new(&["depth", "lat", "lon"], values)
        .unwrap()
        .with_name("temp")
        .with_coord("lon", Coordinate::from_vec("lon", vec![0., 1., 2.5, 4.]))
        .with_coord("lat", Coordinate::from_vec("lat", vec![30., 20., 10.]))
        .with_coord("depth", Coordinate::from_vec("depth", vec![0., 5.]));

    let mesh = array.mesh_accessor().mesh(&MeshOptions::default()).unwrap();
    assert!(matches!(mesh, Mesh::Rectilinear(_)));

    let dataset = mesh_to_dataset(&mesh).unwrap();
    assert_eq!(dataset.attrs.get("mesh_type").map(String::as_str), Some("RectilinearGrid"));
    assert_eq!(dataset.variable("temp").unwrap().dims, vec!["z", "y", "x"]);

    assert_eq!(remesh(&mesh, "temp"), mesh);
}

#[test]
fn uniform_round_trip() {
    let values = Array2::from_shape_fn((5, 7), |(j, i)| (j * 7 + i) as f64);
    let array = DataArray::new(&["y", "x"], values)
        .unwrap()
        .with_name("h")
        .with_coord("x", Coordinate::from_vec("x", (0..7).map(|i| 0.1 * i as f64).collect()))
        .with_coord("y", Coordinate::from_vec("y", (0..5).map(|j| -3. + 0.3 * j as f64).collect()));

    let mesh = array.mesh_accessor().mesh(&MeshOptions::default()).unwrap();
    let again = remesh(&mesh, "h");

    match (&mesh, &again) {
        (Mesh::Image(a), Mesh::Image(b)) => {
            assert_eq!(a.dimensions, b.dimensions);
            for d in 0..3 {
                assert_abs_diff_eq!(a.origin[d], b.origin[d], epsilon = 1e-12);
                assert_abs_diff_eq!(a.spacing[d], b.spacing[d], epsilon = 1e-12);
            }
            assert_eq!(a.point_data, b.point_data);
        }
        _ => panic!("expected two image meshes"),
    }
}

#[test]
fn structured_round_trip() {
    let lon = Array2::from_shape_fn((3, 4), |(j, i)| i as f64 + 0.5 * j as f64);
    let lat = Array2::from_shape_fn((3, 4), |(j, i)| j as f64 * j as f64 - 0.1 * i as f64);
    let values = Array2::from_shape_fn((3, 4), |(j, i)| (j * 4 + i) as f64);

    let array = DataArray::new(&["nj", "ni"], values)
        .unwrap()
        .with_name("eta")
        .with_coord("lon", Coordinate::from_array(&["nj", "ni"], lon).unwrap())
        .with_coord("lat", Coordinate::from_array(&["nj", "ni"], lat).unwrap());

    let mesh = array.mesh_accessor().mesh(&MeshOptions::default()).unwrap();
    assert!(matches!(mesh, Mesh::Structured(_)));

    let dataset = mesh_to_dataset(&mesh).unwrap();
    assert_eq!(dataset.coords.get("x").unwrap().shape(), vec![1, 3, 4]);

    assert_eq!(remesh(&mesh, "eta"), mesh);
}

#[test]
fn vector_arrays_keep_their_components() {
    let mut grid = xvtk::RectilinearGrid::new(vec![0., 1., 3.], vec![0., 2.], vec![0.]);
    grid.point_data.insert(FieldArray::new(
        "wind".into(),
        (0..12).map(f64::from).collect(),
        2,
    ));
    let mesh = Mesh::from(grid);

    let again = remesh(&mesh, "wind");
    let wind = again.point_data().get("wind").unwrap();
    assert_eq!(wind.components, 2);
    assert_eq!(wind, mesh.point_data().get("wind").unwrap());
}

#[test]
fn cell_arrays_use_cell_dimensions() {
    let mut grid = xvtk::RectilinearGrid::new(vec![0., 1., 3.], vec![0., 2., 3.], vec![0.]);
    grid.cell_data
        .insert(FieldArray::scalars("area", vec![2., 4., 1., 2.]));

    let dataset = mesh_to_dataset(&grid.into()).unwrap();
    let area = dataset.variable("area").unwrap();
    assert_eq!(area.dims, vec!["z_cell", "y_cell", "x_cell"]);
    assert_eq!(area.values.shape(), &[1, 2, 2]);
}

#[test]
fn point_clouds_cannot_be_converted() {
    let cloud = PointCloud::new(vec![[0., 0., 0.], [1., 1., 1.]]);
    assert!(matches!(
        mesh_to_dataset(&cloud.into()),
        Err(Error::UnsupportedTopology(_))
    ));
}
