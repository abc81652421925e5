use xvtk::prelude::*;
use xvtk::{write_vtk, Encoding, FieldArray, ImageData, PointCloud, RectilinearGrid, StructuredGrid, VtkFileSink};

fn written(mesh: &Mesh, encoding: Encoding) -> String {
    let mut output = Vec::new();
    write_vtk(&mut output, mesh, encoding).unwrap();
    String::from_utf8(output).unwrap()
}

#[test]
fn rectilinear_grid() {
    let mut grid = RectilinearGrid::new(vec![0., 1.5], vec![2., 3.], vec![0.]);
    grid.point_data
        .insert(FieldArray::scalars("p", vec![1., 2., 3., 4.]));

    let text = written(&grid.into(), Encoding::Ascii);

    assert!(text.starts_with("<?xml version=\"1.0\"?>"));
    assert!(text.contains("<VTKFile type=\"RectilinearGrid\""));
    assert!(text.contains("<RectilinearGrid WholeExtent=\"0 1 0 1 0 0\">"));
    assert!(text.contains(
        "<DataArray type=\"Float64\" Name=\"p\" NumberOfComponents=\"1\" format=\"ascii\">1.0 2.0 3.0 4.0</DataArray>"
    ));
    assert!(text.contains("Name=\"X\" NumberOfComponents=\"1\" format=\"ascii\">0.0 1.5</DataArray>"));
    assert!(text.trim_end().ends_with("</VTKFile>"));
}

#[test]
fn image_data() {
    let image = ImageData::new([3, 2, 1], [0., -1., 5.], [0.5, 2., 1.]);
    let text = written(&image.into(), Encoding::Ascii);

    assert!(text.contains("<VTKFile type=\"ImageData\""));
    assert!(text.contains("WholeExtent=\"0 2 0 1 0 0\" Origin=\"0.0 -1.0 5.0\" Spacing=\"0.5 2.0 1.0\""));
    assert!(text.contains("<PointData></PointData>") || text.contains("<PointData/>"));
}

#[test]
fn structured_grid_points() {
    let points = vec![0., 0., 0., 1., 0.5, 0.];
    let grid = StructuredGrid::new([2, 1, 1], points).unwrap();
    let text = written(&grid.into(), Encoding::Ascii);

    assert!(text.contains("<VTKFile type=\"StructuredGrid\""));
    assert!(text.contains(
        "Name=\"Points\" NumberOfComponents=\"3\" format=\"ascii\">0.0 0.0 0.0 1.0 0.5 0.0</DataArray>"
    ));
}

#[test]
fn point_cloud_vertices() {
    let cloud = PointCloud::new(vec![[0., 0., 0.], [1., 0., 0.], [2., 0., 0.]]);
    let text = written(&cloud.into(), Encoding::Ascii);

    assert!(text.contains("<VTKFile type=\"PolyData\""));
    assert!(text.contains("NumberOfPoints=\"3\" NumberOfVerts=\"3\""));
    assert!(text.contains("Name=\"connectivity\" format=\"ascii\">0 1 2</DataArray>"));
    assert!(text.contains("Name=\"offsets\" format=\"ascii\">1 2 3</DataArray>"));
}

#[test]
fn binary_arrays() {
    let mut grid = RectilinearGrid::new(vec![0.], vec![0.], vec![0.]);
    grid.point_data.insert(FieldArray::scalars("one", vec![1.]));

    let text = written(&grid.into(), Encoding::Base64);
    let start = text.find("Name=\"one\"").unwrap();
    let body = &text[start..];
    let body = &body[body.find('>').unwrap() + 1..body.find("</DataArray>").unwrap()];

    assert!(text[start..].starts_with("Name=\"one\" NumberOfComponents=\"1\" format=\"binary\""));

    let bytes = base64::decode(body).unwrap();
    assert_eq!(&bytes[..8], &8u64.to_le_bytes());
    assert_eq!(&bytes[8..], &1f64.to_le_bytes());
}

#[test]
fn file_sink_picks_the_extension() {
    let dir = std::env::temp_dir().join(format!("xvtk-sink-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let array = DataArray::new(&["y", "x"], ndarray::Array2::<f64>::ones((2, 3)))
        .unwrap()
        .with_name("ones")
        .with_coord("x", Coordinate::from_vec("x", vec![0., 1., 5.]))
        .with_coord("y", Coordinate::from_vec("y", vec![0., 1.]));

    let mut sink = VtkFileSink::new(dir.join("ones"));
    array
        .mesh_accessor()
        .plot(&MeshOptions::default(), &mut sink, &Encoding::Ascii)
        .unwrap();

    let path = dir.join("ones.vtr");
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("<VTKFile type=\"RectilinearGrid\""));
    assert!(text.contains("Name=\"ones\""));

    std::fs::remove_dir_all(&dir).unwrap();
}
