use ndarray::{Array3, Array4, ArrayD};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use xvtk::prelude::*;
use xvtk::{Dataset, Error, Status};

/// `(time, y, x)` values of `1000 * t + 100 * y + x` on a `100 x 100` grid
fn field() -> DataArray {
    let values = Array3::from_shape_fn((4, 100, 100), |(t, y, x)| (1000 * t + 100 * y + x) as f64);
    DataArray::new(&["time", "y", "x"], values)
        .unwrap()
        .with_name("speed")
        .with_coord("x", Coordinate::from_vec("x", (0..100).map(f64::from).collect()))
        .with_coord("y", Coordinate::from_vec("y", (0..100).map(f64::from).collect()))
        .with_coord("time", Coordinate::from_vec("time", vec![0., 6., 12., 18.]))
}

/// a lazy view of [`field`] that counts every element it loads
fn counted(loaded: Rc<Cell<usize>>) -> impl LabeledArray {
    let full = field();
    let coords = full.coords().clone();

    let lazy = LazyArray::new(&["time", "y", "x"], &[4, 100, 100], move |selection: &Selection| {
        let block: ArrayD<f64> = full.materialize(selection)?.into_values();
        loaded.set(loaded.get() + block.len());
        Ok(block)
    })
    .unwrap()
    .with_name("speed");

    coords
        .into_iter()
        .fold(lazy, |lazy, (name, coord)| lazy.with_coord(name, coord))
}

#[test]
fn status_follows_settings() {
    let source = AlgorithmSource::new(field());
    assert_eq!(source.status(), Status::Dirty);

    assert!(source.rebuild_if_dirty().unwrap());
    assert_eq!(source.status(), Status::Clean);
    assert!(!source.rebuild_if_dirty().unwrap());

    source.set_time(2usize).unwrap();
    assert_eq!(source.status(), Status::Dirty);
    source.update().unwrap();
    assert_eq!(source.status(), Status::Clean);
}

#[test]
fn resolution_decimates_every_spatial_direction() {
    let loaded = Rc::new(Cell::new(0));
    let source = AlgorithmSource::new(counted(loaded.clone()))
        .with_state(SourceState::default().with_resolution(0.5))
        .unwrap();

    let mesh = source.apply().unwrap();
    assert_eq!(mesh.dimensions(), [50, 50, 1]);

    // only the selected time step at the selected stride is read
    assert_eq!(loaded.get(), 2500);

    match mesh {
        Mesh::Image(image) => assert_eq!(image.spacing, [2., 2., 1.]),
        other => panic!("expected image data, got {}", other.vtk_type()),
    }
}

#[test]
fn invalid_time_keeps_the_last_good_mesh() {
    let source = AlgorithmSource::new(field());
    source.set_time(1usize).unwrap();
    let before = source.apply().unwrap();

    match source.set_time(4usize) {
        Err(Error::OutOfRange(err)) => assert_eq!(err.what(), "time_index"),
        other => panic!("expected an out of range time index, got {other:?}"),
    }

    assert_eq!(source.state().time_index, 1);
    assert_eq!(source.status(), Status::Clean);
    assert_eq!(*source.output().borrow(), before);
}

#[test]
fn output_handle_is_stable() {
    let source = AlgorithmSource::new(field());
    let handle = source.update().unwrap();
    assert_eq!(handle.borrow().point_data().get("speed").unwrap().values[0], 0.);

    source.set_time(3usize).unwrap();
    let again = source.update().unwrap();

    assert!(Rc::ptr_eq(&handle, &again));
    assert_eq!(handle.borrow().point_data().get("speed").unwrap().values[0], 3000.);
}

#[test]
fn time_by_value_and_label() {
    let source = AlgorithmSource::new(field());

    assert_eq!(source.max_time_index().unwrap(), 3);
    assert_eq!(source.time_labels().unwrap(), vec!["0", "6", "12", "18"]);

    source.set_time(13.0).unwrap();
    assert_eq!(source.state().time_index, 2);
    assert_eq!(source.time_label().unwrap().as_deref(), Some("12"));

    source.set_time("18").unwrap();
    assert_eq!(source.state().time_index, 3);

    assert!(matches!(source.set_time("noon"), Err(Error::OutOfRange(_))));
    assert_eq!(source.state().time_index, 3);
}

#[test]
fn vertical_level() {
    let values = Array4::from_shape_fn((2, 3, 4, 5), |(t, z, y, x)| (t * 1000 + z * 100 + y * 10 + x) as f64);
    let array = DataArray::new(&["time", "depth", "y", "x"], values)
        .unwrap()
        .with_coord("x", Coordinate::from_vec("x", vec![0., 1., 2., 3., 4.]))
        .with_coord("y", Coordinate::from_vec("y", vec![0., 1., 2., 3.]))
        .with_coord("depth", Coordinate::from_vec("depth", vec![0., 50., 200.]))
        .with_coord("time", Coordinate::from_vec("time", vec![0., 1.]));

    let source = AlgorithmSource::new(array);

    // the full column is meshed without a level
    assert_eq!(source.apply().unwrap().dimensions(), [5, 4, 3]);

    source.set_z_index(Some(2)).unwrap();
    let mesh = source.apply().unwrap();
    assert_eq!(mesh.dimensions(), [5, 4, 1]);
    assert_eq!(mesh.bounds().unwrap()[4..], [200., 200.]);
    assert_eq!(mesh.point_data().get("data").unwrap().values[0], 200.);

    assert!(matches!(source.set_z_index(Some(3)), Err(Error::OutOfRange(_))));
    assert_eq!(source.state().z_index, Some(2));

    let flat = AlgorithmSource::new(field());
    assert!(matches!(
        flat.set_z_index(Some(0)),
        Err(Error::AmbiguousAxis { axis: AxisTag::Z, .. })
    ));
}

#[test]
fn slicing_overrides_resolution() {
    let source = AlgorithmSource::new(field());
    source.set_resolution(0.25).unwrap();

    let mut slicing = BTreeMap::new();
    slicing.insert("x".to_string(), Slab::new(10, Some(20), 5));
    source.set_slicing(Some(slicing)).unwrap();

    let mesh = source.apply().unwrap();
    assert_eq!(mesh.dimensions(), [2, 100, 1]);
    assert_eq!(mesh.point(1), Some([15., 0., 0.]));

    let mut slicing = BTreeMap::new();
    slicing.insert("x".to_string(), Slab::new(0, None, 0));
    assert!(source.set_slicing(Some(slicing)).is_err());

    source.set_slicing(None).unwrap();
    assert_eq!(source.apply().unwrap().dimensions(), [25, 25, 1]);
}

#[test]
fn resolution_outside_unit_interval() {
    let source = AlgorithmSource::new(field());
    for resolution in [0.0, -0.5, 1.5, f64::NAN] {
        assert!(matches!(source.set_resolution(resolution), Err(Error::OutOfRange(_))));
    }
    assert_eq!(source.state().resolution, 1.0);
}

#[test]
fn companion_arrays() {
    let shape = (4, 100, 100);
    let companion = Dataset::new()
        .with_variable("mask", &["time", "y", "x"], Array3::from_elem(shape, 1u8))
        .unwrap()
        .with_variable("depth", &["y", "x"], ndarray::Array2::<f64>::zeros((100, 100)))
        .unwrap();

    let source = AlgorithmSource::new(field()).with_companion(companion);
    source
        .set_arrays(vec!["mask".into(), "depth".into()])
        .unwrap();

    let mesh = source.apply().unwrap();
    let names: Vec<&str> = mesh.point_data().names().collect();
    assert_eq!(names, vec!["speed", "mask"]);
    assert_eq!(mesh.point_data().get("mask").unwrap().len(), 10_000);

    source.set_arrays(vec!["salinity".into()]).unwrap();
    assert!(matches!(source.apply(), Err(Error::MissingVariable(name)) if name == "salinity"));
}

#[test]
fn requeue_during_rebuild_leaves_the_source_dirty() {
    let source = Rc::new(AlgorithmSource::new(field()));
    let weak = Rc::downgrade(&source);

    source.add_filter(move |mesh| {
        if let Some(source) = weak.upgrade() {
            source.mark_dirty();
        }
        Ok(mesh)
    });

    assert!(source.rebuild_if_dirty().unwrap());
    assert_eq!(source.status(), Status::Dirty);
    assert!(source.output().borrow().n_points() > 0);

    source.clear_filters();
    source.update().unwrap();
    assert_eq!(source.status(), Status::Clean);
}

#[test]
fn failing_filter_keeps_output() {
    let source = AlgorithmSource::new(field());
    let good = source.apply().unwrap();

    source.add_filter(|_| Err(Error::MissingVariable("threshold".into())));
    assert!(source.update().is_err());
    assert_eq!(source.status(), Status::Dirty);
    assert_eq!(*source.output().borrow(), good);
}

#[test]
fn filters_see_the_fresh_mesh() {
    let source = AlgorithmSource::new(field());
    source.add_filter(|mut mesh| {
        let doubled: Vec<f64> = mesh
            .point_data()
            .get("speed")
            .map(|a| a.values.iter().map(|v| 2. * v).collect())
            .unwrap_or_default();
        mesh.point_data_mut()
            .insert(xvtk::FieldArray::scalars("double", doubled));
        Ok(mesh)
    });

    source.set_time(1usize).unwrap();
    assert_eq!(source.data_range().unwrap(), Some([1000., 10999.]));
    let mesh = source.output();
    assert_eq!(mesh.borrow().point_data().get("double").unwrap().values[1], 2002.);
}

#[test]
fn accessor_builds_a_source() {
    let array = field();
    let source = array
        .mesh_accessor()
        .algorithm(SourceState::default().with_time_index(2))
        .unwrap();

    let mesh = source.apply().unwrap();
    assert_eq!(mesh.point_data().get("speed").unwrap().values[0], 2000.);

    assert!(array
        .mesh_accessor()
        .algorithm(SourceState::default().with_time_index(9))
        .is_err());
}

#[test]
fn summary_lists_the_settings() {
    let source = AlgorithmSource::new(field());
    source.set_resolution(0.5).unwrap();

    let summary = source.to_string();
    assert!(summary.contains("array: speed"));
    assert!(summary.contains("axes: X=x Y=y time=time"));
    assert!(summary.contains("time_index: 0 of 4"));
    assert!(summary.contains("resolution: 0.5"));
    assert!(summary.ends_with("status: Dirty"));
}

#[cfg(feature = "serde")]
#[test]
fn state_survives_json() {
    let mut slicing = BTreeMap::new();
    slicing.insert("y".to_string(), Slab::new(0, Some(50), 1));

    let state = SourceState::default()
        .with_time_index(3)
        .with_resolution(0.5)
        .with_slicing(slicing)
        .with_mesh(
            MeshOptions::default()
                .with_axes(AxisOverrides::default().with_x("x"))
                .with_mesh_type(MeshType::Rectilinear),
        );

    let saved = AlgorithmSource::new(field()).with_state(state.clone()).unwrap();
    let json = saved.to_json().unwrap();

    let restored = AlgorithmSource::new(field());
    restored.load_state(&json).unwrap();
    assert_eq!(restored.state(), state);
    assert_eq!(restored.apply().unwrap(), saved.apply().unwrap());

    // missing fields fall back to their defaults
    let partial = SourceState::from_json(r#"{"time_index": 1}"#).unwrap();
    assert_eq!(partial.resolution, 1.0);
    assert_eq!(partial.time_index, 1);

    assert!(matches!(restored.load_state("{"), Err(Error::State(_))));
}
