use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2, Array3};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

use xvtk::prelude::*;

fn rectilinear(n: usize) -> DataArray {
    let values: Array3<f64> = ndarray::Array::random((n, n, n), Uniform::new(0., 10.));
    let axis = Array1::linspace(0., 1., n).to_vec();

    DataArray::new(&["z", "y", "x"], values)
        .unwrap()
        .with_name("rho")
        .with_coord("x", Coordinate::from_vec("x", axis.clone()))
        .with_coord("y", Coordinate::from_vec("y", axis.clone()))
        .with_coord("z", Coordinate::from_vec("z", axis))
}

fn curvilinear(n: usize) -> DataArray {
    let values: Array3<f64> = ndarray::Array::random((n, n, n), Uniform::new(0., 10.));
    let lon = Array2::from_shape_fn((n, n), |(j, i)| i as f64 + 0.1 * j as f64);
    let lat = Array2::from_shape_fn((n, n), |(j, i)| j as f64 - 0.1 * i as f64);

    DataArray::new(&["lev", "nj", "ni"], values)
        .unwrap()
        .with_name("rho")
        .with_coord("lon", Coordinate::from_array(&["nj", "ni"], lon).unwrap())
        .with_coord("lat", Coordinate::from_array(&["nj", "ni"], lat).unwrap())
        .with_coord("lev", Coordinate::from_vec("lev", Array1::linspace(0., 1., n).to_vec()))
}

fn build(array: &DataArray) -> usize {
    array
        .mesh_accessor()
        .mesh(&MeshOptions::default())
        .unwrap()
        .n_points()
}

fn build_mesh_bench(c: &mut Criterion) {
    let small = rectilinear(50);
    let large = rectilinear(100);
    let curved = curvilinear(50);

    c.bench_function("rectilinear 50", |b| b.iter(|| build(black_box(&small))));
    c.bench_function("rectilinear 100", |b| b.iter(|| build(black_box(&large))));
    c.bench_function("structured 50", |b| b.iter(|| build(black_box(&curved))));
}

criterion_group!(benches, build_mesh_bench);
criterion_main!(benches);
