use super::{select_coords, selected_shape, Attrs, Coordinate, Coords, Selection};
use crate::prelude::*;

use std::fmt;

/// A labeled array whose values are produced on demand.
///
/// Only the metadata lives in memory. `loader` receives the selection being materialized and
/// must return exactly the selected block, in the order of the remaining dimensions. This is
/// the shape of a chunked on-disk store: the loader reads the chunks it is asked for and
/// nothing else.
pub struct LazyArray<F> {
    name: Option<String>,
    dims: Vec<String>,
    shape: Vec<usize>,
    coords: Coords,
    attrs: Attrs,
    loader: F,
}

impl<F> LazyArray<F>
where
    F: Fn(&Selection) -> Result<ArrayD<f64>, Error>,
{
    pub fn new(dims: &[&str], shape: &[usize], loader: F) -> Result<Self, Error> {
        if dims.len() != shape.len() {
            return Err(ShapeMismatch::of(
                dims.join(","),
                format!("{} dimension names for a shape of rank {}", dims.len(), shape.len()),
            )
            .into());
        }

        Ok(Self {
            name: None,
            dims: dims.iter().map(|d| d.to_string()).collect(),
            shape: shape.to_vec(),
            coords: Coords::new(),
            attrs: Attrs::new(),
            loader,
        })
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_coord<S: Into<String>>(mut self, name: S, coord: Coordinate) -> Self {
        self.coords.insert(name.into(), coord);
        self
    }

    pub fn with_attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

impl<F> LabeledArray for LazyArray<F>
where
    F: Fn(&Selection) -> Result<ArrayD<f64>, Error>,
{
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn dims(&self) -> &[String] {
        &self.dims
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn coords(&self) -> &Coords {
        &self.coords
    }

    fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    fn materialize(&self, selection: &Selection) -> Result<DataArray, Error> {
        let (dims, shape) = selected_shape(&self.dims, &self.shape, selection)?;
        let values = (self.loader)(selection)?;

        if values.shape() != shape.as_slice() {
            return Err(ShapeMismatch::of(
                self.name.as_deref().unwrap_or("data"),
                format!("loader returned shape {:?}, expected {:?}", values.shape(), shape),
            )
            .into());
        }

        debug!(elements = values.len(), "materialized lazy array");

        let coords = select_coords(&self.coords, &self.dims, &self.shape, selection)?;
        DataArray::from_parts(self.name.clone(), dims, values, coords, self.attrs.clone())
    }
}

impl<F> fmt::Debug for LazyArray<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArray")
            .field("name", &self.name)
            .field("dims", &self.dims)
            .field("shape", &self.shape)
            .field("coords", &self.coords.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{select_values, Selector, Slab};
    use std::rc::Rc;

    #[test]
    fn loads_only_the_selection() {
        let full = Array::from_shape_fn((4, 5, 6), |(t, y, x)| (100 * t + 10 * y + x) as f64).into_dyn();
        let dims: Vec<String> = vec!["time".into(), "y".into(), "x".into()];
        let loaded = Rc::new(Cell::new(0));

        let counter = loaded.clone();
        let array = LazyArray::new(&["time", "y", "x"], &[4, 5, 6], move |selection: &Selection| {
            let block = select_values(&full, &dims, selection)?;
            counter.set(counter.get() + block.len());
            Ok(block)
        })
        .unwrap()
        .with_coord("x", Coordinate::from_vec("x", (0..6).collect::<Vec<i32>>()));

        let mut selection = Selection::new();
        selection.insert("time".into(), Selector::Index(2));
        selection.insert("x".into(), Selector::Slab(Slab::every(3)));

        let out = array.materialize(&selection).unwrap();
        assert_eq!(out.shape(), &[5, 2]);
        assert_eq!(out.at(&[("y", 1), ("x", 1)]), Some(213.));
        assert_eq!(loaded.get(), 10);
    }

    #[test]
    fn wrong_block_shape() {
        let array = LazyArray::new(&["x"], &[3], |_: &Selection| Ok(ArrayD::zeros(IxDyn(&[2])))).unwrap();
        assert!(matches!(array.load(), Err(Error::ShapeMismatch(_))));
    }
}
