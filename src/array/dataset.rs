use super::{to_f64, Attrs, Coordinate, Coords};
use crate::prelude::*;

/// a data variable of a [`Dataset`]
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub dims: Vec<String>,
    pub values: ArrayD<f64>,
    pub attrs: Attrs,
}

/// A collection of data variables sharing one set of coordinates.
///
/// This is what meshes are converted back into, and where companion arrays of an
/// [`AlgorithmSource`](crate::AlgorithmSource) are looked up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub coords: Coords,
    pub data_vars: BTreeMap<String, Variable>,
    pub attrs: Attrs,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coord<S: Into<String>>(mut self, name: S, coord: Coordinate) -> Self {
        self.coords.insert(name.into(), coord);
        self
    }

    pub fn with_variable<T, D>(mut self, name: &str, dims: &[&str], values: Array<T, D>) -> Result<Self, Error>
    where
        T: ToPrimitive,
        D: Dimension,
    {
        if dims.len() != values.ndim() {
            return Err(ShapeMismatch::of(
                name,
                format!("{} dimension names for {} dimensional values", dims.len(), values.ndim()),
            )
            .into());
        }

        self.data_vars.insert(
            name.to_string(),
            Variable {
                dims: dims.iter().map(|d| d.to_string()).collect(),
                values: values.map(to_f64).into_dyn(),
                attrs: Attrs::new(),
            },
        );
        Ok(self)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name)
    }

    /// names of the data variables, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.data_vars.keys().map(String::as_str)
    }

    /// one variable as a [`DataArray`], carrying every coordinate whose dimensions it spans
    pub fn data_array(&self, name: &str) -> Result<DataArray, Error> {
        let var = self
            .data_vars
            .get(name)
            .ok_or_else(|| Error::MissingVariable(name.to_string()))?;

        let coords = self
            .coords
            .iter()
            .filter(|(_, coord)| coord.dims().iter().all(|d| var.dims.contains(d)))
            .map(|(name, coord)| (name.clone(), coord.clone()))
            .collect();

        DataArray::from_parts(
            Some(name.to_string()),
            var.dims.clone(),
            var.values.clone(),
            coords,
            var.attrs.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_array_picks_matching_coords() {
        let ds = Dataset::new()
            .with_coord("x", Coordinate::from_vec("x", vec![0., 1.]))
            .with_coord("t", Coordinate::from_vec("t", vec![0.]))
            .with_variable("u", &["x"], Array1::from(vec![3., 4.]))
            .unwrap();

        let u = ds.data_array("u").unwrap();
        assert_eq!(u.name(), Some("u"));
        assert!(u.coord("x").is_some());
        assert!(u.coord("t").is_none());

        assert!(matches!(ds.data_array("v"), Err(Error::MissingVariable(_))));
    }
}
