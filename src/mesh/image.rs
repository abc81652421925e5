use super::Attributes;
use crate::prelude::*;
use crate::utils;

/// Evenly spaced, axis aligned grid
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// number of points along i, j, k
    pub dimensions: [usize; 3],
    pub origin: [f64; 3],
    pub spacing: [f64; 3],
    pub point_data: Attributes,
    pub cell_data: Attributes,
}

impl ImageData {
    pub fn new(dimensions: [usize; 3], origin: [f64; 3], spacing: [f64; 3]) -> Self {
        Self {
            dimensions,
            origin,
            spacing,
            point_data: Attributes::default(),
            cell_data: Attributes::default(),
        }
    }

    /// point coordinates along one direction
    pub fn axis(&self, direction: usize) -> Vec<f64> {
        (0..self.dimensions[direction])
            .map(|n| self.origin[direction] + n as f64 * self.spacing[direction])
            .collect()
    }
}

impl DataSet for ImageData {
    fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    fn n_points(&self) -> usize {
        self.dimensions.iter().product()
    }

    fn n_cells(&self) -> usize {
        utils::grid_cells(self.dimensions)
    }

    fn point(&self, id: usize) -> Option<[f64; 3]> {
        if id >= self.n_points() {
            return None;
        }
        let ijk = utils::point_ijk(id, self.dimensions);
        Some([0, 1, 2].map(|d| self.origin[d] + ijk[d] as f64 * self.spacing[d]))
    }

    fn point_data(&self) -> &Attributes {
        &self.point_data
    }

    fn point_data_mut(&mut self) -> &mut Attributes {
        &mut self.point_data
    }

    fn cell_data(&self) -> &Attributes {
        &self.cell_data
    }

    fn cell_data_mut(&mut self) -> &mut Attributes {
        &mut self.cell_data
    }
}

#[test]
fn image_points() {
    let image = ImageData::new([3, 2, 1], [1., 0., 5.], [0.5, 2., 1.]);
    assert_eq!(image.n_points(), 6);
    assert_eq!(image.n_cells(), 2);
    assert_eq!(image.point(4), Some([1.5, 2., 5.]));
    assert_eq!(image.axis(0), vec![1., 1.5, 2.]);
    assert_eq!(image.bounds(), Some([1., 2., 0., 2., 5., 5.]));
}
