use super::Attributes;
use crate::prelude::*;
use crate::utils;

/// Axis aligned grid with arbitrary spacing along each direction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectilinearGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub point_data: Attributes,
    pub cell_data: Attributes,
}

impl RectilinearGrid {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        Self {
            x,
            y,
            z,
            point_data: Attributes::default(),
            cell_data: Attributes::default(),
        }
    }
}

impl DataSet for RectilinearGrid {
    fn dimensions(&self) -> [usize; 3] {
        [self.x.len(), self.y.len(), self.z.len()]
    }

    fn n_points(&self) -> usize {
        self.dimensions().iter().product()
    }

    fn n_cells(&self) -> usize {
        utils::grid_cells(self.dimensions())
    }

    fn point(&self, id: usize) -> Option<[f64; 3]> {
        if id >= self.n_points() {
            return None;
        }
        let [i, j, k] = utils::point_ijk(id, self.dimensions());
        Some([self.x[i], self.y[j], self.z[k]])
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

    fn bounds(&self) -> Option<[f64; 6]> {
        let [x, y, z] = [&self.x, &self.y, &self.z].map(|v| utils::min_max(v.iter().copied()));
        let (x, y, z) = (x?, y?, z?);
        Some([x[0], x[1], y[0], y[1], z[0], z[1]])
    }
}

#[test]
fn rectilinear_points() {
    let grid = RectilinearGrid::new(vec![0., 1., 3.], vec![5., 4.], vec![2.]);
    assert_eq!(grid.dimensions(), [3, 2, 1]);
    assert_eq!(grid.n_cells(), 2);
    assert_eq!(grid.point(5), Some([3., 4., 2.]));
    assert_eq!(grid.point(6), None);
    assert_eq!(grid.bounds(), Some([0., 3., 4., 5., 2., 2.]));
}
