use super::Attributes;
use crate::prelude::*;
use crate::utils;

/// Curvilinear grid: the topology of a [`RectilinearGrid`](super::RectilinearGrid) with every
/// point positioned explicitly
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuredGrid {
    dimensions: [usize; 3],
    /// `x0, y0, z0, x1, y1, z1, ...`
    points: Vec<f64>,
    pub point_data: Attributes,
    pub cell_data: Attributes,
}

impl StructuredGrid {
    pub fn new(dimensions: [usize; 3], points: Vec<f64>) -> Result<Self, Error> {
        let expected = 3 * dimensions.iter().product::<usize>();
        if points.len() != expected {
            return Err(ShapeMismatch::of(
                "points",
                format!(
                    "{} interleaved coordinates for dimensions {:?}, expected {}",
                    points.len(),
                    dimensions,
                    expected
                ),
            )
            .into());
        }

        Ok(Self {
            dimensions,
            points,
            point_data: Attributes::default(),
            cell_data: Attributes::default(),
        })
    }

    /// interleaved point coordinates
    pub fn raw_points(&self) -> &[f64] {
        &self.points
    }

    /// one component of every point, in point order
    pub fn component(&self, axis: usize) -> Vec<f64> {
        self.points.iter().skip(axis).step_by(3).copied().collect()
    }

    pub fn x(&self) -> Vec<f64> {
        self.component(0)
    }

    pub fn y(&self) -> Vec<f64> {
        self.component(1)
    }

    pub fn z(&self) -> Vec<f64> {
        self.component(2)
    }
}

impl DataSet for StructuredGrid {
    fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    fn n_points(&self) -> usize {
        self.points.len() / 3
    }

    fn n_cells(&self) -> usize {
        utils::grid_cells(self.dimensions)
    }

    fn point(&self, id: usize) -> Option<[f64; 3]> {
        let p = self.points.get(3 * id..3 * id + 3)?;
        Some([p[0], p[1], p[2]])
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
fn structured_points() {
    let grid = StructuredGrid::new([2, 1, 1], vec![0., 1., 2., 3., 4., 5.]).unwrap();
    assert_eq!(grid.point(1), Some([3., 4., 5.]));
    assert_eq!(grid.point(2), None);
    assert_eq!(grid.y(), vec![1., 4.]);
    assert_eq!(grid.n_cells(), 1);

    assert!(StructuredGrid::new([2, 2, 1], vec![0.; 6]).is_err());
}
