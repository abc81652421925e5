use super::Attributes;
use crate::prelude::*;

/// Unconnected points, each one its own vertex cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// `x0, y0, z0, x1, y1, z1, ...`
    points: Vec<f64>,
    pub point_data: Attributes,
    pub cell_data: Attributes,
}

impl PointCloud {
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self {
            points: points.into_iter().flatten().collect(),
            point_data: Attributes::default(),
            cell_data: Attributes::default(),
        }
    }

    pub(crate) fn from_interleaved(points: Vec<f64>) -> Result<Self, Error> {
        if points.len() % 3 != 0 {
            return Err(ShapeMismatch::of(
                "points",
                format!("{} values cannot be split into xyz triples", points.len()),
            )
            .into());
        }

        Ok(Self {
            points,
            point_data: Attributes::default(),
            cell_data: Attributes::default(),
        })
    }

    /// interleaved point coordinates
    pub fn raw_points(&self) -> &[f64] {
        &self.points
    }
}

impl DataSet for PointCloud {
    fn dimensions(&self) -> [usize; 3] {
        [self.n_points(), 1, 1]
    }

    fn n_points(&self) -> usize {
        self.points.len() / 3
    }

    fn n_cells(&self) -> usize {
        self.n_points()
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
fn point_cloud() {
    let cloud = PointCloud::new(vec![[0., 1., 2.], [-1., 5., 0.]]);
    assert_eq!(cloud.n_points(), 2);
    assert_eq!(cloud.n_cells(), 2);
    assert_eq!(cloud.point(1), Some([-1., 5., 0.]));
    assert_eq!(cloud.bounds(), Some([-1., 0., 1., 5., 0., 2.]));
    assert!(PointCloud::from_interleaved(vec![0.; 4]).is_err());
}
