/// relative tolerance used when deciding whether a coordinate is evenly spaced
pub(crate) const SPACING_TOLERANCE: f64 = 1e-6;

/// `(origin, spacing)` of strictly increasing, evenly spaced values. Single values are uniform
/// with unit spacing.
pub(crate) fn uniform_spacing(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [] => Some((0.0, 1.0)),
        [only] => Some((*only, 1.0)),
        [first, second, ..] => {
            let spacing = second - first;
            if !(spacing > 0.0) {
                return None;
            }

            let tol = SPACING_TOLERANCE * spacing.abs();
            let even = values
                .windows(2)
                .all(|pair| ((pair[1] - pair[0]) - spacing).abs() <= tol);

            if even {
                Some((*first, spacing))
            } else {
                None
            }
        }
    }
}

/// index of the element of `values` closest to `target`, ignoring NaN
pub(crate) fn nearest_index(values: impl Iterator<Item = f64>, target: f64) -> Option<usize> {
    values
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .min_by(|(_, a), (_, b)| {
            (a - target)
                .abs()
                .partial_cmp(&(b - target).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
}

/// `[min, max]` of the finite values, `None` if there are none
pub(crate) fn min_max(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some([v, v]),
        Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
    })
}

/// number of cells of a structured grid with `dims` points: directions with a single point do
/// not contribute, any empty direction leaves no cells at all
pub(crate) fn grid_cells(dims: [usize; 3]) -> usize {
    if dims.iter().any(|&n| n == 0) {
        return 0;
    }
    if dims.iter().all(|&n| n == 1) {
        return 0;
    }
    dims.iter().filter(|&&n| n > 1).map(|n| n - 1).product()
}

/// point id of `[i, j, k]` with `i` fastest
pub(crate) fn point_id(ijk: [usize; 3], dims: [usize; 3]) -> usize {
    ijk[0] + dims[0] * (ijk[1] + dims[1] * ijk[2])
}

/// inverse of [`point_id`]
pub(crate) fn point_ijk(id: usize, dims: [usize; 3]) -> [usize; 3] {
    let i = id % dims[0];
    let rest = id / dims[0];
    [i, rest % dims[1], rest / dims[1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing() {
        assert_eq!(uniform_spacing(&[0., 0.5, 1.0, 1.5]), Some((0., 0.5)));
        assert_eq!(uniform_spacing(&[3.]), Some((3., 1.)));
        assert_eq!(uniform_spacing(&[1., 0.]), None);
        assert_eq!(uniform_spacing(&[0., 1., 3.]), None);
        assert_eq!(uniform_spacing(&[0., 0.]), None);
    }

    #[test]
    fn nearest() {
        let values = [0., 10., 20., f64::NAN];
        assert_eq!(nearest_index(values.iter().copied(), 12.), Some(1));
        assert_eq!(nearest_index(values.iter().copied(), 100.), Some(2));
        assert_eq!(nearest_index(std::iter::empty(), 1.), None);
    }

    #[test]
    fn cells() {
        assert_eq!(grid_cells([4, 3, 1]), 6);
        assert_eq!(grid_cells([4, 3, 2]), 6);
        assert_eq!(grid_cells([4, 0, 2]), 0);
        assert_eq!(grid_cells([1, 1, 1]), 0);
        assert_eq!(grid_cells([5, 1, 1]), 4);
    }

    #[test]
    fn ids() {
        let dims = [4, 3, 2];
        for id in 0..24 {
            assert_eq!(point_id(point_ijk(id, dims), dims), id);
        }
        assert_eq!(point_ijk(5, dims), [1, 1, 0]);
    }
}
