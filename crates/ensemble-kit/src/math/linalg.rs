//! Dense linear solves for the closed-form weak learner.

use crate::math::Array2;

/// Pivots smaller than this fraction of the largest entry of `a` are treated
/// as zero; the matching unknown is fixed at 0.
pub const RELATIVE_PIVOT_TOL: f64 = 1e-9;

/// Solve `a * x = b` for a square, row-major `a` of size `n x n`.
///
/// Gaussian elimination with partial pivoting. Columns without a usable
/// pivot (rank deficiency) get a zero solution component instead of an error,
/// so a constant feature simply receives no weight. Returns the solution and
/// the number of columns dropped that way.
pub fn solve(mut a: Vec<f64>, mut b: Vec<f64>, n: usize) -> (Vec<f64>, usize) {
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(b.len(), n);

    let scale = a.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let tol = RELATIVE_PIVOT_TOL * scale;
    let mut pivot_row_of = vec![None; n];
    let mut row = 0usize;
    for col in 0..n {
        if row == n {
            break;
        }
        let (best, best_abs) = (row..n)
            .map(|r| (r, a[r * n + col].abs()))
            .fold((row, -1.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
        if best_abs <= tol || best_abs <= 0.0 {
            continue;
        }
        if best != row {
            for c in 0..n {
                a.swap(best * n + c, row * n + c);
            }
            b.swap(best, row);
        }
        let pivot = a[row * n + col];
        for r in 0..n {
            if r == row {
                continue;
            }
            let factor = a[r * n + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[r * n + c] -= factor * a[row * n + c];
            }
            b[r] -= factor * b[row];
        }
        pivot_row_of[col] = Some(row);
        row += 1;
    }

    let mut dropped = 0;
    let solution = pivot_row_of
        .iter()
        .enumerate()
        .map(|(col, pivot_row)| match pivot_row {
            Some(r) => b[*r] / a[r * n + col],
            None => {
                dropped += 1;
                0.0
            }
        })
        .collect();
    (solution, dropped)
}

/// Ordinary least squares with an intercept via the normal equations.
///
/// Returns `[intercept, w_0, .., w_{d-1}]` and the number of dropped
/// (rank-deficient) columns. `ridge` is added to the diagonal of every
/// non-intercept column.
pub fn least_squares_with_bias(x: &Array2<f64>, y: &[f64], ridge: f64) -> (Vec<f64>, usize) {
    let d = x.ncols() + 1;
    let mut xtx = vec![0.0; d * d];
    let mut xty = vec![0.0; d];

    for (row, &target) in x.rows().zip(y.iter()) {
        // augmented row is [1, row...]
        for i in 0..d {
            let xi = if i == 0 { 1.0 } else { row[i - 1] };
            xty[i] += xi * target;
            for j in i..d {
                let xj = if j == 0 { 1.0 } else { row[j - 1] };
                xtx[i * d + j] += xi * xj;
            }
        }
    }
    for i in 0..d {
        for j in 0..i {
            xtx[i * d + j] = xtx[j * d + i];
        }
        if i > 0 {
            xtx[i * d + i] += ridge;
        }
    }

    solve(xtx, xty, d)
}
