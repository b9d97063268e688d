//! Dense ridge regression via Cholesky. Matrices are row-major `Vec<f64>`.

/// Solve `(XᵀX + diag(penalty)) θ = Xᵀy`.
///
/// `design` holds one row per observation, each `penalty.len()` wide. Returns
/// `None` when the normal equations are not positive definite.
pub fn ridge_solve(design: &[Vec<f64>], y: &[f64], penalty: &[f64]) -> Option<Vec<f64>> {
    let p = penalty.len();
    let mut gram = vec![0.0; p * p];
    let mut rhs = vec![0.0; p];

    for (row, &target) in design.iter().zip(y) {
        debug_assert_eq!(row.len(), p);
        for i in 0..p {
            let xi = row[i];
            if xi == 0.0 {
                continue;
            }
            rhs[i] += xi * target;
            for j in i..p {
                gram[i * p + j] += xi * row[j];
            }
        }
    }
    for i in 0..p {
        gram[i * p + i] += penalty[i];
        for j in 0..i {
            gram[i * p + j] = gram[j * p + i];
        }
    }

    let l = cholesky(&gram, p)?;
    Some(cholesky_solve(&l, p, &rhs))
}

/// Lower-triangular `L` with `A = LLᵀ`.
pub fn cholesky(a: &[f64], n: usize) -> Option<Vec<f64>> {
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i * n + j];
            for k in 0..j {
                sum -= l[i * n + k] * l[j * n + k];
            }
            if i == j {
                if !sum.is_finite() || sum <= 0.0 {
                    return None;
                }
                l[i * n + i] = sum.sqrt();
            } else {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }
    Some(l)
}

fn cholesky_solve(l: &[f64], n: usize, b: &[f64]) -> Vec<f64> {
    // L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i * n + k] * z[k];
        }
        z[i] = sum / l[i * n + i];
    }
    // Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[k * n + i] * x[k];
        }
        x[i] = sum / l[i * n + i];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_line_with_tiny_penalty() {
        let design: Vec<Vec<f64>> = (0..10).map(|i| vec![1.0, i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| 2.0 + 3.0 * i as f64).collect();
        let theta = ridge_solve(&design, &y, &[1e-12, 1e-12]).unwrap();
        assert!((theta[0] - 2.0).abs() < 1e-6);
        assert!((theta[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn penalty_shrinks_towards_zero() {
        let design: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let loose = ridge_solve(&design, &y, &[1e-9]).unwrap()[0];
        let tight = ridge_solve(&design, &y, &[1e3]).unwrap()[0];
        assert!(tight < loose);
        assert!(tight > 0.0);
    }

    #[test]
    fn penalty_makes_rank_deficient_system_solvable() {
        let design = vec![vec![1.0, 1.0]; 4];
        let y = vec![2.0; 4];
        assert!(ridge_solve(&design, &y, &[0.0, 0.0]).is_none());
        let theta = ridge_solve(&design, &y, &[0.1, 0.1]).unwrap();
        assert!((theta[0] - theta[1]).abs() < 1e-12);
    }

    #[test]
    fn nan_input_is_rejected() {
        let design = vec![vec![f64::NAN]];
        assert!(ridge_solve(&design, &[1.0], &[1.0]).is_none());
    }
}
