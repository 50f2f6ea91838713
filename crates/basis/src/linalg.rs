//! Hand-rolled symmetric eigensolver for per-node decorrelation.
//!
//! Matrix dimensions here are node coefficient counts, so a dependency-free
//! cyclic Jacobi is adequate and keeps the crate's numerics self-contained.

/// Eigen-decomposition of a symmetric matrix.
///
/// `vectors[j]` is the unit eigenvector paired with `values[j]`; pairs are
/// sorted by descending eigenvalue and each vector's largest-magnitude
/// component is made positive, so the decomposition is deterministic.
#[derive(Clone, Debug)]
pub(crate) struct SymmetricEigen {
    pub(crate) values: Vec<f64>,
    pub(crate) vectors: Vec<Vec<f64>>,
}

/// Cyclic Jacobi iteration. Returns `None` if the off-diagonal mass does not
/// fall below `tol` within `max_sweeps` sweeps.
pub(crate) fn jacobi_eigen(
    matrix: &[Vec<f64>],
    max_sweeps: usize,
    tol: f64,
) -> Option<SymmetricEigen> {
    let m = matrix.len();
    if m == 0 {
        return Some(SymmetricEigen {
            values: vec![],
            vectors: vec![],
        });
    }
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    // v[r][j]: component r of eigenvector j.
    let mut v: Vec<Vec<f64>> = (0..m)
        .map(|r| (0..m).map(|j| if r == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let mut converged = false;
    for _ in 0..max_sweeps {
        let off: f64 = (0..m)
            .flat_map(|p| ((p + 1)..m).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off.sqrt() <= tol {
            converged = true;
            break;
        }

        for p in 0..m {
            for q in (p + 1)..m {
                if a[p][q].abs() <= f64::EPSILON * (a[p][p].abs() + a[q][q].abs()) {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for r in 0..m {
                    let arp = a[r][p];
                    let arq = a[r][q];
                    a[r][p] = c * arp - s * arq;
                    a[r][q] = s * arp + c * arq;
                }
                for col in 0..m {
                    let apc = a[p][col];
                    let aqc = a[q][col];
                    a[p][col] = c * apc - s * aqc;
                    a[q][col] = s * apc + c * aqc;
                }
                for r in 0..m {
                    let vrp = v[r][p];
                    let vrq = v[r][q];
                    v[r][p] = c * vrp - s * vrq;
                    v[r][q] = s * vrp + c * vrq;
                }
            }
        }
    }
    if !converged {
        let off: f64 = (0..m)
            .flat_map(|p| ((p + 1)..m).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off.sqrt() > tol {
            return None;
        }
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&i, &j| {
        a[j][j]
            .partial_cmp(&a[i][i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut values = Vec::with_capacity(m);
    let mut vectors = Vec::with_capacity(m);
    for &j in &order {
        values.push(a[j][j]);
        let mut vector: Vec<f64> = (0..m).map(|r| v[r][j]).collect();
        // Fix the sign so equal inputs always produce equal outputs.
        let lead = vector
            .iter()
            .cloned()
            .max_by(|x, y| x.abs().partial_cmp(&y.abs()).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap_or(0.0);
        if lead < 0.0 {
            for x in &mut vector {
                *x = -*x;
            }
        }
        vectors.push(vector);
    }

    Some(SymmetricEigen { values, vectors })
}
