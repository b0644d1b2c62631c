//! Least-squares fitting of orthogonal, affine and polynomial transformations
//! from control-point pairs.
//!
//! Every fit builds a design matrix over (optionally normalized)
//! from-coordinates and solves it through [`solve_least_squares`]:
//!
//! - orthogonal: one joint `2m × 4` system, the two output equations share
//!   scale and rotation;
//! - affine: one `m × 3` matrix solved for both output axes;
//! - polynomial: one `m × terms` matrix of monomials solved for both axes.
//!
//! Orthogonal and affine parameters are converted back to raw coordinates;
//! polynomial coefficients stay in the normalized frame, which travels with
//! the [`FittedTransformation`].

use nalgebra::DMatrix;

use crate::config::SolverConfig;
use crate::error::{Result, TransformError};
use crate::eval::{monomial_basis, FittedTransformation, Normalization};
use crate::kind::{PolynomialDegree, TransformationKind};
use crate::point::ControlPointPair;
use crate::solver::solve_least_squares;

/// Fit `kind` to the control pairs.
///
/// Fails with [`TransformError::InsufficientPoints`] before any solve when
/// fewer than `kind.min_points()` pairs are given, with
/// [`TransformError::NonFiniteCoordinate`] when a pair holds NaN or infinite
/// coordinates, and with
/// [`TransformError::SingularSystem`] when the points do not determine the
/// parameters (e.g. collinear points for an affine fit).
pub fn fit(
    kind: TransformationKind,
    pairs: &[ControlPointPair],
    config: &SolverConfig,
) -> Result<FittedTransformation> {
    let needed = kind.min_points();
    if pairs.len() < needed {
        return Err(TransformError::InsufficientPoints {
            kind,
            needed,
            got: pairs.len(),
        });
    }
    for pair in pairs {
        for (point, list) in [(pair.from(), "from"), (pair.to(), "to")] {
            if !point.is_finite() {
                return Err(TransformError::NonFiniteCoordinate {
                    id: point.id.clone(),
                    list,
                });
            }
        }
    }

    let src: Vec<[f64; 2]> = pairs.iter().map(|p| p.from().en()).collect();
    let dst: Vec<[f64; 2]> = pairs.iter().map(|p| p.to().en()).collect();
    let norm = if config.normalize {
        Normalization::from_points(&src)
    } else {
        Normalization::IDENTITY
    };
    let src_n: Vec<[f64; 2]> = src.iter().map(|p| norm.apply(p[0], p[1])).collect();

    tracing::debug!(%kind, n_points = pairs.len(), "fitting transformation");

    let (params, frame) = match kind {
        TransformationKind::Orthogonal => (
            fit_orthogonal(&src_n, &dst, &norm, config)?,
            Normalization::IDENTITY,
        ),
        TransformationKind::Affine => (
            fit_affine(&src_n, &dst, &norm, config)?,
            Normalization::IDENTITY,
        ),
        TransformationKind::Polynomial(degree) => {
            (fit_polynomial(degree, &src_n, &dst, config)?, norm)
        }
    };

    Ok(FittedTransformation::new(kind, params, frame, pairs.len()))
}

/// `[tE, tN, c, s]` in raw coordinates.
fn fit_orthogonal(
    src_n: &[[f64; 2]],
    dst: &[[f64; 2]],
    norm: &Normalization,
    config: &SolverConfig,
) -> Result<Vec<f64>> {
    let m = src_n.len();
    let mut a = DMatrix::<f64>::zeros(2 * m, 4);
    let mut b = DMatrix::<f64>::zeros(2 * m, 1);
    for (i, (&[u, v], &[e_to, n_to])) in src_n.iter().zip(dst).enumerate() {
        // e_to = tE + c·u − s·v
        a[(2 * i, 0)] = 1.0;
        a[(2 * i, 2)] = u;
        a[(2 * i, 3)] = -v;
        b[(2 * i, 0)] = e_to;
        // n_to = tN + s·u + c·v
        a[(2 * i + 1, 1)] = 1.0;
        a[(2 * i + 1, 2)] = v;
        a[(2 * i + 1, 3)] = u;
        b[(2 * i + 1, 0)] = n_to;
    }

    let x = solve_least_squares(&a, &b, config)?;

    // Undo u = k(e − e0), v = k(n − n0).
    let k = norm.scale;
    let [e0, n0] = norm.origin;
    let c = x[(2, 0)] * k;
    let s = x[(3, 0)] * k;
    let te = x[(0, 0)] - c * e0 + s * n0;
    let tn = x[(1, 0)] - s * e0 - c * n0;
    Ok(vec![te, tn, c, s])
}

/// `[a0, a1, a2, a3, a4, a5]` in raw coordinates.
fn fit_affine(
    src_n: &[[f64; 2]],
    dst: &[[f64; 2]],
    norm: &Normalization,
    config: &SolverConfig,
) -> Result<Vec<f64>> {
    let m = src_n.len();
    let a = DMatrix::from_fn(m, 3, |i, j| match j {
        0 => 1.0,
        1 => src_n[i][0],
        _ => src_n[i][1],
    });
    let b = DMatrix::from_fn(m, 2, |i, j| dst[i][j]);

    let x = solve_least_squares(&a, &b, config)?;

    let k = norm.scale;
    let [e0, n0] = norm.origin;
    let mut params = Vec::with_capacity(6);
    for axis in 0..2 {
        let a1 = x[(1, axis)] * k;
        let a2 = x[(2, axis)] * k;
        let a0 = x[(0, axis)] - a1 * e0 - a2 * n0;
        params.extend_from_slice(&[a0, a1, a2]);
    }
    Ok(params)
}

/// Easting coefficients followed by northing coefficients, both over the
/// normalized monomial basis.
fn fit_polynomial(
    degree: PolynomialDegree,
    src_n: &[[f64; 2]],
    dst: &[[f64; 2]],
    config: &SolverConfig,
) -> Result<Vec<f64>> {
    let m = src_n.len();
    let terms = degree.n_terms();
    let mut a = DMatrix::<f64>::zeros(m, terms);
    let mut row = Vec::with_capacity(terms);
    for (i, &[u, v]) in src_n.iter().enumerate() {
        monomial_basis(degree, u, v, &mut row);
        for (j, &t) in row.iter().enumerate() {
            a[(i, j)] = t;
        }
    }
    let b = DMatrix::from_fn(m, 2, |i, j| dst[i][j]);

    let x = solve_least_squares(&a, &b, config)?;

    let mut params = Vec::with_capacity(2 * terms);
    params.extend(x.column(0).iter().copied());
    params.extend(x.column(1).iter().copied());
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolveMethod;
    use crate::test_utils::{grid_points, pair, pairs_mapped, similarity_fn};
    use approx::assert_relative_eq;
    use rand::prelude::*;

    #[test]
    fn orthogonal_pure_translation_scenario() {
        let pairs = vec![
            pair("A", [0.0, 0.0], [5.0, 5.0]),
            pair("B", [10.0, 0.0], [15.0, 5.0]),
            pair("C", [0.0, 10.0], [5.0, 15.0]),
        ];
        let fitted = fit(TransformationKind::Orthogonal, &pairs, &SolverConfig::default())
            .expect("fit");
        let p = fitted.params();
        assert_relative_eq!(p[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 5.0, epsilon = 1e-9);
        assert_relative_eq!(p[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[3], 0.0, epsilon = 1e-12);
        for pr in &pairs {
            let [e, n] = fitted.apply_to(pr.from());
            assert_relative_eq!(e, pr.to().e, epsilon = 1e-9);
            assert_relative_eq!(n, pr.to().n, epsilon = 1e-9);
        }
    }

    #[test]
    fn orthogonal_two_points_is_the_boundary() {
        let two = vec![
            pair("1", [100.0, 200.0], [110.0, 190.0]),
            pair("2", [300.0, 250.0], [310.0, 240.0]),
        ];
        let fitted =
            fit(TransformationKind::Orthogonal, &two, &SolverConfig::default()).expect("two points");
        let p = fitted.params();
        assert_relative_eq!(p[0], 10.0, epsilon = 1e-8);
        assert_relative_eq!(p[1], -10.0, epsilon = 1e-8);
        assert_relative_eq!(p[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[3], 0.0, epsilon = 1e-12);

        let err = fit(TransformationKind::Orthogonal, &two[..1], &SolverConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::InsufficientPoints {
                kind: TransformationKind::Orthogonal,
                needed: 2,
                got: 1
            }
        );
    }

    #[test]
    fn orthogonal_recovers_scale_and_rotation_at_survey_magnitudes() {
        let (scale, rot, t) = (1.0002, 0.35, [650_123.4, 240_987.6]);
        let map = similarity_fn(scale, rot, t);
        let from = grid_points([48_000.0, 12_000.0], 250.0, 3, 3);
        let pairs = pairs_mapped(&from, map);

        for method in [SolveMethod::Qr, SolveMethod::NormalEquations] {
            let cfg = SolverConfig {
                method,
                ..SolverConfig::default()
            };
            let fitted = fit(TransformationKind::Orthogonal, &pairs, &cfg).expect("fit");
            let sim = fitted.similarity().expect("orthogonal");
            assert_relative_eq!(sim.scale, scale, epsilon = 1e-10);
            assert_relative_eq!(sim.rotation, rot, epsilon = 1e-10);
            for pr in &pairs {
                let [e, n] = fitted.apply_to(pr.from());
                assert!((e - pr.to().e).abs() < 1e-6);
                assert!((n - pr.to().n).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn coincident_points_are_singular_for_orthogonal() {
        let pairs = vec![
            pair("1", [5.0, 5.0], [1.0, 1.0]),
            pair("2", [5.0, 5.0], [2.0, 2.0]),
        ];
        let err =
            fit(TransformationKind::Orthogonal, &pairs, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, TransformError::SingularSystem { .. }));
    }

    #[test]
    fn affine_recovers_exact_coefficients() {
        let truth = [12.0, 1.1, -0.2, -7.0, 0.3, 0.9];
        let pairs: Vec<ControlPointPair> = [[0.0, 0.0], [100.0, 10.0], [20.0, 80.0]]
            .iter()
            .enumerate()
            .map(|(i, &[e, n])| {
                pair(
                    &format!("P{i}"),
                    [e, n],
                    [
                        truth[0] + truth[1] * e + truth[2] * n,
                        truth[3] + truth[4] * e + truth[5] * n,
                    ],
                )
            })
            .collect();

        let fitted = fit(TransformationKind::Affine, &pairs, &SolverConfig::default())
            .expect("three non-collinear points");
        for (got, want) in fitted.params().iter().zip(truth) {
            assert_relative_eq!(*got, want, epsilon = 1e-9);
        }
        for pr in &pairs {
            let [e, n] = fitted.apply_to(pr.from());
            assert_relative_eq!(e, pr.to().e, epsilon = 1e-9);
            assert_relative_eq!(n, pr.to().n, epsilon = 1e-9);
        }
    }

    #[test]
    fn affine_collinear_points_are_singular() {
        let pairs = vec![
            pair("1", [0.0, 0.0], [1.0, 1.0]),
            pair("2", [10.0, 10.0], [11.0, 12.0]),
            pair("3", [20.0, 20.0], [21.0, 19.0]),
        ];
        let err = fit(TransformationKind::Affine, &pairs, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, TransformError::SingularSystem { .. }));
    }

    #[test]
    fn non_finite_control_points_are_rejected_before_solving() {
        let pairs = vec![
            pair("A", [0.0, 0.0], [5.0, 5.0]),
            pair("B", [10.0, 0.0], [15.0, 5.0]),
            pair("C", [f64::NAN, 10.0], [5.0, 15.0]),
        ];
        let err = fit(TransformationKind::Affine, &pairs, &SolverConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TransformError::NonFiniteCoordinate {
                id: "C".into(),
                list: "from"
            }
        );

        let mut pairs = pairs;
        pairs[2] = pair("C", [0.0, 10.0], [5.0, f64::NEG_INFINITY]);
        let raw = SolverConfig {
            normalize: false,
            ..SolverConfig::default()
        };
        let err = fit(TransformationKind::Orthogonal, &pairs, &raw).unwrap_err();
        assert_eq!(
            err,
            TransformError::NonFiniteCoordinate {
                id: "C".into(),
                list: "to"
            }
        );
    }

    #[test]
    fn affine_needs_three_points() {
        let pairs = vec![
            pair("1", [0.0, 0.0], [1.0, 1.0]),
            pair("2", [10.0, 0.0], [11.0, 1.0]),
        ];
        let err = fit(TransformationKind::Affine, &pairs, &SolverConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InsufficientPoints { needed: 3, got: 2, .. }
        ));
    }

    #[test]
    fn cubic_mapping_is_reproduced_by_third_degree_fit() {
        let cubic = |[e, n]: [f64; 2]| {
            let (x, y) = ((e - 500.0) / 100.0, (n - 300.0) / 100.0);
            [
                1000.0 + 100.5 * x - 0.4 * y + 0.02 * x * x * y + 0.01 * y * y * y,
                2000.0 + 0.3 * x + 99.8 * y - 0.015 * x * x * x + 0.005 * x * y,
            ]
        };
        let from = grid_points([400.0, 200.0], 50.0, 4, 4);
        let pairs = pairs_mapped(&from, cubic);
        let kind = TransformationKind::polynomial(3).expect("degree");

        let fitted = fit(kind, &pairs, &SolverConfig::default()).expect("16 points");
        assert_eq!(fitted.params().len(), 20);
        for pr in &pairs {
            let [e, n] = fitted.apply_to(pr.from());
            assert_relative_eq!(e, pr.to().e, epsilon = 1e-6);
            assert_relative_eq!(n, pr.to().n, epsilon = 1e-6);
        }
        // Off the control points as well.
        let probe = [455.0, 310.0];
        let [e, n] = fitted.apply(probe[0], probe[1]);
        let [ee, en] = cubic(probe);
        assert_relative_eq!(e, ee, epsilon = 1e-6);
        assert_relative_eq!(n, en, epsilon = 1e-6);
    }

    #[test]
    fn polynomial_fit_carries_its_frame_through_serialization() {
        let from = grid_points([1000.0, 2000.0], 10.0, 4, 4);
        let pairs = pairs_mapped(&from, |[e, n]| [e + 5.0, n + 5.0]);
        let kind = TransformationKind::Polynomial(PolynomialDegree::Third);
        let fitted = fit(kind, &pairs, &SolverConfig::default()).expect("16 points");
        assert_ne!(*fitted.normalization(), Normalization::IDENTITY);

        let [e, n] = fitted.apply(1000.0, 2000.0);
        assert_relative_eq!(e, 1005.0, epsilon = 1e-9);
        assert_relative_eq!(n, 2005.0, epsilon = 1e-9);

        let json = serde_json::to_string(&fitted).expect("serialize");
        let restored: FittedTransformation = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.kind(), kind);
        let [e, n] = restored.apply(1015.0, 2025.0);
        assert_relative_eq!(e, 1020.0, epsilon = 1e-9);
        assert_relative_eq!(n, 2030.0, epsilon = 1e-9);
    }

    #[test]
    fn higher_degrees_fit_noisy_similarity_grid() {
        let mut rng = StdRng::seed_from_u64(42);
        let map = similarity_fn(0.9998, -0.1, [1000.0, -500.0]);
        let from = grid_points([650_000.0, 240_000.0], 100.0, 6, 6);
        let noisy: Vec<ControlPointPair> = pairs_mapped(&from, map)
            .into_iter()
            .map(|p| {
                let mut to = p.to().en();
                to[0] += (rng.gen::<f64>() - 0.5) * 0.01;
                to[1] += (rng.gen::<f64>() - 0.5) * 0.01;
                pair(p.id(), p.from().en(), to)
            })
            .collect();

        for degree in [4u8, 5] {
            let kind = TransformationKind::polynomial(degree).expect("degree");
            let fitted = fit(kind, &noisy, &SolverConfig::default()).expect("36 points");
            for pr in &noisy {
                let [e, n] = fitted.apply_to(pr.from());
                assert!((e - pr.to().e).abs() < 0.02, "degree {degree}");
                assert!((n - pr.to().n).abs() < 0.02, "degree {degree}");
            }
        }
    }

    #[test]
    fn polynomial_minimum_point_counts_are_enforced() {
        let from = grid_points([0.0, 0.0], 10.0, 4, 5);
        let pairs = pairs_mapped(&from, |p| p);
        for (degree, needed) in [(3u8, 10usize), (4, 15), (5, 21)] {
            let kind = TransformationKind::polynomial(degree).expect("degree");
            let err = fit(kind, &pairs[..needed - 1], &SolverConfig::default()).unwrap_err();
            assert_eq!(
                err,
                TransformError::InsufficientPoints {
                    kind,
                    needed,
                    got: needed - 1
                }
            );
        }
    }

    #[test]
    fn polynomial_on_degenerate_layout_is_singular() {
        // 10 points on two parallel lines cannot determine a cubic in v.
        let from: Vec<[f64; 2]> = (0..10)
            .map(|i| [i as f64 * 10.0, if i % 2 == 0 { 0.0 } else { 10.0 }])
            .collect();
        let pairs = pairs_mapped(&from, |p| p);
        let kind = TransformationKind::polynomial(3).expect("degree");
        let err = fit(kind, &pairs, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, TransformError::SingularSystem { .. }));
    }

    #[test]
    fn unnormalized_fit_matches_normalized_for_small_coordinates() {
        let map = similarity_fn(2.0, 0.5, [3.0, 4.0]);
        let pairs = pairs_mapped(&grid_points([0.0, 0.0], 1.0, 3, 2), map);
        let raw = SolverConfig {
            normalize: false,
            ..SolverConfig::default()
        };
        let a = fit(TransformationKind::Affine, &pairs, &raw).expect("raw");
        let b = fit(TransformationKind::Affine, &pairs, &SolverConfig::default()).expect("norm");
        for (x, y) in a.params().iter().zip(b.params()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-9);
        }
    }
}
