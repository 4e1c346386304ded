use immersed_quadrature::integrate;
use immersed_quadrature::univariate::{composite_gauss, gauss};

use matrixcompare::assert_scalar_eq;

#[test]
fn gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=200 {
        let expected_polynomial_degree = 2 * n - 1;
        let rule = gauss(n);

        // Also test that weights are positive
        assert!(rule.0.iter().all(|&w| w > 0.0));

        // Integrate all monomials of degree <= expected polynomial degree that can be
        // exactly integrated
        for alpha in 0..=expected_polynomial_degree as i32 {
            let monomial = |x: f64| x.powi(alpha);
            let monomial_integral = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
            let estimated_integral = integrate(&rule, |x| monomial(x[0]));

            assert_scalar_eq!(estimated_integral, monomial_integral, comp = abs, tol = 1e-14);
        }
    }
}

#[test]
fn composite_gauss_rules_satisfy_expected_accuracy() {
    for n in 1..=10 {
        for num_intervals in 1..=8 {
            let expected_polynomial_degree = 2 * n - 1;
            let rule = composite_gauss(n, num_intervals);

            assert_eq!(rule.0.len(), n * num_intervals);
            assert!(rule.0.iter().all(|&w| w > 0.0));

            for alpha in 0..=expected_polynomial_degree as i32 {
                let monomial = |x: f64| x.powi(alpha);
                let monomial_integral = (1.0 - (-1.0f64).powi(alpha + 1)) / (alpha as f64 + 1.0);
                let estimated_integral = integrate(&rule, |x| monomial(x[0]));

                assert_scalar_eq!(estimated_integral, monomial_integral, comp = abs, tol = 1e-13);
            }
        }
    }
}

#[test]
fn composite_gauss_points_are_ordered_and_contained() {
    let (_, points) = composite_gauss(3, 5);
    assert!(points.windows(2).all(|w| w[0][0] < w[1][0]));
    assert!(points.iter().all(|&[x]| -1.0 < x && x < 1.0));
}
