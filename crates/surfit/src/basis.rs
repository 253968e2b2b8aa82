//! Monomial basis for bivariate polynomials.
//!
//! Term order
//! - `for i in 0..=degree { for j in 0..=degree - i { x^i y^j } }`.
//! - Coefficient index `k` always refers to the `k`-th term of this walk. The
//!   solver, the sampler, and any stored coefficient vector share it.
//! - Consequently `(0, 1)` sits at index 1 and `(1, 0)` at index `degree + 1`.
//!   Use `term_index` instead of hard-coding positions.

use std::fmt;

/// Degree/coefficient mismatch between a basis evaluation and a coefficient vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BasisError {
    InvalidArgument { degree: usize, expected: usize, found: usize },
}

impl fmt::Display for BasisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisError::InvalidArgument {
                degree,
                expected,
                found,
            } => write!(
                f,
                "degree {degree} needs {expected} coefficients, got {found}"
            ),
        }
    }
}

impl std::error::Error for BasisError {}

/// Number of monomials with `i + j <= degree`: `(d+1)(d+2)/2`.
#[inline]
pub fn term_count(degree: usize) -> usize {
    (degree + 1) * (degree + 2) / 2
}

/// Exponent pairs `(i, j)` in coefficient order.
pub fn enumerate_terms(degree: usize) -> Vec<(usize, usize)> {
    let mut terms = Vec::with_capacity(term_count(degree));
    for i in 0..=degree {
        for j in 0..=degree - i {
            terms.push((i, j));
        }
    }
    terms
}

/// Coefficient index of `x^i y^j`, or `None` when `i + j > degree`.
#[inline]
pub fn term_index(i: usize, j: usize, degree: usize) -> Option<usize> {
    if i + j > degree {
        return None;
    }
    // Blocks for i' < i hold (degree - i' + 1) terms each.
    Some(i * (degree + 1) - i * i.saturating_sub(1) / 2 + j)
}

/// Monomial values at `(x, y)` in coefficient order. `x^0 = y^0 = 1` for every input.
pub fn evaluate_row(x: f64, y: f64, degree: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(term_count(degree));
    evaluate_row_into(x, y, degree, &mut row);
    row
}

/// Same as `evaluate_row`, reusing `out` (cleared first).
pub fn evaluate_row_into(x: f64, y: f64, degree: usize, out: &mut Vec<f64>) {
    out.clear();
    let y_pows = powers(y, degree);
    let mut xi = 1.0;
    for i in 0..=degree {
        for yj in &y_pows[..=degree - i] {
            out.push(xi * yj);
        }
        xi *= x;
    }
}

fn powers(v: f64, degree: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(degree + 1);
    let mut acc = 1.0;
    for _ in 0..=degree {
        out.push(acc);
        acc *= v;
    }
    out
}

/// Dot product of the basis row at `(x, y)` with `coefficients`.
pub fn evaluate(coefficients: &[f64], degree: usize, x: f64, y: f64) -> Result<f64, BasisError> {
    check_len(coefficients.len(), degree)?;
    Ok(dot_row(coefficients, degree, x, y))
}

fn check_len(found: usize, degree: usize) -> Result<(), BasisError> {
    let expected = term_count(degree);
    if found != expected {
        return Err(BasisError::InvalidArgument {
            degree,
            expected,
            found,
        });
    }
    Ok(())
}

// Length already checked by the caller.
fn dot_row(coefficients: &[f64], degree: usize, x: f64, y: f64) -> f64 {
    let y_pows = powers(y, degree);
    let mut k = 0;
    let mut xi = 1.0;
    let mut acc = 0.0;
    for i in 0..=degree {
        for yj in &y_pows[..=degree - i] {
            acc += coefficients[k] * xi * yj;
            k += 1;
        }
        xi *= x;
    }
    acc
}

/// Fitted bivariate polynomial: degree plus a coefficient vector of matching length.
///
/// Immutable once built; adjustments return a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial2 {
    degree: usize,
    coefficients: Vec<f64>,
}

impl Polynomial2 {
    pub fn new(degree: usize, coefficients: Vec<f64>) -> Result<Self, BasisError> {
        check_len(coefficients.len(), degree)?;
        Ok(Self {
            degree,
            coefficients,
        })
    }

    /// Constant surface `z = c` of the given degree (all other terms zero).
    pub fn constant(degree: usize, c: f64) -> Self {
        let mut coefficients = vec![0.0; term_count(degree)];
        coefficients[0] = c;
        Self {
            degree,
            coefficients,
        }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.degree
    }

    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Coefficient of `x^i y^j` (zero when the term is above the degree).
    pub fn coefficient(&self, i: usize, j: usize) -> f64 {
        term_index(i, j, self.degree).map_or(0.0, |k| self.coefficients[k])
    }

    #[inline]
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        dot_row(&self.coefficients, self.degree, x, y)
    }

    /// Copy with coefficients 1 and 2 zeroed (planar tilt removal).
    ///
    /// This is a positional overwrite. At degree 1 the two slots are the `y`
    /// and `x` terms; from degree 2 on they hold `y` and `y^2`, and the `x`
    /// term at `degree + 1` is kept. Degree 0 is returned unchanged.
    pub fn without_tilt(&self) -> Self {
        let mut out = self.clone();
        if self.degree >= 1 {
            out.coefficients[1] = 0.0;
            out.coefficients[2] = 0.0;
        }
        out
    }

    pub fn into_coefficients(self) -> Vec<f64> {
        self.coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn degree_two_order() {
        assert_eq!(
            enumerate_terms(2),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (2, 0)]
        );
    }

    #[test]
    fn degree_zero_is_constant() {
        assert_eq!(enumerate_terms(0), vec![(0, 0)]);
        assert_eq!(evaluate_row(3.5, -2.0, 0), vec![1.0]);
    }

    #[test]
    fn row_at_origin_is_unit_vector() {
        for d in 0..7 {
            let row = evaluate_row(0.0, 0.0, d);
            assert_eq!(row.len(), term_count(d));
            assert_eq!(row[0], 1.0);
            assert!(row[1..].iter().all(|&v| v == 0.0), "degree {d}: {row:?}");
        }
    }

    #[test]
    fn row_matches_powi() {
        let (x, y) = (1.5, -0.75);
        let row = evaluate_row(x, y, 4);
        for (k, (i, j)) in enumerate_terms(4).into_iter().enumerate() {
            let expected = x.powi(i as i32) * y.powi(j as i32);
            assert!((row[k] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn evaluate_rejects_wrong_length() {
        let err = evaluate(&[1.0, 2.0], 1, 0.0, 0.0).unwrap_err();
        assert_eq!(
            err,
            BasisError::InvalidArgument {
                degree: 1,
                expected: 3,
                found: 2
            }
        );
        assert!(Polynomial2::new(2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn tilt_removal_zeroes_slots_one_and_two() {
        // z = 1 + 2y + 3y^2 + 4x + 5xy + 6x^2
        let p = Polynomial2::new(2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(p.coefficient(1, 0), 4.0);
        assert_eq!(p.coefficient(0, 1), 2.0);
        let flat = p.without_tilt();
        assert_eq!(flat.coefficients(), &[1.0, 0.0, 0.0, 4.0, 5.0, 6.0]);
        // degree 1: the slots are exactly the linear terms
        let plane = Polynomial2::new(1, vec![5.0, 3.0, 2.0]).unwrap();
        assert_eq!(plane.without_tilt().coefficients(), &[5.0, 0.0, 0.0]);
        let c = Polynomial2::constant(0, 2.0);
        assert_eq!(c.without_tilt(), c);
    }

    #[test]
    fn eval_agrees_with_free_function() {
        let p = Polynomial2::new(2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let (x, y) = (0.5, 2.0);
        let direct = 1.0 + 2.0 * y + 3.0 * y * y + 4.0 * x + 5.0 * x * y + 6.0 * x * x;
        assert!((p.eval(x, y) - direct).abs() < 1e-12);
        assert!((evaluate(p.coefficients(), 2, x, y).unwrap() - direct).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn terms_are_complete_and_unique(d in 0usize..12) {
            let terms = enumerate_terms(d);
            prop_assert_eq!(terms.len(), (d + 1) * (d + 2) / 2);
            let set: HashSet<_> = terms.iter().copied().collect();
            prop_assert_eq!(set.len(), terms.len());
            for i in 0..=d {
                for j in 0..=d - i {
                    prop_assert!(set.contains(&(i, j)));
                }
            }
        }

        #[test]
        fn term_index_inverts_enumeration(d in 0usize..12) {
            for (k, (i, j)) in enumerate_terms(d).into_iter().enumerate() {
                prop_assert_eq!(term_index(i, j, d), Some(k));
            }
            prop_assert_eq!(term_index(d + 1, 0, d), None);
        }
    }
}
