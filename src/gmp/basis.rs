//! GMP basis construction
//!
//! Columns are enumerated once, as a list of [`BasisTerm`]s, and that list
//! is the single source of truth for both extraction and evaluation. The
//! order is aligned block, then lagging, then leading, each nested as
//! `k` outermost, then `l`, then `m`.

use nalgebra::DMatrix;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::domain::{DpdError, DpdResult, GmpConfig, NanPolicy, Sample};

/// Which GMP block a column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Aligned,
    Lagging,
    Leading,
}

/// One basis column: `x[n - carrier_lag] · |x[n - envelope_lag]|^exponent`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasisTerm {
    pub block: Block,
    pub carrier_lag: isize,
    pub envelope_lag: isize,
    pub exponent: i32,
}

impl BasisTerm {
    /// Write this term for circular input `x` into `column`, zeroing
    /// non-finite entries. Returns how many entries were zeroed.
    fn fill(&self, x: &[Sample], column: &mut [Sample]) -> usize {
        let n = x.len() as isize;
        let mut degenerate = 0;
        for (i, out) in column.iter_mut().enumerate() {
            let i = i as isize;
            let carrier = x[(i - self.carrier_lag).rem_euclid(n) as usize];
            let envelope = x[(i - self.envelope_lag).rem_euclid(n) as usize].norm();
            let value = carrier * envelope.powi(self.exponent);
            if value.re.is_finite() && value.im.is_finite() {
                *out = value;
            } else {
                *out = Sample::new(0.0, 0.0);
                degenerate += 1;
            }
        }
        degenerate
    }
}

/// Column layout for `config`, in the fixed enumeration order
pub fn basis_terms(config: &GmpConfig) -> Vec<BasisTerm> {
    let [ka, kb, kc] = config.nonlinear_order;
    let [la, lb, lc] = config.lagging_depth;
    let [mb, mc] = config.memory_depth;
    let mut terms = Vec::with_capacity(config.basis_len());

    for k in 0..ka {
        for l in 0..la {
            terms.push(BasisTerm {
                block: Block::Aligned,
                carrier_lag: l as isize,
                envelope_lag: l as isize,
                exponent: k as i32,
            });
        }
    }
    for k in 0..kb {
        for l in 0..lb {
            for m in 0..mb {
                terms.push(BasisTerm {
                    block: Block::Lagging,
                    carrier_lag: l as isize,
                    envelope_lag: (l + m + 1) as isize,
                    exponent: k as i32 + 1,
                });
            }
        }
    }
    for k in 0..kc {
        for l in 0..lc {
            for m in 0..mc {
                terms.push(BasisTerm {
                    block: Block::Leading,
                    carrier_lag: l as isize,
                    envelope_lag: l as isize - (m as isize + 1),
                    exponent: k as i32 + 1,
                });
            }
        }
    }
    terms
}

/// N×P complex feature matrix, stored column-major
#[derive(Debug, Clone)]
pub struct BasisMatrix {
    matrix: DMatrix<Sample>,
    degenerate_entries: usize,
}

impl BasisMatrix {
    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn columns(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn column(&self, j: usize) -> &[Sample] {
        let n = self.rows();
        &self.matrix.as_slice()[j * n..(j + 1) * n]
    }

    pub fn matrix(&self) -> &DMatrix<Sample> {
        &self.matrix
    }

    /// Entries that came out NaN/Inf and were replaced by zero
    pub fn degenerate_entries(&self) -> usize {
        self.degenerate_entries
    }
}

/// Builds GMP feature matrices for a fixed model configuration
#[derive(Debug, Clone)]
pub struct GmpBasisBuilder {
    terms: Vec<BasisTerm>,
    nan_policy: NanPolicy,
}

impl GmpBasisBuilder {
    pub fn new(config: &GmpConfig) -> DpdResult<Self> {
        config.validate()?;
        Ok(Self {
            terms: basis_terms(config),
            nan_policy: config.nan_policy,
        })
    }

    pub fn terms(&self) -> &[BasisTerm] {
        &self.terms
    }

    pub fn columns(&self) -> usize {
        self.terms.len()
    }

    pub fn build(&self, x: &[Sample]) -> DpdResult<BasisMatrix> {
        if x.is_empty() {
            return Err(DpdError::InvalidArgument(
                "cannot build a basis from an empty signal".to_string(),
            ));
        }
        let n = x.len();
        let mut matrix = DMatrix::<Sample>::zeros(n, self.terms.len());

        #[cfg(feature = "parallel")]
        let degenerate_entries: usize = matrix
            .as_mut_slice()
            .par_chunks_mut(n)
            .zip(self.terms.par_iter())
            .map(|(column, term)| term.fill(x, column))
            .sum();

        #[cfg(not(feature = "parallel"))]
        let degenerate_entries: usize = matrix
            .as_mut_slice()
            .chunks_mut(n)
            .zip(self.terms.iter())
            .map(|(column, term)| term.fill(x, column))
            .sum();

        if degenerate_entries > 0 {
            match self.nan_policy {
                NanPolicy::Zero => log::warn!(
                    "GMP basis: zeroed {degenerate_entries} non-finite entries out of {}",
                    n * self.terms.len()
                ),
                NanPolicy::Reject => {
                    return Err(DpdError::NumericDegeneracy(format!(
                        "GMP basis has {degenerate_entries} non-finite entries"
                    )))
                }
            }
        }

        Ok(BasisMatrix {
            matrix,
            degenerate_entries,
        })
    }
}
