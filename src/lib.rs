//! Power-amplifier DPD core
//!
//! The numerical heart of a digital-predistortion measurement loop: time
//! alignment of a captured PA output against its reference, and fitting /
//! evaluating a Generalized Memory Polynomial model of the amplifier.
//!
//! ## Architecture
//!
//! - `domain/` - Pure domain types, configuration and errors
//! - `dsp/` - Signal processing building blocks (correlation, sinc
//!   interpolation, splines, least squares, quality metrics)
//! - `align/` - Coarse + fine delay estimation, phase sync, RMS normalization
//! - `gmp/` - GMP basis construction, coefficient extraction and evaluation
//!
//! Everything is synchronous and works on in-memory sample buffers.
//! Instrument control, file formats and the DPD iteration loop belong to
//! the caller.
//!
//! One DPD iteration (indirect learning):
//!
//! ```no_run
//! use rfdpd::{align, extract, evaluate, AlignmentMethod, GmpConfig, Sample};
//!
//! # fn capture(_: &[Sample]) -> Vec<Sample> { unimplemented!() }
//! # fn main() -> rfdpd::DpdResult<()> {
//! let reference: Vec<Sample> = vec![Sample::new(0.5, 0.0); 4096];
//! let config = GmpConfig::default();
//! let pa_input = reference.clone();
//!
//! let pa_output = align(&reference, &capture(&pa_input), AlignmentMethod::Spline)?;
//! let post_inverse = extract(&pa_output, &pa_input, &config)?;
//! let predistorted = evaluate(&reference, &post_inverse, &config)?;
//! # let _ = predistorted;
//! # Ok(())
//! # }
//! ```

// Core domain (pure, no I/O)
pub mod domain;
pub mod dsp;

// Processing stages
pub mod align;
pub mod gmp;

pub use align::{align, Aligner, FineAlignment};
pub use domain::{
    AlignConfig, AlignmentMethod, DpdError, DpdResult, Frequency, GmpConfig, NanPolicy, Sample,
};
pub use gmp::{evaluate, extract, GmpBasisBuilder, GmpCoefficients, GmpEvaluator, GmpExtractor};
