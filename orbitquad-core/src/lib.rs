// Arithmetic subsystem: modes, exact surds, and constant expressions
pub mod arithmetic;
pub mod error;
pub mod expr;
pub mod surd;

// Expansion subsystem: symmetry orbits and table assembly
pub mod assemble;
pub mod barycentric;
pub mod orbit;
pub mod table;

// Verification subsystem: monomials, reference domains, and degree search
pub mod catalog;
pub mod domain;
pub mod monomial;
pub mod verify;

#[cfg(test)]
mod proptests;

// Public arithmetic API
pub use crate::arithmetic::{ArithmeticMode, Scalar, Tolerance};
pub use crate::error::{ensure_mode, QuadError, QuadResult};
pub use crate::expr::Expr;
pub use crate::surd::Surd;

// Public expansion API
pub use crate::assemble::{assemble, OrbitEntry, PointSource};
pub use crate::barycentric::BarycentricOrbit;
pub use crate::orbit::{MagnitudeGroup, OrbitDescriptor};
pub use crate::table::SchemeTable;

// Public verification API
pub use crate::catalog::{by_name, NamedScheme, SCHEME_NAMES};
pub use crate::domain::Domain;
pub use crate::monomial::{evaluate_monomial, monomial_count, monomial_exponents};
pub use crate::verify::{
	quadrature_sum, verify_degree, verify_table, DegreeCertificate, ExactnessAnomaly,
	MonomialMismatch, Verification, VerifyOptions,
};
