#![deny(warnings)]

//! Economic model: billing income and headcount-driven spending.
//!
//! This crate provides the two pure building blocks of the projection:
//! - Gross monthly income from a billable-day split at fixed per-day rates
//! - Monthly outflow as a closed table over headcount, with an affine tail

use plan_core::{PhaseSpec, RateTable};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the economic model.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// The spending table is defined for two persons and up.
    #[error("headcount must be at least 2, got {0}")]
    InvalidHeadcount(u32),
}

/// Gross monthly earnings for a billable-day split.
///
/// Linear in each day-count argument; pure and total on non-negative inputs.
///
/// Example:
/// let rates = RateTable::default();
/// let earned = income(Decimal::new(85, 1), Decimal::new(16, 1), Decimal::ZERO, &rates);
/// assert_eq!(earned, Decimal::new(7605, 0));
pub fn income(
    ndays_subcontract: Decimal,
    ndays_direct: Decimal,
    ndays_outsourced: Decimal,
    rates: &RateTable,
) -> Decimal {
    ndays_subcontract * rates.tj_subcontract
        + ndays_direct * rates.tj_direct
        + ndays_outsourced * rates.tj_outsourced
}

/// Monthly outflow for a given headcount, negative by construction.
///
/// 2 persons cost 11 000 a month and 3 cost 17 500; larger teams pay the
/// 3-person base plus a 6 000 overhead per person across the whole
/// headcount. Fewer than 2 persons is outside the table's domain.
pub fn spending(npersons: u32) -> Result<Decimal, EconError> {
    match npersons {
        0 | 1 => Err(EconError::InvalidHeadcount(npersons)),
        2 => Ok(Decimal::new(-11_000, 0)),
        3 => Ok(Decimal::new(-17_500, 0)),
        n => Ok(Decimal::new(-17_500, 0) - Decimal::new(6_000, 0) * Decimal::from(n)),
    }
}

/// Net fund change per month for one phase: spending plus income.
pub fn monthly_delta(spec: &PhaseSpec, rates: &RateTable) -> Result<Decimal, EconError> {
    let earned = income(
        spec.ndays_subcontract,
        spec.ndays_direct,
        spec.ndays_outsourced,
        rates,
    );
    Ok(spending(spec.npersons)? + earned)
}
