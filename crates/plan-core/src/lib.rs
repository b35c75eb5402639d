#![deny(warnings)]

//! Core domain models and invariants for phased cash-fund projections.
//!
//! This crate defines the serializable types shared across the projection
//! engine with validation helpers to guarantee basic invariants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-supplied parameters for one operating phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Phase duration in months (abstract ticks, no calendar semantics).
    pub months: u32,
    /// Headcount during the phase.
    pub npersons: u32,
    /// Billable days per month charged at the subcontract rate.
    pub ndays_subcontract: Decimal,
    /// Billable days per month charged at the direct rate.
    pub ndays_direct: Decimal,
    /// Billable days per month charged at the outsourced rate.
    pub ndays_outsourced: Decimal,
}

/// Per-day billing rates, in currency units per day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// Subcontract day rate.
    pub tj_subcontract: Decimal,
    /// Direct day rate.
    pub tj_direct: Decimal,
    /// Outsourced day rate (30% of the direct rate by default).
    pub tj_outsourced: Decimal,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            tj_subcontract: Decimal::new(650, 0),
            tj_direct: Decimal::new(1300, 0),
            tj_outsourced: Decimal::new(390, 0),
        }
    }
}

/// One row of the stitched output series.
///
/// `revenue` is the month-over-month change in fund, not gross revenue; the
/// day-split and headcount columns echo the phase that owns the row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthRow {
    /// Global month index, contiguous from 0.
    pub month: u32,
    /// Fund balance at this month.
    pub fund: Decimal,
    /// First difference of the fund column; 0 on the first row.
    pub revenue: Decimal,
    /// Echoed from the owning phase.
    pub ndays_subcontract: Decimal,
    /// Echoed from the owning phase.
    pub ndays_direct: Decimal,
    /// Echoed from the owning phase.
    pub ndays_outsourced: Decimal,
    /// Echoed from the owning phase.
    pub npersons: u32,
}

/// Ordered month-indexed series. Immutable once constructed; serializes as a
/// plain sequence of rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection {
    rows: Vec<MonthRow>,
}

impl Projection {
    /// Wrap an already-ordered row sequence.
    pub fn new(rows: Vec<MonthRow>) -> Self {
        Self { rows }
    }

    /// Borrow the rows in month order.
    pub fn rows(&self) -> &[MonthRow] {
        &self.rows
    }

    /// Consume the projection, yielding its rows.
    pub fn into_rows(self) -> Vec<MonthRow> {
        self.rows
    }

    /// Number of months covered.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True for the zero-month projection.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fund balance of the last row, if any.
    pub fn last_fund(&self) -> Option<Decimal> {
        self.rows.last().map(|r| r.fund)
    }
}

/// Scenario: the full input surface of the projection engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Fund balance before the first phase.
    pub initial_fund: Decimal,
    /// Operating phases, processed strictly in order.
    pub phases: Vec<PhaseSpec>,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Phase duration below zero (raw widget input).
    #[error("phase duration must be >= 0 months, got {0}")]
    InvalidDuration(i64),
    /// Billable day counts must be non-negative.
    #[error("billable day counts must be >= 0")]
    InvalidDays,
    /// Per-day rates must be non-negative.
    #[error("per-day rates must be >= 0")]
    InvalidRate,
    /// Month indices must be contiguous from 0.
    #[error("month index broken at row {0}")]
    BrokenMonthIndex(u32),
    /// Revenue must be the first difference of the fund column.
    #[error("revenue at month {0} is not the fund first-difference")]
    BrokenRevenue(u32),
}

/// Validate a phase spec. Headcount is the spending policy's domain and is
/// checked there, not here.
pub fn validate_phase_spec(spec: &PhaseSpec) -> Result<(), ValidationError> {
    if spec.ndays_subcontract < Decimal::ZERO
        || spec.ndays_direct < Decimal::ZERO
        || spec.ndays_outsourced < Decimal::ZERO
    {
        return Err(ValidationError::InvalidDays);
    }
    Ok(())
}

/// Validate a rate table.
pub fn validate_rate_table(rates: &RateTable) -> Result<(), ValidationError> {
    if rates.tj_subcontract < Decimal::ZERO
        || rates.tj_direct < Decimal::ZERO
        || rates.tj_outsourced < Decimal::ZERO
    {
        return Err(ValidationError::InvalidRate);
    }
    Ok(())
}

/// Validate a scenario: every phase, in order.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    for spec in &scenario.phases {
        validate_phase_spec(spec)?;
    }
    Ok(())
}

/// Validate a stitched series: contiguous month index from 0, zero revenue on
/// the first row, and revenue equal to the fund first-difference after it.
pub fn validate_projection(projection: &Projection) -> Result<(), ValidationError> {
    let mut prev: Option<&MonthRow> = None;
    for (m, row) in projection.rows().iter().enumerate() {
        if row.month != m as u32 {
            return Err(ValidationError::BrokenMonthIndex(row.month));
        }
        let expected = match prev {
            Some(p) => row.fund - p.fund,
            None => Decimal::ZERO,
        };
        if row.revenue != expected {
            return Err(ValidationError::BrokenRevenue(row.month));
        }
        prev = Some(row);
    }
    Ok(())
}
