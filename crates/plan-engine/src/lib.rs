#![deny(warnings)]

//! Projection engine: per-phase row emission and cross-phase stitching.
//!
//! A phase projects to rows `fund_start + k * delta` for `k` in
//! `0..months`, so its first row carries the same balance as the previous
//! phase's last row. The stitcher therefore drops that duplicated boundary
//! row on every phase after the first non-empty one, re-indexes months
//! globally and recomputes revenue as a first difference over the stitched
//! series.

use plan_core::{MonthRow, PhaseSpec, Projection, RateTable, Scenario, ValidationError};
use plan_econ::EconError;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by the projection engine. Fail-fast: no partial
/// projection is ever returned alongside one of these.
#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    /// Input rejected at the validation boundary.
    #[error("invalid input: {0}")]
    Validation(ValidationError),
    /// Economic model rejected the phase.
    #[error("economic model: {0}")]
    Econ(EconError),
}

impl From<ValidationError> for ProjectionError {
    fn from(e: ValidationError) -> Self {
        ProjectionError::Validation(e)
    }
}

impl From<EconError> for ProjectionError {
    fn from(e: EconError) -> Self {
        ProjectionError::Econ(e)
    }
}

/// Project a single phase from a starting fund.
///
/// Emits `spec.months` rows with `fund = fund_start + k * delta` and a
/// locally computed first-difference revenue (0 on the first row). A
/// zero-month phase yields an empty projection; the caller keeps the
/// starting fund as the handoff value.
pub fn project_phase(
    spec: &PhaseSpec,
    rates: &RateTable,
    fund_start: Decimal,
) -> Result<Projection, ProjectionError> {
    plan_core::validate_phase_spec(spec)?;
    let delta = plan_econ::monthly_delta(spec, rates)?;
    let mut rows = Vec::with_capacity(spec.months as usize);
    for k in 0..spec.months {
        let fund = fund_start + Decimal::from(k) * delta;
        let revenue = if k == 0 { Decimal::ZERO } else { delta };
        rows.push(MonthRow {
            month: k,
            fund,
            revenue,
            ndays_subcontract: spec.ndays_subcontract,
            ndays_direct: spec.ndays_direct,
            ndays_outsourced: spec.ndays_outsourced,
            npersons: spec.npersons,
        });
    }
    Ok(Projection::new(rows))
}

/// Stitch a scenario's phases into one continuous series.
///
/// The first non-empty phase keeps all its rows; every later phase is
/// projected from the last stitched fund and loses its duplicated boundary
/// row. Afterwards the month index is reassigned contiguously from 0 and
/// revenue recomputed across the whole series. Zero-month phases contribute
/// nothing and leave the handoff fund untouched.
pub fn stitch(scenario: &Scenario, rates: &RateTable) -> Result<Projection, ProjectionError> {
    plan_core::validate_rate_table(rates)?;
    let mut rows: Vec<MonthRow> = Vec::new();
    let mut handoff = scenario.initial_fund;
    for (i, spec) in scenario.phases.iter().enumerate() {
        let phase = project_phase(spec, rates, handoff)?;
        let skip = usize::from(!rows.is_empty());
        rows.extend(phase.into_rows().into_iter().skip(skip));
        if let Some(last) = rows.last() {
            handoff = last.fund;
        }
        debug!(phase = i, months = spec.months, fund = %handoff, "phase stitched");
    }

    let mut prev: Option<Decimal> = None;
    for (m, row) in rows.iter_mut().enumerate() {
        row.month = m as u32;
        row.revenue = match prev {
            Some(p) => row.fund - p,
            None => Decimal::ZERO,
        };
        prev = Some(row.fund);
    }
    Ok(Projection::new(rows))
}

/// Fund handed over to whatever follows the projection: the last stitched
/// balance, or the initial fund when no phase contributed a row.
pub fn handoff_fund(projection: &Projection, initial_fund: Decimal) -> Decimal {
    projection.last_fund().unwrap_or(initial_fund)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn phase(
        months: u32,
        npersons: u32,
        ndays_sc: Decimal,
        ndays_d: Decimal,
        ndays_out: Decimal,
    ) -> PhaseSpec {
        PhaseSpec {
            months,
            npersons,
            ndays_subcontract: ndays_sc,
            ndays_direct: ndays_d,
            ndays_outsourced: ndays_out,
        }
    }

    // 2 persons, 8.5 subcontract + 1.6 direct days: delta = -3 395
    fn reference_phase(months: u32) -> PhaseSpec {
        phase(
            months,
            2,
            Decimal::new(85, 1),
            Decimal::new(16, 1),
            Decimal::ZERO,
        )
    }

    #[test]
    fn single_phase_reference_numbers() {
        let rates = RateTable::default();
        let p = project_phase(&reference_phase(3), &rates, dec(70_000)).unwrap();
        let funds: Vec<Decimal> = p.rows().iter().map(|r| r.fund).collect();
        let revenues: Vec<Decimal> = p.rows().iter().map(|r| r.revenue).collect();
        assert_eq!(funds, vec![dec(70_000), dec(66_605), dec(63_210)]);
        assert_eq!(revenues, vec![dec(0), dec(-3395), dec(-3395)]);
    }

    #[test]
    fn three_phase_reference_scenario() {
        let rates = RateTable::default();
        let d46 = Decimal::new(46, 1);
        let scenario = Scenario {
            initial_fund: dec(70_000),
            phases: vec![
                reference_phase(7),
                phase(7, 2, Decimal::new(85, 1), d46, Decimal::ZERO),
                phase(13, 3, Decimal::new(85, 1), d46, Decimal::ZERO),
            ],
        };
        let p = stitch(&scenario, &rates).unwrap();

        // 7 + 6 + 12 rows: the boundary row of each later phase is dropped
        assert_eq!(p.len(), 25);
        plan_core::validate_projection(&p).unwrap();

        let rows = p.rows();
        // phase 1 ends at 70 000 + 6 * (-3 395)
        assert_eq!(rows[6].fund, dec(49_630));
        // phase 2 delta: -11 000 + (8.5 * 650 + 4.6 * 1300) = +505
        assert_eq!(rows[7].fund - rows[6].fund, dec(505));
        assert_eq!(rows[7].revenue, dec(505));
        assert_eq!(rows[12].fund, dec(52_660));
        // phase 3 delta: -17 500 + 11 505 = -5 995
        assert_eq!(rows[13].fund - rows[12].fund, dec(-5995));
        assert_eq!(rows[24].fund, dec(-19_280));
        assert_eq!(handoff_fund(&p, scenario.initial_fund), dec(-19_280));

        // echoed columns follow the owning phase
        assert_eq!(rows[6].npersons, 2);
        assert_eq!(rows[6].ndays_direct, Decimal::new(16, 1));
        assert_eq!(rows[7].npersons, 2);
        assert_eq!(rows[7].ndays_direct, d46);
        assert_eq!(rows[13].npersons, 3);
    }

    #[test]
    fn headcount_four_uses_affine_tail() {
        let rates = RateTable::default();
        let spec = phase(2, 4, Decimal::new(85, 1), Decimal::new(16, 1), Decimal::ZERO);
        let p = project_phase(&spec, &rates, dec(100_000)).unwrap();
        // delta = -41 500 + 7 605
        assert_eq!(p.rows()[1].fund - p.rows()[0].fund, dec(-33_895));
    }

    #[test]
    fn headcount_below_two_fails_fast() {
        let rates = RateTable::default();
        let bad = phase(3, 1, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(
            project_phase(&bad, &rates, dec(70_000)),
            Err(ProjectionError::Econ(EconError::InvalidHeadcount(1)))
        );
        let scenario = Scenario {
            initial_fund: dec(70_000),
            phases: vec![reference_phase(3), bad],
        };
        assert!(stitch(&scenario, &rates).is_err());
    }

    #[test]
    fn empty_phase_list_keeps_initial_fund() {
        let rates = RateTable::default();
        let scenario = Scenario {
            initial_fund: dec(80_000),
            phases: vec![],
        };
        let p = stitch(&scenario, &rates).unwrap();
        assert!(p.is_empty());
        assert_eq!(handoff_fund(&p, scenario.initial_fund), dec(80_000));
    }

    #[test]
    fn zero_day_phase_burns_spending_only() {
        let rates = RateTable::default();
        let spec = phase(4, 2, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let p = project_phase(&spec, &rates, dec(70_000)).unwrap();
        let funds: Vec<Decimal> = p.rows().iter().map(|r| r.fund).collect();
        assert_eq!(
            funds,
            vec![dec(70_000), dec(59_000), dec(48_000), dec(37_000)]
        );
    }

    #[test]
    fn single_month_phase_has_zero_revenue() {
        let rates = RateTable::default();
        let scenario = Scenario {
            initial_fund: dec(70_000),
            phases: vec![reference_phase(1)],
        };
        let p = stitch(&scenario, &rates).unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p.rows()[0].revenue, Decimal::ZERO);
        assert_eq!(p.rows()[0].fund, dec(70_000));
    }

    #[test]
    fn one_month_follow_up_phase_contributes_nothing() {
        // Its only row is the duplicated boundary row, which the stitcher drops.
        let rates = RateTable::default();
        let scenario = Scenario {
            initial_fund: dec(70_000),
            phases: vec![reference_phase(3), reference_phase(1)],
        };
        let p = stitch(&scenario, &rates).unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(handoff_fund(&p, scenario.initial_fund), dec(63_210));
    }

    #[test]
    fn negative_days_rejected_before_projection() {
        let rates = RateTable::default();
        let mut bad = reference_phase(3);
        bad.ndays_outsourced = Decimal::new(-1, 0);
        assert_eq!(
            project_phase(&bad, &rates, dec(70_000)),
            Err(ProjectionError::Validation(ValidationError::InvalidDays))
        );
    }

    #[test]
    fn negative_rates_rejected_by_stitch() {
        let rates = RateTable {
            tj_direct: dec(-1300),
            ..RateTable::default()
        };
        let scenario = Scenario {
            initial_fund: dec(70_000),
            phases: vec![reference_phase(3)],
        };
        assert_eq!(
            stitch(&scenario, &rates),
            Err(ProjectionError::Validation(ValidationError::InvalidRate))
        );
    }

    fn arb_phase() -> impl Strategy<Value = PhaseSpec> {
        (0u32..8, 2u32..7, 0i64..400, 0i64..400, 0i64..400).prop_map(
            |(months, npersons, sc, d, out)| PhaseSpec {
                months,
                npersons,
                ndays_subcontract: Decimal::new(sc, 1),
                ndays_direct: Decimal::new(d, 1),
                ndays_outsourced: Decimal::new(out, 1),
            },
        )
    }

    proptest! {
        #[test]
        fn stitched_series_upholds_invariants(
            initial in -100_000i64..200_000,
            phases in prop::collection::vec(arb_phase(), 0..8)
        ) {
            let rates = RateTable::default();
            let scenario = Scenario { initial_fund: dec(initial), phases };
            let p = stitch(&scenario, &rates).unwrap();
            prop_assert!(plan_core::validate_projection(&p).is_ok());

            // row count: every phase after the first non-empty one loses a row
            let positive: Vec<u32> = scenario
                .phases
                .iter()
                .map(|s| s.months)
                .filter(|&m| m > 0)
                .collect();
            let expected_len = match positive.len() {
                0 => 0,
                n => positive.iter().sum::<u32>() as usize - (n - 1),
            };
            prop_assert_eq!(p.len(), expected_len);

            // final fund: each non-empty phase advances months - 1 deltas
            let mut expected_fund = scenario.initial_fund;
            for spec in &scenario.phases {
                if spec.months > 0 {
                    let delta = plan_econ::monthly_delta(spec, &rates).unwrap();
                    expected_fund += Decimal::from(spec.months - 1) * delta;
                }
            }
            prop_assert_eq!(handoff_fund(&p, scenario.initial_fund), expected_fund);
        }

        #[test]
        fn zero_month_phases_are_inert(
            initial in -100_000i64..200_000,
            phases in prop::collection::vec(arb_phase(), 0..8)
        ) {
            let rates = RateTable::default();
            let with_empty = Scenario { initial_fund: dec(initial), phases: phases.clone() };
            let without_empty = Scenario {
                initial_fund: dec(initial),
                phases: phases.into_iter().filter(|s| s.months > 0).collect(),
            };
            prop_assert_eq!(
                stitch(&with_empty, &rates).unwrap(),
                stitch(&without_empty, &rates).unwrap()
            );
        }

        #[test]
        fn phase_rows_are_affine_in_offset(
            start in -100_000i64..200_000,
            months in 1u32..60,
            spec in arb_phase()
        ) {
            let rates = RateTable::default();
            let spec = PhaseSpec { months, ..spec };
            let delta = plan_econ::monthly_delta(&spec, &rates).unwrap();
            let p = project_phase(&spec, &rates, dec(start)).unwrap();
            for (k, row) in p.rows().iter().enumerate() {
                prop_assert_eq!(row.fund, dec(start) + Decimal::from(k as u32) * delta);
            }
        }
    }
}
