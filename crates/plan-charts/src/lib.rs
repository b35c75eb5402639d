#![deny(warnings)]

//! Presentation adapter: widget model, figure assembly and negative-value
//! styling.
//!
//! This is the only crate aware of widgets, colours and axis labels. It maps
//! a stitched [`Projection`] onto a serializable two-panel figure that any
//! UI host can render, and admits raw slider values into validated phase
//! specs.

use plan_core::{PhaseSpec, Projection, Scenario, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of phases the reference dashboard exposes.
pub const DEFAULT_NPHASES: usize = 3;

/// Fund balance the reference dashboard starts from.
pub fn default_initial_fund() -> Decimal {
    Decimal::new(70_000, 0)
}

/// One slider control as the reference dashboard exposes it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SliderSpec {
    /// Widget id, unique per phase (e.g. "duration2").
    pub id: String,
    /// Human-readable label.
    pub label: String,
    pub min: Decimal,
    pub max: Decimal,
    pub default: Decimal,
}

impl SliderSpec {
    fn new(id: String, label: &str, min: i64, max: i64, default: Decimal) -> Self {
        Self {
            id,
            label: label.to_string(),
            min: Decimal::new(min, 0),
            max: Decimal::new(max, 0),
            default,
        }
    }
}

/// The five controls of one phase, with the reference ranges and defaults.
pub fn phase_controls(phase_no: usize) -> Vec<SliderSpec> {
    vec![
        SliderSpec::new(
            format!("duration{phase_no}"),
            "Duration [months]",
            0,
            24,
            Decimal::new(6, 0),
        ),
        SliderSpec::new(
            format!("nemployees{phase_no}"),
            "Number of employees",
            2,
            3,
            Decimal::new(2, 0),
        ),
        SliderSpec::new(
            format!("ndays_subcontract{phase_no}"),
            "Number of days - subcontract",
            0,
            40,
            Decimal::new(85, 1),
        ),
        SliderSpec::new(
            format!("ndays_direct{phase_no}"),
            "Number of days - direct",
            0,
            40,
            Decimal::new(16, 1),
        ),
        SliderSpec::new(
            format!("ndays_outsourced{phase_no}"),
            "Number of days - outsourced",
            0,
            40,
            Decimal::ZERO,
        ),
    ]
}

/// Raw slider values for one phase, as delivered by a UI host. Durations and
/// headcounts arrive as signed integers and are only admitted into the
/// unsigned model fields after validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseForm {
    pub duration: i64,
    pub nemployees: i64,
    pub ndays_subcontract: Decimal,
    pub ndays_direct: Decimal,
    pub ndays_outsourced: Decimal,
}

impl PhaseForm {
    /// Admit raw widget values into a validated phase spec.
    pub fn into_spec(self) -> Result<PhaseSpec, ValidationError> {
        let months = u32::try_from(self.duration)
            .map_err(|_| ValidationError::InvalidDuration(self.duration))?;
        // An out-of-range headcount collapses to 0, which the spending
        // policy rejects as InvalidHeadcount when the phase is projected.
        let npersons = u32::try_from(self.nemployees).unwrap_or(0);
        let spec = PhaseSpec {
            months,
            npersons,
            ndays_subcontract: self.ndays_subcontract,
            ndays_direct: self.ndays_direct,
            ndays_outsourced: self.ndays_outsourced,
        };
        plan_core::validate_phase_spec(&spec)?;
        Ok(spec)
    }
}

/// Raw dashboard state: initial fund plus one form per phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioForm {
    pub initial_fund: Decimal,
    pub phases: Vec<PhaseForm>,
}

impl ScenarioForm {
    /// The three-phase scenario the reference dashboard boots with.
    pub fn reference() -> Self {
        let form = |duration, nemployees, ndays_direct| PhaseForm {
            duration,
            nemployees,
            ndays_subcontract: Decimal::new(85, 1),
            ndays_direct,
            ndays_outsourced: Decimal::ZERO,
        };
        Self {
            initial_fund: default_initial_fund(),
            phases: vec![
                form(7, 2, Decimal::new(16, 1)),
                form(7, 2, Decimal::new(46, 1)),
                form(13, 3, Decimal::new(46, 1)),
            ],
        }
    }

    /// Validate every phase form, in order, into a scenario.
    pub fn into_scenario(self) -> Result<Scenario, ValidationError> {
        let mut phases = Vec::with_capacity(self.phases.len());
        for form in self.phases {
            phases.push(form.into_spec()?);
        }
        Ok(Scenario {
            initial_fund: self.initial_fund,
            phases,
        })
    }
}

/// A single plotted series.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    /// Continuous line over the month axis.
    Line {
        name: String,
        color: String,
        values: Vec<Decimal>,
    },
    /// Narrow bars with a fixed colour.
    Bar {
        name: String,
        color: String,
        width: Decimal,
        values: Vec<Decimal>,
    },
    /// Bars coloured per value on a diverging scale, so sign and magnitude
    /// are visually distinguishable (negative end renders red).
    DivergingBar {
        name: String,
        colorscale: String,
        values: Vec<Decimal>,
    },
}

/// One chart panel; panels share the month axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Panel {
    pub y_title: String,
    pub traces: Vec<Trace>,
}

/// The full two-panel figure for a stitched projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Figure {
    pub x_title: String,
    pub months: Vec<u32>,
    pub panels: Vec<Panel>,
}

/// Assemble the reference figure: revenue line and diverging fund bars on
/// top; the three day-split bars and the headcount line below.
pub fn figure(projection: &Projection) -> Figure {
    let rows = projection.rows();
    let months: Vec<u32> = rows.iter().map(|r| r.month).collect();
    let column = |f: fn(&plan_core::MonthRow) -> Decimal| -> Vec<Decimal> {
        rows.iter().map(f).collect()
    };

    let top = Panel {
        y_title: "fund / revenue [euros]".to_string(),
        traces: vec![
            Trace::Line {
                name: "Revenue".to_string(),
                color: "SteelBlue".to_string(),
                values: column(|r| r.revenue),
            },
            Trace::DivergingBar {
                name: "Fund".to_string(),
                colorscale: "Bluered_r".to_string(),
                values: column(|r| r.fund),
            },
        ],
    };

    let narrow = Decimal::new(3, 1);
    let bottom = Panel {
        y_title: "# days / # employees".to_string(),
        traces: vec![
            Trace::Bar {
                name: "number of days subcontract".to_string(),
                color: "LightBlue".to_string(),
                width: narrow,
                values: column(|r| r.ndays_subcontract),
            },
            Trace::Bar {
                name: "number of days direct".to_string(),
                color: "Blue".to_string(),
                width: narrow,
                values: column(|r| r.ndays_direct),
            },
            Trace::Bar {
                name: "number of days outsourced".to_string(),
                color: "Orange".to_string(),
                width: narrow,
                values: column(|r| r.ndays_outsourced),
            },
            Trace::Line {
                name: "number of employees".to_string(),
                color: "Green".to_string(),
                values: column(|r| Decimal::from(r.npersons)),
            },
        ],
    };

    Figure {
        x_title: "months".to_string(),
        months,
        panels: vec![top, bottom],
    }
}

/// CSS fragment for negative values, reference-dashboard style.
pub fn style_negative(v: Decimal) -> Option<&'static str> {
    (v < Decimal::ZERO).then_some("color:red;")
}

/// Paint a pre-padded table cell red when the underlying value is negative.
pub fn ansi_negative(cell: &str, v: Decimal) -> String {
    if v < Decimal::ZERO {
        format!("\x1b[31m{cell}\x1b[0m")
    } else {
        cell.to_string()
    }
}
