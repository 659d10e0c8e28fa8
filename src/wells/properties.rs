//! Well control property bundles and their enumerations.
//!
//! A WCONPROD/WCONHIST/WCONINJE record replaces the well's whole bundle; the
//! bundle then holds until the next record replaces it again. Which control
//! modes a bundle *enables* is decided record-by-record: a rate slot the
//! deck supplied enables the corresponding control, a defaulted slot drops
//! it.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::deck::DeckRecord;
use crate::errors::{ErrorContext, ScheduleError};

fn bad_enum(kind: &str, value: &str) -> ScheduleError {
    ScheduleError::MalformedRecord {
        message: format!("'{}' is not a {}", value, kind),
        context: ErrorContext::new(),
    }
}

/// Well operating status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WellStatus {
    Open,
    Stop,
    Shut,
    Auto,
}

impl FromStr for WellStatus {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(WellStatus::Open),
            "STOP" => Ok(WellStatus::Stop),
            "SHUT" => Ok(WellStatus::Shut),
            "AUTO" => Ok(WellStatus::Auto),
            other => Err(bad_enum("well status", other)),
        }
    }
}

impl fmt::Display for WellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WellStatus::Open => "OPEN",
            WellStatus::Stop => "STOP",
            WellStatus::Shut => "SHUT",
            WellStatus::Auto => "AUTO",
        };
        write!(f, "{}", name)
    }
}

/// Fluid phase, as named in WELSPECS and the group injection keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Oil,
    Water,
    Gas,
    Liquid,
}

impl FromStr for Phase {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OIL" => Ok(Phase::Oil),
            "WATER" | "WAT" => Ok(Phase::Water),
            "GAS" => Ok(Phase::Gas),
            "LIQ" => Ok(Phase::Liquid),
            other => Err(bad_enum("phase", other)),
        }
    }
}

/// What an injector pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InjectorType {
    #[default]
    Water,
    Gas,
    Oil,
    Multi,
}

impl FromStr for InjectorType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WATER" | "WAT" => Ok(InjectorType::Water),
            "GAS" => Ok(InjectorType::Gas),
            "OIL" => Ok(InjectorType::Oil),
            "MULTI" => Ok(InjectorType::Multi),
            other => Err(bad_enum("injector type", other)),
        }
    }
}

/// Producer control modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ProducerControlMode {
    #[default]
    Undefined,
    Orat,
    Wrat,
    Grat,
    Lrat,
    Resv,
    Bhp,
    Thp,
    Grup,
}

impl FromStr for ProducerControlMode {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORAT" => Ok(ProducerControlMode::Orat),
            "WRAT" => Ok(ProducerControlMode::Wrat),
            "GRAT" => Ok(ProducerControlMode::Grat),
            "LRAT" => Ok(ProducerControlMode::Lrat),
            "RESV" => Ok(ProducerControlMode::Resv),
            "BHP" => Ok(ProducerControlMode::Bhp),
            "THP" => Ok(ProducerControlMode::Thp),
            "GRUP" => Ok(ProducerControlMode::Grup),
            other => Err(bad_enum("producer control mode", other)),
        }
    }
}

/// Injector control modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum InjectorControlMode {
    #[default]
    Undefined,
    Rate,
    Resv,
    Bhp,
    Thp,
    Grup,
}

impl FromStr for InjectorControlMode {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RATE" => Ok(InjectorControlMode::Rate),
            "RESV" => Ok(InjectorControlMode::Resv),
            "BHP" => Ok(InjectorControlMode::Bhp),
            "THP" => Ok(InjectorControlMode::Thp),
            "GRUP" => Ok(InjectorControlMode::Grup),
            other => Err(bad_enum("injector control mode", other)),
        }
    }
}

/// The phase a guide rate applies to (WGRUPCON item 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GuideRatePhase {
    #[default]
    Undefined,
    Oil,
    Water,
    Gas,
    Liquid,
    Combined,
    Reservoir,
}

impl FromStr for GuideRatePhase {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OIL" => Ok(GuideRatePhase::Oil),
            "WAT" | "WATER" => Ok(GuideRatePhase::Water),
            "GAS" => Ok(GuideRatePhase::Gas),
            "LIQ" => Ok(GuideRatePhase::Liquid),
            "COMB" => Ok(GuideRatePhase::Combined),
            "RES" => Ok(GuideRatePhase::Reservoir),
            other => Err(bad_enum("guide rate phase", other)),
        }
    }
}

/// Production bundle set by WCONPROD (prediction) or WCONHIST (history).
///
/// Record layout consumed here:
/// `WELL STATUS CMODE ORAT WRAT GRAT LRAT RESV BHP THP VFP` for WCONPROD,
/// `WELL STATUS CMODE ORAT WRAT GRAT` for WCONHIST.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionProperties {
    pub oil_rate: f64,
    pub water_rate: f64,
    pub gas_rate: f64,
    pub liquid_rate: f64,
    pub resv_rate: f64,
    pub bhp_limit: f64,
    pub thp_limit: f64,
    pub vfp_table: i64,
    pub prediction_mode: bool,
    pub control_mode: ProducerControlMode,
    controls: BTreeSet<ProducerControlMode>,
}

impl ProductionProperties {
    /// Bundle for a prediction-mode well: each supplied target enables its
    /// control.
    pub fn prediction(record: &DeckRecord, group_control: bool) -> Self {
        let mut properties = ProductionProperties {
            prediction_mode: true,
            ..Default::default()
        };

        let slots = [
            (3, ProducerControlMode::Orat),
            (4, ProducerControlMode::Wrat),
            (5, ProducerControlMode::Grat),
            (6, ProducerControlMode::Lrat),
            (7, ProducerControlMode::Resv),
            (8, ProducerControlMode::Bhp),
            (9, ProducerControlMode::Thp),
        ];
        for (index, control) in slots {
            if record.item(index).is_defaulted() {
                continue;
            }
            let value = record.double_or(index, 0.0);
            match control {
                ProducerControlMode::Orat => properties.oil_rate = value,
                ProducerControlMode::Wrat => properties.water_rate = value,
                ProducerControlMode::Grat => properties.gas_rate = value,
                ProducerControlMode::Lrat => properties.liquid_rate = value,
                ProducerControlMode::Resv => properties.resv_rate = value,
                ProducerControlMode::Bhp => properties.bhp_limit = value,
                ProducerControlMode::Thp => properties.thp_limit = value,
                _ => {}
            }
            properties.controls.insert(control);
        }
        properties.vfp_table = record.int_or(10, 0);

        if group_control {
            properties.controls.insert(ProducerControlMode::Grup);
        }

        properties
    }

    /// Bundle for a history-matched well: observed rates, BHP limit carried
    /// over from the bundle previously in force.
    pub fn history(previous_bhp_limit: f64, record: &DeckRecord) -> Self {
        let mut properties = ProductionProperties {
            prediction_mode: false,
            oil_rate: record.double_or(3, 0.0),
            water_rate: record.double_or(4, 0.0),
            gas_rate: record.double_or(5, 0.0),
            bhp_limit: previous_bhp_limit,
            ..Default::default()
        };
        // Observed rates can all serve as the controlled quantity.
        for control in [
            ProducerControlMode::Orat,
            ProducerControlMode::Wrat,
            ProducerControlMode::Grat,
            ProducerControlMode::Lrat,
            ProducerControlMode::Resv,
        ] {
            properties.controls.insert(control);
        }
        properties
    }

    pub fn has_control(&self, control: ProducerControlMode) -> bool {
        self.controls.contains(&control)
    }

    pub fn add_control(&mut self, control: ProducerControlMode) {
        self.controls.insert(control);
    }

    /// Sum of the surface rate targets; zero for a well with no flow.
    pub fn total_rate(&self) -> f64 {
        self.oil_rate + self.water_rate + self.gas_rate
    }
}

/// Injection bundle set by WCONINJE.
///
/// Record layout consumed here:
/// `WELL TYPE STATUS CMODE RATE RESV BHP THP VFP`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InjectionProperties {
    pub injector_type: InjectorType,
    pub surface_rate: f64,
    pub reservoir_rate: f64,
    pub bhp_limit: f64,
    pub thp_limit: f64,
    pub vfp_table: i64,
    pub prediction_mode: bool,
    pub control_mode: InjectorControlMode,
    controls: BTreeSet<InjectorControlMode>,
}

impl InjectionProperties {
    /// Build the new bundle from a WCONINJE record, starting from the bundle
    /// previously in force: each supplied slot enables its control, each
    /// defaulted slot drops it.
    pub fn from_record(
        previous: &InjectionProperties,
        record: &DeckRecord,
        group_control: bool,
    ) -> Result<Self, ScheduleError> {
        let mut properties = previous.clone();
        properties.injector_type = record.str_or(1, "WATER").parse()?;
        properties.prediction_mode = true;

        if record.item(4).is_defaulted() {
            properties.drop_control(InjectorControlMode::Rate);
        } else {
            properties.surface_rate = record.double_or(4, 0.0);
            properties.add_control(InjectorControlMode::Rate);
        }

        if record.item(5).is_defaulted() {
            properties.drop_control(InjectorControlMode::Resv);
        } else {
            properties.reservoir_rate = record.double_or(5, 0.0);
            properties.add_control(InjectorControlMode::Resv);
        }

        properties.bhp_limit = record.double_or(6, properties.bhp_limit);
        if record.item(6).is_defaulted() {
            properties.drop_control(InjectorControlMode::Bhp);
        } else {
            properties.add_control(InjectorControlMode::Bhp);
        }

        if record.item(7).is_defaulted() {
            properties.drop_control(InjectorControlMode::Thp);
        } else {
            properties.thp_limit = record.double_or(7, 0.0);
            properties.vfp_table = record.int_or(8, 0);
            properties.add_control(InjectorControlMode::Thp);
        }

        if group_control {
            properties.add_control(InjectorControlMode::Grup);
        } else {
            properties.drop_control(InjectorControlMode::Grup);
        }

        Ok(properties)
    }

    pub fn has_control(&self, control: InjectorControlMode) -> bool {
        self.controls.contains(&control)
    }

    pub fn add_control(&mut self, control: InjectorControlMode) {
        self.controls.insert(control);
    }

    pub fn drop_control(&mut self, control: InjectorControlMode) {
        self.controls.remove(&control);
    }
}
