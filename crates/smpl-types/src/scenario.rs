//! # smpl-types::scenario
//!
//! The Rust structs mapping to the scenario DSL (`smpl-cli run <file>`):
//! TOML or YAML documents describing the facilities to create and a scripted
//! sequence of events to schedule against a token space of plain integers.

use serde::{Deserialize, Serialize};

use crate::time::SimTime;

/// Top-level structure for a scenario definition file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub facilities: Vec<FacilitySpec>,
    pub script: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_at: Option<SimTime>,
}

impl Scenario {
    /// Validates the scenario for logical consistency that serde's schema
    /// alone cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("scenario name must not be empty".to_string());
        }
        for (i, facility) in self.facilities.iter().enumerate() {
            if facility.servers == 0 {
                return Err(format!(
                    "facility {} ({:?}) must have servers >= 1",
                    i, facility.name
                ));
            }
        }
        let known: std::collections::HashSet<&str> =
            self.facilities.iter().map(|f| f.name.as_str()).collect();
        for (i, directive) in self.script.iter().enumerate() {
            if let Some(facility) = directive.action.facility_name() {
                if !known.contains(facility) {
                    return Err(format!(
                        "script entry {} references unknown facility {:?}",
                        i, facility
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Declares one facility to be created during scenario setup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FacilitySpec {
    pub name: String,
    pub servers: u32,
}

/// A single scripted step: schedule an event at an absolute simulation time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Directive {
    pub at: SimTime,
    pub token: i64,
    pub action: Action,
}

/// An action a directive drives once its trigger time arrives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Schedule {
        event: i32,
        delay: SimTime,
    },
    Request {
        facility: String,
        priority: i32,
    },
    Preempt {
        facility: String,
        priority: i32,
    },
    Release {
        facility: String,
    },
}

impl Action {
    pub fn facility_name(&self) -> Option<&str> {
        match self {
            Action::Request { facility, .. }
            | Action::Preempt { facility, .. }
            | Action::Release { facility } => Some(facility.as_str()),
            Action::Schedule { .. } => None,
        }
    }
}
