//! Study schema definitions.

use ct_sim::{ParameterSet, SimOptions};
use serde::{Deserialize, Serialize};

/// A named collection of CT fault cases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Study {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub cases: Vec<CaseDef>,
}

/// One CT under one fault scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDef {
    pub id: String,
    pub name: String,
    pub params: ParameterSet,
    #[serde(default)]
    pub options: SimOptions,
}

impl Study {
    pub fn case(&self, id: &str) -> Option<&CaseDef> {
        self.cases.iter().find(|c| c.id == id)
    }
}
