use serde::{Deserialize, Serialize};

/// Layout of a network configuration file, e.g.
///
/// ```json
/// { "port": 1024, "airports": [ { "gates": 2 }, { "gates": 5 } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDto {
    #[serde(default)]
    pub port: Option<u16>,
    pub airports: Vec<AirportDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportDto {
    pub gates: usize,
}
