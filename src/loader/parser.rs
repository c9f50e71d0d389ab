use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::api::network_dto::NetworkDto;
use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let data = fs::read_to_string(file_path).map_err(Error::IoError)?;

    let parsed_data: T = serde_json::from_str(&data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

pub fn load_network(file_path: &Path) -> Result<NetworkDto> {
    let network: NetworkDto = parse_json_file(file_path)?;
    log::info!("Loaded network of {} airports from '{}'.", network.airports.len(), file_path.display());
    Ok(network)
}
