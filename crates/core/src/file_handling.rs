//! Reading parameter maps from YAML files.

use std::collections::BTreeMap;
use std::fs::File;

use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::ParameterMap;

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    File::open(path).map_err(|e| {
        Error::io_error(file_description.to_string(), path.to_string(), e)
    })
}

fn scalar_to_string(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(Error::Misc(format!(
            "Parameter `{key}` must be a string, number or boolean"
        ))),
    }
}

/// Loads a parameter map from a YAML mapping.
///
/// Numbers and booleans are converted to their string form and `null`
/// becomes the empty string (so `output: ~` requests a temporary output).
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is malformed or is not a mapping of scalars
///
/// # Examples
///
/// ```no_run
/// use clam_core::file_handling::get_parameter_file;
///
/// let params = get_parameter_file("params.yml")?;
/// println!("Loaded {} parameters", params.len());
/// # Ok::<(), clam_core::error::Error>(())
/// ```
pub fn get_parameter_file(path: &str) -> Result<ParameterMap> {
    let reader = get_reader("parameter", path)?;

    let parsed: BTreeMap<String, Value> = serde_yaml::from_reader(reader).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "parameter".to_string(),
            path.to_string(),
            e,
        )
    })?;

    parsed
        .into_iter()
        .map(|(key, value)| scalar_to_string(&key, value).map(|value| (key, value)))
        .collect()
}
