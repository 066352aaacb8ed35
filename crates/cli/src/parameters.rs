//! Assembling the parameter map from command-line arguments.

use clam_core::config::{expand_path, OUTPUT_KEY};
use clam_core::error::Error::ParameterFormat;
use clam_core::error::Result;
use clam_core::file_handling::get_parameter_file;
use clam_core::ParameterMap;

use crate::cli_args::Args;

/// Splits a `key=value` argument. The value may itself contain `=`.
///
/// # Errors
///
/// Returns [`ParameterFormat`] if there is no `=` or the key is empty.
pub fn parse_named_parameter(parameter: &str) -> Result<(String, String)> {
    match parameter.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ParameterFormat(parameter.to_string())),
    }
}

/// Builds the parameter map for a run.
///
/// Values are layered: the parameter file first, then `-p` arguments, then
/// `--output`.
///
/// # Errors
///
/// Returns an error if the parameter file cannot be loaded or a `-p`
/// argument is malformed.
pub fn build_parameter_map(args: &Args) -> Result<ParameterMap> {
    let mut params = match &args.params_file {
        Some(path) => get_parameter_file(&expand_path(path))?,
        None => ParameterMap::new(),
    };

    for parameter in &args.parameters {
        let (key, value) = parse_named_parameter(parameter)?;
        params.insert(key, value);
    }

    if let Some(output) = &args.output {
        params.insert(OUTPUT_KEY.to_string(), expand_path(output));
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_parameter() {
        assert_eq!(
            parse_named_parameter("name=World").unwrap(),
            ("name".to_string(), "World".to_string())
        );
        assert_eq!(
            parse_named_parameter("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_named_parameter("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_named_parameter_invalid() {
        assert!(matches!(parse_named_parameter("novalue"), Err(ParameterFormat(_))));
        assert!(matches!(parse_named_parameter("=value"), Err(ParameterFormat(_))));
    }
}
