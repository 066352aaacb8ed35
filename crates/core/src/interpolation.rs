//! Template resolution: output allocation followed by placeholder substitution.
//!
//! Resolution has one deliberate side effect on the caller's map. When the
//! reserved `output` key is missing or empty, a fresh temporary file is created
//! and its path is written back into the map under `output`, so the template
//! can redirect into `{{ output }}` and the caller can find the file afterwards.
//! The file is never deleted by this crate.

use std::collections::HashMap;
use std::path::PathBuf;

use leon::Template;
use log::debug;

use crate::config::{OUTPUT_KEY, TEMP_FILE_PREFIX};
use crate::error::{Error, Result};
use crate::ParameterMap;

/// Placeholder syntax used when rendering a command template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// `{{ name }}` placeholders. The name between the braces is looked up
    /// verbatim after trimming whitespace, so `{{ file-name }}` is a key.
    /// Everything outside `{{ }}` is copied untouched, including shell braces
    /// such as `awk '{print $2}'` or `${#var}`.
    #[default]
    Mustache,
    /// `{name}` placeholders, with `\{` and `\}` as escapes.
    Braces,
}

/// A command template after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub command: String,
    pub output: PathBuf,
}

/// Makes sure `params` carries an `output` path, allocating a temporary file
/// when the key is absent or empty. Returns the output path either way.
///
/// # Errors
///
/// Returns [`Error::Resolution`] if the temporary file cannot be created.
pub fn ensure_output(params: &mut ParameterMap) -> Result<PathBuf> {
    if let Some(output) = params.get(OUTPUT_KEY).filter(|output| !output.is_empty()) {
        return Ok(PathBuf::from(output));
    }

    let (_, path) = tempfile::Builder::new()
        .prefix(TEMP_FILE_PREFIX)
        .tempfile()
        .map_err(Error::Resolution)?
        .keep()
        .map_err(|e| Error::Resolution(e.error))?;

    let Some(value) = path.to_str() else {
        return Err(Error::NonUtf8Path(path));
    };

    debug!("Allocated temporary output `{}`", value);
    params.insert(OUTPUT_KEY.to_string(), value.to_string());

    Ok(path)
}

/// Substitutes `params` into `template`. Placeholders without a value render
/// as the empty string.
///
/// # Errors
///
/// Returns an error if the template itself is malformed for `syntax`.
pub fn render(syntax: Syntax, template: &str, params: &ParameterMap) -> Result<String> {
    match syntax {
        Syntax::Mustache => Ok(render_mustache(template, params)),
        Syntax::Braces => render_braces(template, params),
    }
}

fn render_mustache(template: &str, params: &ParameterMap) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let tag = &rest[open + 2..];
        // An unterminated tag is plain text.
        let Some(close) = tag.find("}}") else {
            break;
        };

        rendered.push_str(&rest[..open]);
        if let Some(value) = params.get(tag[..close].trim()) {
            rendered.push_str(value);
        }
        rest = &tag[close + 2..];
    }

    rendered.push_str(rest);
    rendered
}

fn render_braces(template: &str, params: &ParameterMap) -> Result<String> {
    let template = Template::parse(template)?;

    let mut context: HashMap<String, String> = template
        .keys()
        .map(|key| ((*key).to_string(), String::new()))
        .collect();
    context.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

    Ok(template.render(&context)?)
}

/// Resolves `template` against `params`.
///
/// Note that this mutates `params`: see [`ensure_output`]. The output file is
/// allocated before rendering, so if rendering fails the file stays on disk
/// and `params["output"]` still names it.
///
/// # Errors
///
/// Fails if the output file cannot be allocated or the template cannot be
/// rendered.
pub fn resolve(syntax: Syntax, template: &str, params: &mut ParameterMap) -> Result<Resolved> {
    let output = ensure_output(params)?;
    let command = render(syntax, template, params)?;

    Ok(Resolved { command, output })
}
