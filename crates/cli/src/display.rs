use std::io::Write;

use clam_core::{ParameterMap, Resolved};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use itertools::Itertools;

/// Writes the rendered command in green, followed by the parameters it was
/// rendered with in name order.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn print_resolved<W: Write>(
    out: &mut W,
    resolved: &Resolved,
    params: &ParameterMap,
) -> std::io::Result<()> {
    queue!(
        out,
        Print("Command:\n"),
        SetForegroundColor(Color::Green),
        Print(&resolved.command),
        ResetColor,
        Print("\n"),
    )?;

    if !params.is_empty() {
        queue!(out, Print("With parameters:\n"))?;
        for (key, value) in params.iter().sorted() {
            queue!(out, Print(format!("\t\"{key}\": \"{value}\"\n")))?;
        }
    }

    out.flush()
}
