//! Output formatting for one-shot lookups

use crate::lookup::{AutocompleteBody, EndpointReply};
use crate::query::matched_prefix_len;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print suggestions one per line, typed prefix highlighted
pub fn print_suggestions(body: &AutocompleteBody, query: &str, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_suggestions(&mut stdout, body, query)?;

    if body.meta.truncated {
        let mut stderr = StandardStream::stderr(choice);
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(stderr, "Showing top {} results", body.results.len())?;
        stderr.reset()?;
    }
    Ok(())
}

/// Write each suggestion on its own line. `query` may be the raw input;
/// it is trimmed the same way the lookup trims it.
pub fn write_suggestions<W: WriteColor>(
    out: &mut W,
    body: &AutocompleteBody,
    query: &str,
) -> io::Result<()> {
    let query = query.trim();
    for word in &body.results {
        match matched_prefix_len(word, query) {
            Some(end) if end > 0 => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "{}", &word[..end])?;
                out.reset()?;
                writeln!(out, "{}", &word[end..])?;
            }
            _ => writeln!(out, "{}", word)?,
        }
    }
    Ok(())
}

/// Print the endpoint reply as JSON: `{ "status": .., "body": { .. } }`
pub fn print_json(reply: &EndpointReply, duration_ms: Option<f64>) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_json(&mut stdout, reply, duration_ms)
}

pub fn write_json<W: Write>(
    out: &mut W,
    reply: &EndpointReply,
    duration_ms: Option<f64>,
) -> io::Result<()> {
    let mut value = serde_json::to_value(reply)?;
    if let (Some(ms), Some(object)) = (duration_ms, value.as_object_mut()) {
        object.insert("durationMs".to_string(), serde_json::json!(ms));
    }
    serde_json::to_writer(&mut *out, &value)?;
    writeln!(out)
}
