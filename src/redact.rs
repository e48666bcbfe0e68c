//! PII obfuscation for log lines.

use regex::{Captures, Regex};

/// Fields masked before a request's query string is logged.
pub const PII_FIELDS: &[&str] = &["email", "password", "new_password", "reset_token", "ssn"];

pub const REDACTION: &str = "***";

/// Replace the value of each `field=value` pair in `message` with `redaction`.
///
/// A value runs up to the next `separator` or the end of the message. Field
/// names and the separator are matched literally.
///
/// # Errors
/// Returns an error if the assembled pattern does not compile.
pub fn filter_datum(
    fields: &[&str],
    redaction: &str,
    message: &str,
    separator: &str,
) -> Result<String, regex::Error> {
    if fields.is_empty() {
        return Ok(message.to_string());
    }
    let names = fields
        .iter()
        .map(|field| regex::escape(field))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = Regex::new(&format!(
        "({names})=.*?({}|$)",
        regex::escape(separator)
    ))?;
    Ok(pattern
        .replace_all(message, |caps: &Captures<'_>| {
            format!("{}={redaction}{}", &caps[1], &caps[2])
        })
        .into_owned())
}
