//! Input checks performed before any network call

use crate::error::{Error, Result};
use crate::ports::DocumentSource;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Citation styles the formatting service accepts
pub const FORMAT_STYLES: [&str; 9] = [
    "ABNT",
    "APA",
    "IEEE",
    "SBC",
    "ICML",
    "NeurIPS",
    "AAAI",
    "Springer Nature",
    "Elsevier",
];

const PDF_MAGIC: &[u8] = b"%PDF";

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

/// Trimmed text, or a validation error naming `what`
pub fn non_empty<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{what} cannot be empty")));
    }
    Ok(trimmed)
}

pub fn login(username: &str, password: &str) -> Result<()> {
    non_empty(username, "username")?;
    if password.is_empty() {
        return Err(Error::validation("password cannot be empty"));
    }
    Ok(())
}

pub fn registration(username: &str, email: &str, password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(Error::validation("passwords do not match"));
    }
    if password.is_empty() {
        return Err(Error::validation("password cannot be empty"));
    }
    let re = USERNAME_RE.get_or_init(|| Regex::new(r"^[\w.@+-]+$").unwrap());
    if !re.is_match(username) {
        return Err(Error::validation(
            "username may only contain letters, digits and @/./+/-/_",
        ));
    }
    email_address(email)
}

pub fn email_address(email: &str) -> Result<()> {
    let mut parts = email.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!("`{email}` is not a valid email address")))
    }
}

pub fn year_range(year_from: i32, year_to: i32) -> Result<()> {
    if year_from > year_to {
        return Err(Error::validation(format!(
            "start year {year_from} is after end year {year_to}"
        )));
    }
    Ok(())
}

/// URLs must be absolute http(s) with a host; files must be PDFs
pub fn document_source(source: &DocumentSource) -> Result<()> {
    match source {
        DocumentSource::Url(raw) => {
            let parsed = url::Url::parse(raw.trim())
                .map_err(|err| Error::validation(format!("invalid URL `{raw}`: {err}")))?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(Error::validation(format!(
                    "`{raw}` must be an http or https link"
                )));
            }
            Ok(())
        }
        DocumentSource::File { name, bytes } => {
            if has_extension(name, &["pdf"]) || bytes.starts_with(PDF_MAGIC) {
                Ok(())
            } else {
                Err(Error::validation(format!("`{name}` is not a PDF file")))
            }
        }
    }
}

/// Canonical spelling of a supported style, matched case-insensitively
pub fn format_style(style: &str) -> Result<&'static str> {
    let wanted = style.trim();
    FORMAT_STYLES
        .iter()
        .copied()
        .find(|s| s.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            Error::validation(format!(
                "unknown style `{wanted}` (expected one of: {})",
                FORMAT_STYLES.join(", ")
            ))
        })
}

pub fn format_file(name: &str) -> Result<()> {
    if has_extension(name, &["pdf", "txt"]) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "`{name}` must be a .pdf or .txt file"
        )))
    }
}

fn has_extension(name: &str, allowed: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| allowed.iter().any(|a| e.eq_ignore_ascii_case(a)))
        .unwrap_or(false)
}
