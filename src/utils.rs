//! Utility functions for download naming

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};
use std::path::Path;

/// Extract the suggested filename from a Content-Disposition header
///
/// Both forms are supported:
/// - `attachment; filename="report.docx"` (quoted or bare simple form)
/// - `attachment; filename*=UTF-8''report%20final.docx` (RFC 5987 extended form)
///
/// The extended form wins when both are present, as RFC 6266 requires.
/// Returns `None` when the header is missing or yields no usable name.
///
/// # Examples
///
/// ```
/// use analyzer_client::utils::filename_from_disposition;
/// use reqwest::header::{CONTENT_DISPOSITION, HeaderMap, HeaderValue};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     CONTENT_DISPOSITION,
///     HeaderValue::from_static("attachment; filename=\"report.docx\""),
/// );
/// assert_eq!(filename_from_disposition(&headers), Some("report.docx".to_string()));
/// ```
pub fn filename_from_disposition(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;

    let mut simple = None;
    let mut extended = None;

    for (name, raw) in disposition_params(value)? {
        if name.eq_ignore_ascii_case("filename*") {
            // Format is: charset'lang'encoded-filename
            if let Some(idx) = raw.rfind('\'') {
                if let Ok(decoded) = urlencoding::decode(&raw[idx + 1..]) {
                    extended = Some(decoded.into_owned());
                }
            }
        } else if name.eq_ignore_ascii_case("filename") {
            simple = Some(raw);
        }
    }

    extended
        .or(simple)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Split a disposition value into `(name, value)` parameters
///
/// Quoted values may contain `;` and backslash escapes. The leading
/// disposition type is skipped. Returns `None` for an unterminated quote.
fn disposition_params(value: &str) -> Option<Vec<(String, String)>> {
    let mut params = Vec::new();
    let mut chars = value.chars().peekable();

    // Disposition type
    while chars.next_if(|&c| c != ';').is_some() {}

    while chars.next().is_some() {
        let mut name = String::new();
        while let Some(c) = chars.next_if(|&c| c != '=' && c != ';') {
            name.push(c);
        }
        if chars.next_if_eq(&'=').is_none() {
            continue;
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut raw = String::new();
        if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next()? {
                    '"' => break,
                    '\\' => raw.push(chars.next()?),
                    c => raw.push(c),
                }
            }
            while chars.next_if(|&c| c != ';').is_some() {}
        } else {
            while let Some(c) = chars.next_if(|&c| c != ';') {
                raw.push(c);
            }
        }

        params.push((name.trim().to_string(), raw.trim_end().to_string()));
    }

    Some(params)
}

/// Derive a download name from the input file name
///
/// Strips the input's extension and appends `suffix` and `extension`:
/// `notes.md` with `_converted` and `docx` becomes `notes_converted.docx`.
/// An input without a usable stem becomes `document`.
///
/// # Examples
///
/// ```
/// use analyzer_client::utils::default_output_name;
///
/// assert_eq!(default_output_name("notes.md", "_converted", "docx"), "notes_converted.docx");
/// assert_eq!(default_output_name("", "_converted", "docx"), "document_converted.docx");
/// ```
#[must_use]
pub fn default_output_name(input_name: &str, suffix: &str, extension: &str) -> String {
    let stem = Path::new(input_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");

    format!("{}{}.{}", stem, suffix, extension.trim_start_matches('.'))
}
