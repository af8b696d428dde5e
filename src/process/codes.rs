// src/process/codes.rs
//
// Header/code text → published identifiers.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::CodeError;

/// Strip accents, lowercase, turn everything except word characters and `/`
/// into `-`, collapse runs of `-` and drop one trailing `-`.
pub fn pathify(label: &str) -> String {
    let folded: String = label.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let mut out = String::with_capacity(folded.len());
    for ch in folded.to_lowercase().chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '/' {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    if out.ends_with('-') {
        out.pop();
    }
    out
}

/// `"CIT All citizenships EST"` → `"all-citizenships"`.
pub fn citizenship_code(s: &str) -> Result<String, CodeError> {
    let code = pathify(s);
    let code = code
        .strip_prefix("cit-")
        .ok_or_else(|| CodeError::MissingCitizenshipPrefix { code: code.clone() })?;
    let code = code
        .strip_suffix("-est")
        .ok_or_else(|| CodeError::MissingEstimateSuffix {
            code: format!("cit-{}", code),
        })?;
    Ok(code.replace("-/-", "-"))
}

/// Text before the first comma, pathified.
pub fn flow_code(s: &str) -> Result<String, CodeError> {
    let (flow, _) = s
        .split_once(',')
        .ok_or_else(|| CodeError::MissingComma(s.to_string()))?;
    Ok(pathify(flow))
}

/// Text after the first comma, trimmed and pathified.
pub fn reason_code(s: &str) -> Result<String, CodeError> {
    let (_, reason) = s
        .split_once(',')
        .ok_or_else(|| CodeError::MissingComma(s.to_string()))?;
    Ok(pathify(reason.trim()))
}
