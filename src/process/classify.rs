// src/process/classify.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::grid::Selection;

static CI_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"CI\s*$").expect("CI header regex"));

/// True for confidence-interval column headers, e.g. `"CIT British CI "`.
pub fn is_ci_header(text: &str) -> bool {
    CI_HEADER.is_match(text)
}

/// The header band split into its two interleaved axes.
#[derive(Debug, Clone)]
pub struct HeaderClasses<'s> {
    pub estimate: Selection<'s>,
    pub ci: Selection<'s>,
}

/// Partition `headers` into CI and estimate cells. Every cell lands on
/// exactly one side.
pub fn classify_headers<'s>(headers: &Selection<'s>) -> HeaderClasses<'s> {
    let ci = headers.filter(|_, v| is_ci_header(&v.as_text()));
    let estimate = headers - &ci;
    HeaderClasses { estimate, ci }
}
