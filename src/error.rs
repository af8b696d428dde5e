use thiserror::Error;

/// The worksheet does not have the layout the extractor expects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("sheet {sheet:?}: cell {reference} is outside the used area")]
    MissingCell { sheet: String, reference: String },

    #[error("sheet {sheet:?}: year cell {reference} holds {found:?}, expected a trailing four-digit year")]
    BadYear {
        sheet: String,
        reference: String,
        found: String,
    },

    #[error("sheet {sheet:?}: no citizenship headers found")]
    NoHeaders { sheet: String },

    #[error("sheet {sheet:?}: no {axis} label resolves for cell {cell}")]
    Unresolved {
        sheet: String,
        axis: &'static str,
        cell: String,
    },
}

/// A header or code string does not follow the publisher's conventions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodeError {
    #[error("citizenship code {code:?} does not start with \"cit-\"")]
    MissingCitizenshipPrefix { code: String },

    #[error("citizenship code {code:?} does not end with \"-est\"")]
    MissingEstimateSuffix { code: String },

    #[error("code {0:?} has no comma separating flow and reason")]
    MissingComma(String),
}
