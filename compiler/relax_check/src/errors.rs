//! Checker diagnostics.

use relax_ir::{Name, Span};
use thiserror::Error;

/// A well-formedness violation, located at the offending node's span.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WellFormedError {
    #[error("use of undefined variable `{name}`")]
    UndefinedVar { name: Name, span: Span },

    #[error("dataflow var `{name}` escapes its block")]
    DataflowVarEscapes { name: Name, span: Span },

    #[error("dataflow var `{name}` defined outside a dataflow block")]
    DataflowVarOutsideDataflowBlock { name: Name, span: Span },

    #[error("variable `{name}` is bound more than once in the same sequence")]
    Redefinition { name: Name, span: Span },

    #[error("impure binding inside a dataflow block")]
    ImpureBindingInDataflowBlock { span: Span },
}

impl WellFormedError {
    /// Span of the offending node.
    pub fn span(&self) -> Span {
        match self {
            WellFormedError::UndefinedVar { span, .. }
            | WellFormedError::DataflowVarEscapes { span, .. }
            | WellFormedError::DataflowVarOutsideDataflowBlock { span, .. }
            | WellFormedError::Redefinition { span, .. }
            | WellFormedError::ImpureBindingInDataflowBlock { span } => *span,
        }
    }
}
