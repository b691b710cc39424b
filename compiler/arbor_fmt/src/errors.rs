use thiserror::Error;

/// Error raised when a tree contains a node the printer cannot render.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintError {
    #[error("cannot print {kind} node")]
    UnsupportedNode { kind: &'static str },
}
