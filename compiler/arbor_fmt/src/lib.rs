//! Arbor Fmt - Textual rendering of expression trees.
//!
//! The [`Printer`] is a [`Visitor`](arbor_ir::Visitor) that renders binary
//! nodes in-order and fully parenthesized, e.g. `((7 + 10) x (5 - 2))`.

mod errors;
mod printer;

pub use errors::PrintError;
pub use printer::{print_expr, Printer};
