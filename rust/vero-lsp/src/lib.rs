//! Editor-provider surface over `vero-compiler`'s AST and diagnostics.
//! Every provider here is a pure function over a compiled `Program` (plus
//! whatever small bit of cursor context the caller already knows) — the
//! stdio/JSON-RPC transport and document-cache layer are deliberately out
//! of scope and live in whatever process embeds this crate.

pub mod code_actions;
pub mod completion;
pub mod definition;
pub mod document_symbols;
pub mod folding_ranges;
pub mod hover;
pub mod keyword_docs;
pub mod references;
pub mod util;

pub use code_actions::build_code_actions;
pub use completion::build_completion;
pub use definition::{build_definition, DefinitionQuery};
pub use document_symbols::build_document_symbols;
pub use folding_ranges::build_folding_ranges;
pub use hover::build_hover;
pub use references::{find_references, Reference, ReferenceKind};
