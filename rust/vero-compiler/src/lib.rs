//! Vero compiler toolchain: lexer, parser, semantic validator, and
//! transpiler (spec §3-§4), plus the shared `Diagnostic` type consumed by
//! the CLI and the language server.

pub mod compiler;
pub mod diagnostics;
pub mod transpile;

use compiler::session::{CompileSession, SessionResult};
use diagnostics::Diagnostic;
use std::panic::{self, AssertUnwindSafe};

/// Compiles one `.vero` source unit through every phase (spec §4.4), never
/// short-circuiting on errors.
///
/// Transpilation runs behind a `catch_unwind` so that an internal compiler
/// bug surfaces as a `VERO-000` diagnostic instead of aborting the caller
/// (spec §7).
pub fn compile(source: &str) -> SessionResult {
    let session = CompileSession::new();
    session.run(source)
}

/// Runs `f` and converts a caught panic into a `VERO-000` diagnostic,
/// mirroring the host toolchain's own "never crash on bad input" guarantee.
pub fn lower_safe<T>(f: impl FnOnce() -> T) -> Result<T, Diagnostic> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());
        Diagnostic::internal_error(message)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_minimal_source_is_valid() {
        let result = compile(
            r#"
            PAGE LoginPage {
                FIELD submitButton = BUTTON "Submit"
            }
            FEATURE Login {
                USE LoginPage
                SCENARIO S {
                    CLICK LoginPage.submitButton
                }
            }
            "#,
        );
        assert!(result.valid, "{:?}", result.diagnostics);
    }

    #[test]
    fn lower_safe_converts_panic_to_internal_error() {
        let result: Result<(), Diagnostic> = lower_safe(|| panic!("boom"));
        let err = result.unwrap_err();
        assert_eq!(err.code, "VERO-000");
        assert_eq!(err.technical_message.as_deref(), Some("boom"));
    }
}
