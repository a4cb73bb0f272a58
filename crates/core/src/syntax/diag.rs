pub use clui_diagnostics::{Diagnostic, Severity, Span, codes};
