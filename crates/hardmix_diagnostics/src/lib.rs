//! Diagnostic creation, severity management, and terminal rendering.
//!
//! Capacity estimation and hard/soft selection report what they decided, and
//! why a pass had to stop, as structured [`Diagnostic`] messages. The
//! thread-safe [`DiagnosticSink`] accumulates them during a mapping pass and
//! [`TerminalRenderer`] formats them for the orchestration layer to print.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
