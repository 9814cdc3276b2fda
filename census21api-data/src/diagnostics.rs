//! Where recoverable failures are reported.

use std::error::Error as StdError;

/// Receives one report per failure that a caller sees as "no data".
pub trait Diagnostics {
    /// Report a recovered failure.
    fn report(&self, error: &(dyn StdError + 'static));
}

/// Emits reports as `log` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report(&self, error: &(dyn StdError + 'static)) {
        log::warn!("{error}");
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &D {
    fn report(&self, error: &(dyn StdError + 'static)) {
        (**self).report(error);
    }
}
