use std::fmt;

/// Proof that at least one error diagnostic has been emitted.
///
/// The only ways to obtain one are [`DiagnosticQueue::emit_error`] and
/// [`ErrorGuaranteed::from_error_count`], so a function returning
/// `Result<T, ErrorGuaranteed>` cannot fail without having reported why.
///
/// [`DiagnosticQueue::emit_error`]: crate::queue::DiagnosticQueue::emit_error
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    #[inline]
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Recover the proof from a previously observed error count.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}

impl std::error::Error for ErrorGuaranteed {}
