/// Classification for retry policy.
///
/// Used by the backoff combinator and the registry to decide what to do after
/// a provider attempt fails.
///
/// | Class | Retry same provider? | Try next provider? |
/// |-------|----------------------|--------------------|
/// | `Never` | No | No |
/// | `Retry` | Yes, with backoff | Yes, once attempts are exhausted |
/// | `NextProvider` | No | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The request itself is invalid (e.g. out-of-range coordinates).
    /// No provider can answer it, so the lookup stops here.
    Never,

    /// Transient failure: timeout, non-success status, incomplete payload,
    /// network error. Retry the same provider after a backoff delay.
    Retry,

    /// This provider cannot handle the request at all (misconfiguration,
    /// unsupported region). Skip straight to the next provider.
    NextProvider,
}
