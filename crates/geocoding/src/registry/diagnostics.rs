//! Attempt tracking for provider selection diagnostics.

/// Outcome of running one provider (including its retries).
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: String,
    /// Number of calls made to the provider, retries included.
    pub attempts: u32,
    pub error: Option<String>,
    pub success: bool,
}

/// Detailed result of a lookup across providers.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record_error(&mut self, provider_id: &str, attempts: u32, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id: provider_id.to_string(),
            attempts,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, provider_id: &str, attempts: u32) {
        self.attempts.push(ProviderAttempt {
            provider_id: provider_id.to_string(),
            attempts,
            error: None,
            success: true,
        });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match (&a.error, a.success) {
                (_, true) => format!("{}: SUCCESS after {}", a.provider_id, a.attempts),
                (Some(err), false) => {
                    format!("{}: ERROR after {} ({})", a.provider_id, a.attempts, err)
                }
                (None, false) => format!("{}: UNKNOWN", a.provider_id),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Total provider calls across all providers.
    pub fn total_calls(&self) -> u32 {
        self.attempts.iter().map(|a| a.attempts).sum()
    }
}
