/// Pure backoff policy for transient evidence-backend failures.
///
/// Delay before retry attempt `attempt` (0-based) is `base_ms * 2^attempt`,
/// capped at `cap_ms`. Only the orchestrator applies this; adapters never
/// retry on their own.
pub fn backoff_delay_ms(attempt: u32, base_ms: u64, cap_ms: u64) -> u64 {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor).min(cap_ms)
}
