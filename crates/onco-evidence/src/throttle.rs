use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a requests-per-second ceiling against an upstream API by spacing
/// calls at least `min_interval` apart. Await-based; never drops a request.
pub struct RequestThrottle {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(max_requests_per_second: f64) -> Self {
        let min_interval = if max_requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / max_requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;
        let now = Instant::now();
        if let Some(prev) = *last {
            let elapsed = now.duration_since(prev);
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
