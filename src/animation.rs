use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Roughly one display frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Linear count-up from zero, floored. Saturates at `target` once `elapsed`
/// reaches `duration`.
pub fn interpolate(target: f64, elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() || elapsed >= duration {
        return target;
    }
    let progress = elapsed.as_secs_f64() / duration.as_secs_f64();
    (progress * target).floor()
}

/// A running count-up animation.
///
/// Frames are driven by a tokio interval that skips missed ticks, so a
/// throttled runtime sees fewer intermediate values but the last frame is
/// always the exact target.
pub struct CounterAnimation {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl CounterAnimation {
    pub fn start<F>(target: f64, duration: Duration, mut apply: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = ticker.tick() => {
                        let elapsed = started.elapsed();
                        if elapsed >= duration {
                            apply(target);
                            return;
                        }
                        apply(interpolate(target, elapsed, duration));
                    }
                }
            }
        });

        CounterAnimation { cancel, task }
    }

    /// Stops the animation where it is. No final frame is written.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the last frame (or cancellation).
    pub async fn finished(self) {
        if let Err(e) = self.task.await {
            if e.is_panic() {
                log::error!("counter animation panicked: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_interpolate() {
        let total = Duration::from_millis(2000);
        assert_eq!(interpolate(10.0, Duration::ZERO, total), 0.0);
        assert_eq!(interpolate(10.0, Duration::from_millis(1000), total), 5.0);
        assert_eq!(interpolate(10.0, Duration::from_millis(1999), total), 9.0);
        assert_eq!(interpolate(10.0, Duration::from_millis(2000), total), 10.0);
        assert_eq!(interpolate(10.0, Duration::from_millis(5000), total), 10.0);
        assert_eq!(interpolate(5.25, total, total), 5.25);
        assert_eq!(interpolate(3.0, Duration::ZERO, Duration::ZERO), 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reaches_exact_target() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = frames.clone();
        let animation = CounterAnimation::start(5.0, Duration::from_millis(2000), move |v| {
            sink.lock().unwrap().push(v)
        });
        animation.finished().await;

        let frames = frames.lock().unwrap();
        assert_eq!(frames.first(), Some(&0.0));
        assert_eq!(frames.last(), Some(&5.0));
        assert!(frames.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_frames() {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let sink = frames.clone();
        let animation = CounterAnimation::start(100.0, Duration::from_millis(2000), move |v| {
            sink.lock().unwrap().push(v)
        });
        tokio::time::sleep(Duration::from_millis(500)).await;
        animation.cancel();
        animation.finished().await;

        let frames = frames.lock().unwrap();
        assert!(!frames.is_empty());
        assert!(*frames.last().unwrap() < 100.0);
    }
}
