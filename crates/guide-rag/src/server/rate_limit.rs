//! Fixed-window per-client rate limiting

use dashmap::DashMap;
use parking_lot::Mutex;
use std::net::IpAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Allows `limit` requests per client per window; a limit of 0 disables it
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clients: DashMap<IpAddr, Window>,
    last_prune: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: DashMap::new(),
            last_prune: Mutex::new(Instant::now()),
        }
    }

    /// `limit` requests per hour
    pub fn per_hour(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60 * 60))
    }

    /// Record a request; false if the client is over its limit
    pub fn check(&self, client: IpAddr) -> bool {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> bool {
        if self.limit == 0 {
            return true;
        }
        self.prune_expired(now);

        let mut entry = self.clients.entry(client).or_insert(Window {
            started: now,
            hits: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                hits: 0,
            };
        }

        if entry.hits >= self.limit {
            return false;
        }
        entry.hits += 1;
        true
    }

    /// Drop expired windows, at most once per window
    fn prune_expired(&self, now: Instant) {
        {
            let mut last = self.last_prune.lock();
            if now.saturating_duration_since(*last) < self.window {
                return;
            }
            *last = now;
        }
        let before = self.clients.len();
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        tracing::debug!("Pruned {} expired rate limit windows", before.saturating_sub(self.clients.len()));
    }
}
