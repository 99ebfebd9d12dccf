use actix_web::dev::{Service, ServiceRequest, Transform};
use futures_util::future::LocalBoxFuture;
use std::collections::{HashMap, VecDeque};
use std::future::{ready, Ready};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::Error;

/// Sliding-window request log per key.
pub struct RateLimiter {
    max: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        Self {
            max: max.max(1),
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records a hit for `key`, or returns the seconds to wait when the
    /// window is already full.
    pub fn check(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut hits = self.hits.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.window;
        hits.retain(|k, log| {
            while log.front().map_or(false, |t| now.duration_since(*t) >= window) {
                log.pop_front();
            }
            k == key || !log.is_empty()
        });
        let log = hits.entry(key.to_owned()).or_default();
        if log.len() >= self.max {
            let oldest = log.front().copied().unwrap_or(now);
            let wait = window.saturating_sub(now.duration_since(oldest));
            let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
            return Err(secs.max(1));
        }
        log.push_back(now);
        Ok(())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.hits.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub struct RateLimit {
    limiter: Arc<RateLimiter>,
    trust_proxy: bool,
}

impl RateLimit {
    /// Keys requests by the socket peer address.
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter, trust_proxy: false }
    }

    /// Keys requests by the `Forwarded`/`X-Forwarded-For` client address
    /// instead. Only safe when a trusted proxy overwrites those headers.
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }
}

impl<S> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest> + 'static,
    S::Future: 'static,
    S::Error: Into<actix_web::Error>,
{
    type Error = actix_web::Error;
    type Response = S::Response;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            limiter: self.limiter.clone(),
            trust_proxy: self.trust_proxy,
            next_service: service,
        }))
    }
}

pub struct RateLimitService<S> {
    limiter: Arc<RateLimiter>,
    trust_proxy: bool,
    next_service: S,
}

impl<S> RateLimitService<S> {
    fn client(&self, req: &ServiceRequest) -> String {
        if self.trust_proxy {
            if let Some(addr) = req.connection_info().realip_remote_addr() {
                return addr.to_owned();
            }
        }
        req.peer_addr().map(|a| a.ip().to_string()).unwrap_or_else(|| "unknown".into())
    }
}

impl<S> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest>,
    S::Future: 'static,
    S::Error: Into<actix_web::Error>,
{
    type Response = S::Response;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    fn poll_ready(&self, ctx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx).map_err(|e| e.into())
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = format!("{}:{}", self.client(&req), req.path());
        if let Err(retry_after) = self.limiter.check(&key, Instant::now()) {
            log::warn!("rate limit hit for {}", key);
            return Box::pin(async move { Err(Error::TooManyRequests { retry_after }.into()) });
        }
        let res_fut = self.next_service.call(req);
        Box::pin(async move { res_fut.await.map_err(|e| e.into()) })
    }
}
