//! Stage service doubles for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::StageFailure;
use crate::stages::StageService;

/// A service that always fails with a fixed message.
pub struct FailingService<Req, Resp> {
    name: String,
    message: String,
    calls: Mutex<usize>,
    _phantom: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> FailingService<Req, Resp> {
    /// Creates a new failing service.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            calls: Mutex::new(0),
            _phantom: PhantomData,
        }
    }

    /// Returns the number of times the service was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl<Req, Resp> fmt::Debug for FailingService<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailingService")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<Req, Resp> StageService for FailingService<Req, Resp>
where
    Req: Serialize + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    type Request = Req;
    type Response = Resp;

    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _request: Req) -> Result<Resp, StageFailure> {
        *self.calls.lock() += 1;
        Err(StageFailure::new(self.message.clone()))
    }
}

/// Wraps a service and records every request it receives.
pub struct RecordingService<Req, Resp> {
    inner: Arc<dyn StageService<Request = Req, Response = Resp>>,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl<Req, Resp> RecordingService<Req, Resp> {
    /// Creates a recorder around `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn StageService<Request = Req, Response = Resp>>) -> Self {
        Self {
            inner,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns the recorded requests as JSON, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().clone()
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl<Req, Resp> fmt::Debug for RecordingService<Req, Resp>
where
    Req: Serialize + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingService")
            .field("inner", &self.inner.name())
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl<Req, Resp> StageService for RecordingService<Req, Resp>
where
    Req: Serialize + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    type Request = Req;
    type Response = Resp;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, request: Req) -> Result<Resp, StageFailure> {
        let recorded = serde_json::to_value(&request).unwrap_or(serde_json::Value::Null);
        self.requests.lock().push(recorded);
        self.inner.execute(request).await
    }
}

/// Wraps a service and delays every call.
pub struct SlowService<Req, Resp> {
    inner: Arc<dyn StageService<Request = Req, Response = Resp>>,
    delay: Duration,
}

impl<Req, Resp> SlowService<Req, Resp> {
    /// Creates a service that sleeps for `delay` before delegating.
    #[must_use]
    pub fn new(inner: Arc<dyn StageService<Request = Req, Response = Resp>>, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Creates a slow service with the delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(inner: Arc<dyn StageService<Request = Req, Response = Resp>>, ms: u64) -> Self {
        Self::new(inner, Duration::from_millis(ms))
    }
}

impl<Req, Resp> fmt::Debug for SlowService<Req, Resp>
where
    Req: Serialize + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlowService")
            .field("inner", &self.inner.name())
            .field("delay", &self.delay)
            .finish()
    }
}

#[async_trait]
impl<Req, Resp> StageService for SlowService<Req, Resp>
where
    Req: Serialize + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    type Request = Req;
    type Response = Resp;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute(&self, request: Req) -> Result<Resp, StageFailure> {
        tokio::time::sleep(self.delay).await;
        self.inner.execute(request).await
    }
}
