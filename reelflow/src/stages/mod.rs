//! Stage service contract and the default adapters.
//!
//! Each of the four pipeline stages is a one-shot transform behind the
//! [`StageService`] trait. The orchestrator awaits a service call until it
//! resolves and never retries; adapters must not retry internally either.

mod assembly;
mod asset;
mod ideas;
mod models;
mod publish;
mod script;

pub use assembly::{per_image_seconds, SimulatedAssemblyService};
pub use asset::PlaceholderAssetService;
pub use ideas::{IdeaSource, StaticIdeaSource};
pub use models::{
    AssemblyOutput, AssemblyRequest, AssetOutput, AssetRequest, IdeaSourcing, PublishOutput,
    PublishRequest, PublishStatus, ScriptOutput, ScriptRequest,
};
pub use publish::{publish_status, SimulatedPublishService};
pub use script::{image_count_for_duration, TemplateScriptService};

#[cfg(test)]
pub use ideas::MockIdeaSource;

use crate::errors::StageFailure;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;

/// Trait for stage services.
///
/// A service receives the request shaped by the orchestrator and either
/// returns its response or a [`StageFailure`] carrying a human-readable
/// message.
#[async_trait]
pub trait StageService: Send + Sync + Debug {
    /// The request record.
    type Request: Serialize + Send + 'static;
    /// The response record.
    type Response: Serialize + Send + 'static;

    /// Returns the name of the service.
    fn name(&self) -> &str;

    /// Executes the stage.
    async fn execute(&self, request: Self::Request) -> Result<Self::Response, StageFailure>;
}

/// Shared script service.
pub type ScriptService = Arc<dyn StageService<Request = ScriptRequest, Response = ScriptOutput>>;
/// Shared asset service.
pub type AssetService = Arc<dyn StageService<Request = AssetRequest, Response = AssetOutput>>;
/// Shared assembly service.
pub type AssemblyService =
    Arc<dyn StageService<Request = AssemblyRequest, Response = AssemblyOutput>>;
/// Shared publish service.
pub type PublishService = Arc<dyn StageService<Request = PublishRequest, Response = PublishOutput>>;

/// A service backed by a plain function.
pub struct FnService<Req, Resp, F>
where
    F: Fn(Req) -> Result<Resp, StageFailure> + Send + Sync,
{
    name: String,
    func: F,
    _phantom: std::marker::PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp, F> FnService<Req, Resp, F>
where
    F: Fn(Req) -> Result<Resp, StageFailure> + Send + Sync,
{
    /// Creates a new function-based service.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<Req, Resp, F> Debug for FnService<Req, Resp, F>
where
    F: Fn(Req) -> Result<Resp, StageFailure> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnService").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<Req, Resp, F> StageService for FnService<Req, Resp, F>
where
    Req: Serialize + Send + 'static,
    Resp: Serialize + Send + 'static,
    F: Fn(Req) -> Result<Resp, StageFailure> + Send + Sync,
{
    type Request = Req;
    type Response = Resp;

    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: Req) -> Result<Resp, StageFailure> {
        (self.func)(request)
    }
}
