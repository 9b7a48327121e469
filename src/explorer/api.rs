//! Request boundary between the explorer and the explanation handlers.

use async_trait::async_trait;

use crate::ai::TokenUsage;
use crate::service::{
    DeepDiveRequest, DeepDiveResponse, ExplainRequest, ExplainResponse, ExplanationService,
    FileDetail, FileDetailRequest, LoadedRepo,
};
use crate::types::Result;

/// What the orchestrator may ask of the server side.
///
/// [`ExplanationService`] is the in-process implementation; tests substitute
/// scripted ones to observe ordering and failure handling.
#[async_trait]
pub trait ExplainApi: Send + Sync {
    async fn load_repo(&self, url: &str) -> Result<LoadedRepo>;

    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse>;

    async fn file_detail(&self, request: &FileDetailRequest) -> Result<(FileDetail, TokenUsage)>;

    async fn deep_dive(&self, request: &DeepDiveRequest) -> Result<DeepDiveResponse>;
}

#[async_trait]
impl ExplainApi for ExplanationService {
    async fn load_repo(&self, url: &str) -> Result<LoadedRepo> {
        ExplanationService::load_repo(self, url).await
    }

    async fn explain(&self, request: &ExplainRequest) -> Result<ExplainResponse> {
        ExplanationService::explain(self, request).await
    }

    async fn file_detail(&self, request: &FileDetailRequest) -> Result<(FileDetail, TokenUsage)> {
        ExplanationService::file_detail(self, request).await
    }

    async fn deep_dive(&self, request: &DeepDiveRequest) -> Result<DeepDiveResponse> {
        ExplanationService::deep_dive(self, request).await
    }
}
