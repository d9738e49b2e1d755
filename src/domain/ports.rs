use crate::domain::model::{Ack, FormPayload};
use crate::utils::error::{Result, SubmitError};
use async_trait::async_trait;

/// 參照資料來源（HTTP 或本機目錄）
pub trait ReferenceSource: Send + Sync {
    fn fetch(&self, name: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    fn describe(&self) -> String;
}

/// One submission strategy. Implementations never fall back to another strategy.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, payload: &FormPayload) -> std::result::Result<Ack, SubmitError>;

    fn name(&self) -> &'static str;

    /// True when nothing leaves the process.
    fn is_dry_run(&self) -> bool {
        false
    }
}
