//! Seams through which page controllers ask the operator something or tell
//! them something. Front ends supply the implementations.

use async_trait::async_trait;
use tracing::info;

/// Yes/no question asked before a destructive action.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Blocking alert for failures the operator has to acknowledge.
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Confirms everything. For non-interactive front ends that already obtained
/// consent some other way.
pub struct AssumeYes;

#[async_trait]
impl Confirmer for AssumeYes {
    async fn confirm(&self, prompt: &str) -> bool {
        info!(prompt, "auto-confirmed");
        true
    }
}
