use crate::domain::ports::SnapshotSink;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Collects rendered snapshots in memory.
///
/// Clones share the same buffer, so a test can keep one handle and give
/// the other to the pipeline.
#[derive(Default, Clone)]
pub struct InMemorySink {
    blocks: Arc<Mutex<Vec<String>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every block emitted so far, oldest first.
    pub async fn blocks(&self) -> Vec<String> {
        self.blocks.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotSink for InMemorySink {
    async fn emit(&mut self, rendered: &str) -> io::Result<()> {
        self.blocks.lock().await.push(rendered.to_owned());
        Ok(())
    }
}
