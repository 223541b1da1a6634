use crate::domain::ports::SnapshotSink;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};

/// Writes rendered snapshots to any async writer, flushing after each one.
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> SnapshotSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn emit(&mut self, rendered: &str) -> io::Result<()> {
        self.writer.write_all(rendered.as_bytes()).await?;
        self.writer.flush().await
    }
}
