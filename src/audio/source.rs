//! Stream source adapter.
//!
//! The remote broadcast is decoded by an ffmpeg subprocess into raw mono
//! 16kHz 16-bit little-endian PCM on stdout. The session pulls bytes on
//! demand and must terminate the subprocess on every exit path.

use crate::error::{EchoError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};

/// Pull-based byte source of decoded PCM.
#[async_trait]
pub trait StreamSource: Send {
    /// Read the next chunk of raw PCM. Returns `None` when the stream is
    /// exhausted.
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>>;

    /// Release the underlying resource. Called by the orchestrator on every
    /// exit path; must be safe to call more than once.
    async fn terminate(&mut self) -> Result<()>;
}

/// Stream source backed by an ffmpeg subprocess.
pub struct FfmpegSource {
    child: Child,
    stdout: ChildStdout,
    read_chunk_bytes: usize,
}

impl FfmpegSource {
    /// Spawn ffmpeg decoding `url` to raw PCM with minimal buffering.
    pub fn spawn(
        ffmpeg_path: &str,
        url: &str,
        sample_rate: u32,
        read_chunk_bytes: usize,
    ) -> Result<Self> {
        let mut child = Command::new(ffmpeg_path)
            .args(["-i", url])
            .args(["-ar", &sample_rate.to_string()])
            .args(["-ac", "1", "-f", "s16le"])
            .args(["-fflags", "nobuffer", "-flags", "low_delay"])
            .args(["-analyzeduration", "0"])
            .arg("-")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EchoError::StreamSource {
                message: format!("failed to spawn {}: {}", ffmpeg_path, e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| EchoError::StreamSource {
            message: "subprocess stdout was not captured".to_string(),
        })?;

        Ok(Self {
            child,
            stdout,
            read_chunk_bytes,
        })
    }
}

#[async_trait]
impl StreamSource for FfmpegSource {
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.read_chunk_bytes];
        let n = self
            .stdout
            .read(&mut buf)
            .await
            .map_err(|e| EchoError::StreamSource {
                message: format!("read from decoder failed: {}", e),
            })?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(buf))
    }

    async fn terminate(&mut self) -> Result<()> {
        // kill() is a no-op once the child has already exited.
        self.child
            .kill()
            .await
            .map_err(|e| EchoError::StreamSource {
                message: format!("failed to terminate decoder: {}", e),
            })
    }
}

/// Scripted source for tests: replays queued chunks, then reports EOF.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
    terminated: bool,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one raw chunk.
    pub fn with_chunk(mut self, chunk: Vec<u8>) -> Self {
        self.chunks.push_back(chunk);
        self
    }

    /// Queue `count` zeroed frames of `frame_bytes` each, one chunk per frame.
    pub fn with_silent_frames(mut self, count: usize, frame_bytes: usize) -> Self {
        for _ in 0..count {
            self.chunks.push_back(vec![0u8; frame_bytes]);
        }
        self
    }

    /// Whether `terminate` has been called.
    pub fn terminated(&self) -> bool {
        self.terminated
    }
}

#[async_trait]
impl StreamSource for ScriptedSource {
    async fn read_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.chunks.pop_front())
    }

    async fn terminate(&mut self) -> Result<()> {
        self.terminated = true;
        Ok(())
    }
}
