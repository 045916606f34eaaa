//! Replay provider — serves pre-recorded generations for offline runs.
//!
//! A replay script is plain text; blocks are separated by a line holding
//! only `---`. Each `complete()` call returns the next block. Once the
//! script is exhausted every further call fails.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use synapse_core::error::ProviderError;
use synapse_core::provider::*;
use tracing::debug;

const SEPARATOR: &str = "---";

pub struct ReplayProvider {
    blocks: Vec<String>,
    cursor: Mutex<usize>,
}

impl ReplayProvider {
    pub fn new(blocks: Vec<String>) -> Self {
        Self {
            blocks,
            cursor: Mutex::new(0),
        }
    }

    /// Split a replay script into blocks.
    pub fn from_script(script: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current = String::new();
        for line in script.lines() {
            if line.trim_end() == SEPARATOR {
                blocks.push(std::mem::take(&mut current));
            } else {
                current.push_str(line);
                current.push('\n');
            }
        }
        blocks.push(current);

        let blocks = blocks
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        Self::new(blocks)
    }

    /// Load a replay script from disk.
    pub fn from_file(path: &Path) -> std::result::Result<Self, ProviderError> {
        let script = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::NotConfigured(format!(
                "cannot read replay script {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::from_script(&script))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks not yet served.
    pub fn remaining(&self) -> usize {
        let cursor = *self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        self.blocks.len().saturating_sub(cursor)
    }
}

#[async_trait]
impl synapse_core::Provider for ReplayProvider {
    fn name(&self) -> &str {
        "replay"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let index = {
            let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
            let index = *cursor;
            *cursor += 1;
            index
        };

        let text = self.blocks.get(index).cloned().ok_or_else(|| {
            ProviderError::MalformedResponse(format!(
                "replay script exhausted after {} blocks",
                self.blocks.len()
            ))
        })?;

        debug!(block = index, total = self.blocks.len(), "Replaying generation");

        Ok(ProviderResponse {
            text,
            model: request.model,
            usage: None,
        })
    }
}
