use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::types::{AiResource, Plan};

#[derive(Debug, Error)]
pub enum QuotaFileError {
    #[error("failed to read quota file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid quota file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Monthly AI usage limits per plan. A missing entry means unlimited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub limits: HashMap<Plan, HashMap<AiResource, u32>>,
}

impl QuotaConfig {
    pub fn defaults() -> Self {
        let mut limits = HashMap::new();
        limits.insert(
            Plan::Free,
            HashMap::from([
                (AiResource::Summary, 3),
                (AiResource::Chat, 20),
                (AiResource::Audio, 5),
                (AiResource::Transcription, 5),
                (AiResource::Image, 10),
            ]),
        );
        limits.insert(
            Plan::Pro,
            HashMap::from([
                (AiResource::Summary, 60),
                (AiResource::Chat, 400),
                (AiResource::Audio, 100),
                (AiResource::Transcription, 100),
                (AiResource::Image, 300),
            ]),
        );
        // Premium has no entry: unlimited.
        Self { limits }
    }

    pub fn limit_for(&self, plan: Plan, resource: AiResource) -> Option<u32> {
        self.limits.get(&plan).and_then(|m| m.get(&resource)).copied()
    }

    pub fn set_limit(&mut self, plan: Plan, resource: AiResource, limit: Option<u32>) {
        let entry = self.limits.entry(plan).or_default();
        match limit {
            Some(l) => {
                entry.insert(resource, l);
            }
            None => {
                entry.remove(&resource);
            }
        }
    }

    /// Apply overrides written as YAML:
    ///
    /// ```yaml
    /// gratuito:
    ///   resumo: 5
    /// pro:
    ///   chat: ~      # unlimited
    /// ```
    pub fn apply_yaml(&mut self, yaml: &str) -> Result<(), QuotaFileError> {
        let overrides: HashMap<Plan, HashMap<AiResource, Option<u32>>> = serde_yaml::from_str(yaml)?;
        for (plan, resources) in overrides {
            for (resource, limit) in resources {
                self.set_limit(plan, resource, limit);
            }
        }
        Ok(())
    }

    pub fn apply_file(&mut self, path: impl AsRef<Path>) -> Result<(), QuotaFileError> {
        let content = std::fs::read_to_string(path)?;
        self.apply_yaml(&content)
    }
}
