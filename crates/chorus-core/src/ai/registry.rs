//! Provider registry
//!
//! Maps each provider tag to its constructed adapter. Built once at
//! startup; providers without credentials are recorded as unavailable
//! rather than failing construction.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

use crate::ai::client::{build_provider, ChatProvider};
use crate::ai::providers::{models_for, resolve_provider, ProviderId};
use crate::config::ChorusConfig;
use crate::error::ChatError;

/// Initialization outcome for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Ready,
    Unavailable(String),
}

impl ProviderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProviderStatus::Ready)
    }
}

#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn ChatProvider>>,
    statuses: BTreeMap<ProviderId, ProviderStatus>,
}

impl ProviderRegistry {
    /// Empty registry; populate with `register`
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct every provider the config has a credential for
    pub fn from_config(config: &ChorusConfig) -> Self {
        let mut registry = Self::new();
        for &provider in ProviderId::all() {
            match build_provider(provider, config.provider(provider)) {
                Ok(adapter) => registry.register(adapter),
                Err(e) => {
                    info!("Provider {} unavailable: {}", provider, e);
                    registry
                        .statuses
                        .insert(provider, ProviderStatus::Unavailable(e.to_string()));
                }
            }
        }
        info!(
            "Provider registry ready: {} of {} providers initialized",
            registry.providers.len(),
            ProviderId::all().len()
        );
        registry
    }

    /// Add or replace the adapter for its provider
    pub fn register(&mut self, adapter: Arc<dyn ChatProvider>) {
        let id = adapter.id();
        self.statuses.insert(id, ProviderStatus::Ready);
        self.providers.insert(id, adapter);
    }

    pub fn get(&self, provider: ProviderId) -> Option<Arc<dyn ChatProvider>> {
        self.providers.get(&provider).cloned()
    }

    pub fn is_available(&self, provider: ProviderId) -> bool {
        self.providers.contains_key(&provider)
    }

    /// Status of every provider seen at construction, in catalog order
    pub fn statuses(&self) -> impl Iterator<Item = (ProviderId, &ProviderStatus)> {
        self.statuses.iter().map(|(id, status)| (*id, status))
    }

    /// Resolve a model to its constructed adapter
    ///
    /// Fails with `UnsupportedModel` for unknown ids and with
    /// `ProviderUnavailable` when the provider has no adapter.
    pub fn resolve(&self, model: &str) -> Result<Arc<dyn ChatProvider>, ChatError> {
        let provider = resolve_provider(model)?;
        self.get(provider).ok_or_else(|| ChatError::ProviderUnavailable {
            provider,
            model: model.to_string(),
        })
    }

    /// Table models grouped by provider, initialized providers only
    pub fn available_models(&self) -> BTreeMap<ProviderId, Vec<String>> {
        ProviderId::all()
            .iter()
            .filter(|id| self.is_available(**id))
            .map(|&id| (id, models_for(id).map(|m| m.id.clone()).collect()))
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("statuses", &self.statuses)
            .finish()
    }
}
