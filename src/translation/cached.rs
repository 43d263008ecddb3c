use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use super::gateway::{Gateway, GatewayParams, GatewayRequest, TranslationOutcome};
use super::prompt::prompt_hash;
use crate::cache::{CacheKey, CacheManager};

/// Serves repeated units from the translation cache and forwards the rest.
///
/// Only successful outcomes are stored. Cache failures are logged and
/// otherwise ignored: a broken cache never fails a run.
pub struct CachedGateway<G> {
    inner: G,
    cache: CacheManager,
    model: String,
    endpoint: String,
    prompt_hash: String,
    hits: AtomicUsize,
}

impl<G: Gateway> CachedGateway<G> {
    pub fn new(inner: G, cache: CacheManager, model: String, endpoint: String) -> Self {
        Self {
            inner,
            cache,
            model,
            endpoint,
            prompt_hash: prompt_hash(),
            hits: AtomicUsize::new(0),
        }
    }

    /// Number of units answered from the cache so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub const fn inner(&self) -> &G {
        &self.inner
    }

    fn key(&self, text: &str, params: &GatewayParams) -> CacheKey {
        CacheKey {
            source_text: text.to_string(),
            target_language: params.target_language.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            preserve_terms: params.preserve_terms.clone(),
            context: params.extra_context.clone(),
            prompt_hash: self.prompt_hash.clone(),
        }
    }
}

impl<G: Gateway> Gateway for CachedGateway<G> {
    async fn translate(
        &self,
        requests: &[GatewayRequest],
        params: &GatewayParams,
    ) -> Vec<TranslationOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        let mut misses = Vec::new();

        for request in requests {
            match self.cache.get(&self.key(&request.text, params)) {
                Ok(Some(cached)) => {
                    debug!(unit_id = %request.id, "cache hit");
                    outcomes.push(TranslationOutcome::succeeded(&request.id, cached));
                }
                Ok(None) => misses.push(request.clone()),
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "cache lookup failed");
                    misses.push(request.clone());
                }
            }
        }
        self.hits.fetch_add(outcomes.len(), Ordering::Relaxed);

        if misses.is_empty() {
            return outcomes;
        }

        let fresh = self.inner.translate(&misses, params).await;
        for outcome in fresh.iter().filter(|o| o.success) {
            let Some(request) = misses.iter().find(|r| r.id == outcome.id) else {
                continue;
            };
            if let Err(e) = self
                .cache
                .put(&self.key(&request.text, params), &outcome.translated_text)
            {
                warn!(error = %format!("{e:#}"), "cache write failed");
            }
        }

        outcomes.extend(fresh);
        outcomes
    }
}
