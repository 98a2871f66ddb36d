//! Event routing: classify incoming events and dispatch responses.
//!
//! ## Module Structure
//!
//! - `templates`: response and thread-title pools
//! - `resolver`: target channel lookup by name preference
//! - `classifier`: event -> intents
//! - `dispatcher`: intent -> gateway calls, with fallbacks
//! - `diagnostics`: log lines for events and outcomes
//! - `gateway`: the collaborator trait the dispatcher calls
//! - `commands`: prefix command parsing

pub mod classifier;
pub mod commands;
pub mod diagnostics;
pub mod dispatcher;
pub mod gateway;
pub mod resolver;
pub mod templates;

#[cfg(test)]
pub mod testing;

use rand::Rng;
use tracing::debug;

use crate::common::{Event, Snowflake};
use crate::config::types::RoutingConfig;

pub use classifier::{Classifier, Intent};
pub use diagnostics::Diagnostics;
pub use dispatcher::{DispatchResult, Dispatcher};
pub use gateway::Gateway;
pub use templates::TemplateBank;

/// Per-event pipeline: observe, classify, dispatch, record.
///
/// Immutable after construction, so one instance is shared by every
/// concurrently running event handler.
#[derive(Debug, Clone, Default)]
pub struct EventRouter {
    classifier: Classifier,
    templates: TemplateBank,
    diagnostics: Diagnostics,
}

impl EventRouter {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            classifier: Classifier::from_config(config),
            templates: TemplateBank::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Process one event to completion.
    ///
    /// Intents run in classification order. Failures end up in the returned
    /// results and the log; nothing is propagated.
    pub async fn handle<G, R>(
        &self,
        gateway: &G,
        self_id: Snowflake,
        event: Event,
        rng: &mut R,
    ) -> Vec<DispatchResult>
    where
        G: Gateway + ?Sized,
        R: Rng + Send,
    {
        self.diagnostics.observe(&event, self_id);

        let intents = self.classifier.classify(&event, self_id);
        debug!(
            "Classified {} into {:?}",
            event.kind(),
            intents.iter().map(Intent::name).collect::<Vec<_>>()
        );

        let dispatcher = Dispatcher::new(gateway, &self.templates);
        let mut results = Vec::with_capacity(intents.len());
        for intent in &intents {
            let result = dispatcher.dispatch(intent, rng).await;
            diagnostics::record(intent, &result);
            results.push(result);
        }
        results
    }
}
