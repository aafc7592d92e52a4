use std::sync::Arc;

use crate::{db::InteractionStore, models::InteractionEvent};

/// Fire-and-forget interaction recording
///
/// `record` hands the event to a background task and returns at once. Store
/// failures are logged inside that task and never reach the request.
#[derive(Clone)]
pub struct InteractionRecorder {
    store: Arc<dyn InteractionStore>,
}

impl InteractionRecorder {
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    pub fn record(&self, event: InteractionEvent) -> tokio::task::JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move {
            match store.append(&event).await {
                Ok(()) => tracing::debug!(
                    session_id = %event.session_id,
                    category = %event.category,
                    clicked = event.is_click(),
                    "Interaction recorded"
                ),
                Err(e) => tracing::error!(
                    session_id = %event.session_id,
                    error = %e,
                    "Failed to record interaction"
                ),
            }
        })
    }
}
