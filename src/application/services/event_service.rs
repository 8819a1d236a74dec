use tracing::Instrument;
use uuid::Uuid;

use crate::application::messaging::EventDispatcher;
use crate::domain::entities::InboundEvent;

/// Per-batch result counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub handled: usize,
    pub dropped: usize,
}

/// Service for handling batches of inbound events
///
/// Each event is handled independently: a failure is logged and the event is
/// dropped without affecting the rest of the batch.
#[derive(Clone)]
pub struct EventService {
    dispatcher: EventDispatcher,
}

impl EventService {
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Handle one event inside its own span; errors are logged, not returned
    pub async fn handle(&self, event: InboundEvent) -> bool {
        let span = tracing::info_span!(
            "event",
            id = %Uuid::new_v4(),
            kind = event.kind().as_str(),
            user = event.user_id(),
        );

        async {
            tracing::debug!("received at {}", event.timestamp());
            match self.dispatcher.dispatch(&event).await {
                Ok(Some(reply)) => {
                    let preview: String = reply.text.chars().take(40).collect();
                    tracing::info!("replied: {}", preview);
                    true
                }
                Ok(None) => true,
                Err(e) if e.is_not_found() => {
                    tracing::warn!("dropping event for unknown user: {}", e);
                    false
                }
                Err(e) => {
                    tracing::error!("failed to handle event: {}", e);
                    false
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Handle a batch: users are processed concurrently, each user's events in order
    pub async fn handle_all(&self, events: Vec<InboundEvent>) -> BatchSummary {
        let mut per_user: Vec<(String, Vec<InboundEvent>)> = Vec::new();
        for event in events {
            match per_user.iter_mut().find(|(user, _)| user == event.user_id()) {
                Some((_, queue)) => queue.push(event),
                None => per_user.push((event.user_id().to_string(), vec![event])),
            }
        }

        // Spawned tasks outlive a dropped request, so every event runs to completion
        let mut tasks = Vec::with_capacity(per_user.len());
        for (_, queue) in per_user {
            let service = self.clone();
            tasks.push(tokio::spawn(async move {
                let mut summary = BatchSummary::default();
                for event in queue {
                    if service.handle(event).await {
                        summary.handled += 1;
                    } else {
                        summary.dropped += 1;
                    }
                }
                summary
            }));
        }

        let mut summary = BatchSummary::default();
        for task in tasks {
            match task.await {
                Ok(part) => {
                    summary.handled += part.handled;
                    summary.dropped += part.dropped;
                }
                Err(e) => tracing::error!("event task panicked: {}", e),
            }
        }
        summary
    }
}
