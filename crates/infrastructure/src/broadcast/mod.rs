//! In-process publish/subscribe for live survey updates.
//!
//! Each topic is a [`tokio::sync::broadcast`] channel created on first use.
//! Publishing never blocks and never fails: with no listeners the update is
//! dropped, and a listener that falls behind skips to the newest updates.
//! The channel of a topic is removed once its last subscription is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use futures::Stream;
use parking_lot::Mutex;
use rendezvous_domain::survey::{Survey, SurveyTopic};
use rendezvous_workflow::ports::SurveyPublisher;
use tokio::sync::broadcast::{self, error::RecvError};

/// Buffered updates per topic before slow listeners start lagging.
pub const DEFAULT_TOPIC_CAPACITY: usize = 64;

type Topics = Arc<Mutex<HashMap<String, broadcast::Sender<Survey>>>>;

// =============================================================================
// TopicRegistry
// =============================================================================

#[derive(Debug, Clone)]
pub struct TopicRegistry {
    topics: Topics,
    capacity: usize,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_CAPACITY)
    }
}

impl TopicRegistry {
    /// A `capacity` of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, topic: &SurveyTopic) -> Subscription {
        let receiver = self
            .topics
            .lock()
            .entry(topic.as_str().to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();

        tracing::debug!(topic = %topic, "Survey listener subscribed");
        Subscription {
            topic: topic.clone(),
            receiver,
            topics: Arc::clone(&self.topics),
        }
    }

    /// Current listeners of `topic`.
    #[must_use]
    pub fn listener_count(&self, topic: &SurveyTopic) -> usize {
        self.topics
            .lock()
            .get(topic.as_str())
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Number of topics with a live channel.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.lock().len()
    }
}

impl SurveyPublisher for TopicRegistry {
    fn publish(&self, topic: &SurveyTopic, survey: &Survey) -> usize {
        let topics = self.topics.lock();
        let Some(sender) = topics.get(topic.as_str()) else {
            return 0;
        };
        sender.send(survey.clone()).unwrap_or(0)
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// A listener on one survey topic.
#[derive(Debug)]
pub struct Subscription {
    topic: SurveyTopic,
    receiver: broadcast::Receiver<Survey>,
    topics: Topics,
}

impl Subscription {
    #[must_use]
    pub const fn topic(&self) -> &SurveyTopic {
        &self.topic
    }

    /// Waits for the next update. Returns `None` once the topic is gone.
    pub async fn recv(&mut self) -> Option<Survey> {
        loop {
            match self.receiver.recv().await {
                Ok(survey) => return Some(survey),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "Survey listener lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Survey> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            let survey = subscription.recv().await?;
            Some((survey, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut topics = self.topics.lock();
        let Some(sender) = topics.get(self.topic.as_str()) else {
            return;
        };
        // This receiver is still counted until the field itself drops.
        if sender.receiver_count() <= 1 {
            topics.remove(self.topic.as_str());
            tracing::debug!(topic = %self.topic, "Survey topic released");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
