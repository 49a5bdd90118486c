//! In-process publish/subscribe hub for mutation events
//!
//! Subscribers attach to a [`Topic`] and receive every event published to it
//! after they subscribed, in publish order. Each subscriber owns an unbounded
//! queue, so `publish` never waits for consumers. There is no history: an
//! event published while nobody listens is dropped.
//!
//! Topic bookkeeping is created on first subscribe and removed when the last
//! subscriber of a topic goes away.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::db::{CommentRecord, PostRecord};

// ============================================================================
// Topics and events
// ============================================================================

/// Addressable event stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Published posts, visible to everyone
    Posts,
    /// Every post mutation of one author, drafts included
    UserPosts(String),
    /// Comment mutations on one post
    PostComments(String),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Posts => write!(f, "post"),
            Topic::UserPosts(user_id) => write!(f, "post:{}", user_id),
            Topic::PostComments(post_id) => write!(f, "comment:{}", post_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventPayload {
    Post(PostRecord),
    Comment(CommentRecord),
}

/// One mutation side effect, immutable once published
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationEvent {
    pub kind: MutationKind,
    pub payload: EventPayload,
}

impl MutationEvent {
    pub fn post(kind: MutationKind, post: PostRecord) -> Self {
        Self {
            kind,
            payload: EventPayload::Post(post),
        }
    }

    pub fn comment(kind: MutationKind, comment: CommentRecord) -> Self {
        Self {
            kind,
            payload: EventPayload::Comment(comment),
        }
    }
}

/// Topics a post mutation fans out to
pub fn post_topics(post: &PostRecord) -> Vec<Topic> {
    let mut topics = Vec::with_capacity(2);
    if post.published {
        topics.push(Topic::Posts);
    }
    topics.push(Topic::UserPosts(post.author_id.clone()));
    topics
}

/// Topics a comment mutation fans out to
pub fn comment_topics(comment: &CommentRecord) -> Vec<Topic> {
    vec![Topic::PostComments(comment.post_id.clone())]
}

// ============================================================================
// Router
// ============================================================================

struct TopicChannel<E> {
    subscribers: Mutex<Vec<(u64, mpsc::UnboundedSender<E>)>>,
}

impl<E> TopicChannel<E> {
    fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

struct RouterInner<E> {
    topics: RwLock<HashMap<Topic, Arc<TopicChannel<E>>>>,
    next_id: AtomicU64,
}

impl<E> RouterInner<E> {
    /// Remove one subscriber; drop the topic once nobody is left
    fn unsubscribe(&self, topic: &Topic, id: u64) {
        // Topic removal happens under the map write lock, the same lock
        // subscribe registers under, so no subscriber can land in a channel
        // that has already been unlinked.
        let mut topics = self.topics.write();
        let Some(channel) = topics.get(topic) else {
            return;
        };

        let now_empty = {
            let mut subscribers = channel.subscribers.lock();
            subscribers.retain(|(sub_id, _)| *sub_id != id);
            subscribers.is_empty()
        };

        if now_empty {
            topics.remove(topic);
            tracing::debug!(topic = %topic, "Topic has no subscribers left, removed");
        }
    }
}

/// Topic-keyed fan-out hub. Cheap to clone; clones share state.
pub struct EventRouter<E> {
    inner: Arc<RouterInner<E>>,
}

impl<E> Clone for EventRouter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E> Default for EventRouter<E>
where
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventRouter<E>
where
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RouterInner {
                topics: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Attach a new subscriber to `topic`
    pub fn subscribe(&self, topic: Topic) -> Subscription<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut topics = self.inner.topics.write();
            let channel = topics
                .entry(topic.clone())
                .or_insert_with(|| Arc::new(TopicChannel::new()));
            channel.subscribers.lock().push((id, tx));
        }

        tracing::debug!(topic = %topic, subscriber = id, "Subscribed");

        Subscription {
            id,
            topic,
            receiver: rx,
            router: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every current subscriber of `topic`.
    ///
    /// Returns how many subscribers were reached. Never blocks on consumers
    /// and never fails; queues whose receiver is gone are pruned.
    pub fn publish(&self, topic: &Topic, event: E) -> usize {
        let channel = match self.inner.topics.read().get(topic) {
            Some(channel) => channel.clone(),
            None => return 0,
        };

        // Holding the topic lock for the whole fan-out keeps every
        // subscriber's view of this topic in the same order.
        let mut subscribers = channel.subscribers.lock();
        let mut delivered = 0;
        subscribers.retain(|(_, tx)| match tx.send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => false,
        });

        tracing::debug!(topic = %topic, delivered, "Published event");
        delivered
    }

    /// Publish the same event to several topics
    pub fn publish_all(&self, topics: &[Topic], event: E) -> usize {
        topics
            .iter()
            .map(|topic| self.publish(topic, event.clone()))
            .sum()
    }

    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.inner
            .topics
            .read()
            .get(topic)
            .map_or(0, |channel| channel.subscribers.lock().len())
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.inner.topics.read().len()
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Ordered event stream for one topic. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription<E> {
    id: u64,
    topic: Topic,
    receiver: mpsc::UnboundedReceiver<E>,
    router: std::sync::Weak<RouterInner<E>>,
}

impl<E> Subscription<E> {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Wait for the next event; `None` once the router is gone
    pub async fn recv(&mut self) -> Option<E> {
        self.receiver.recv().await
    }

    /// Take an already-delivered event without waiting
    pub fn try_recv(&mut self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Stop receiving events
    pub fn cancel(self) {}
}

impl<E> Stream for Subscription<E> {
    type Item = E;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<E>> {
        self.receiver.poll_recv(cx)
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        self.receiver.close();
        if let Some(router) = self.router.upgrade() {
            router.unsubscribe(&self.topic, self.id);
            tracing::debug!(topic = %self.topic, subscriber = self.id, "Unsubscribed");
        }
    }
}
