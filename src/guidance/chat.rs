use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::guidance::dto::MessageResponse;

const CHANNEL_CAPACITY: usize = 64;

/// Per-request broadcast channels carrying freshly inserted messages to
/// connected SSE readers. A channel lives while it has subscribers and
/// is pruned on the next publish once the last reader is gone.
#[derive(Clone, Default)]
pub struct ChatChannels {
    inner: Arc<RwLock<HashMap<Uuid, broadcast::Sender<MessageResponse>>>>,
}

impl ChatChannels {
    // a poisoned lock only means some holder panicked; the map itself
    // is still consistent, so recover the guard rather than unwind
    pub fn subscribe(&self, request_id: Uuid) -> broadcast::Receiver<MessageResponse> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(request_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn publish(&self, request_id: Uuid, message: MessageResponse) {
        let stale = {
            let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            match map.get(&request_id) {
                Some(tx) => tx.send(message).is_err(),
                None => false,
            }
        };
        if stale {
            let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if map
                .get(&request_id)
                .is_some_and(|tx| tx.receiver_count() == 0)
            {
                map.remove(&request_id);
            }
        }
    }

    #[cfg(test)]
    pub fn channel_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn message(request_id: Uuid) -> MessageResponse {
        MessageResponse {
            id: Uuid::new_v4(),
            request_id,
            sender_id: Uuid::new_v4(),
            content: "hello".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_message() {
        let channels = ChatChannels::default();
        let request_id = Uuid::new_v4();
        let mut rx = channels.subscribe(request_id);

        channels.publish(request_id, message(request_id));
        let received = rx.recv().await.expect("message delivered");
        assert_eq!(received.request_id, request_id);
        assert_eq!(received.content, "hello");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let channels = ChatChannels::default();
        channels.publish(Uuid::new_v4(), message(Uuid::new_v4()));
        assert_eq!(channels.channel_count(), 0);
    }

    #[tokio::test]
    async fn channel_pruned_after_last_reader_drops() {
        let channels = ChatChannels::default();
        let request_id = Uuid::new_v4();
        let rx = channels.subscribe(request_id);
        assert_eq!(channels.channel_count(), 1);

        drop(rx);
        channels.publish(request_id, message(request_id));
        assert_eq!(channels.channel_count(), 0);
    }

    #[test]
    fn delivery_survives_a_poisoned_lock() {
        let channels = ChatChannels::default();
        let inner = channels.inner.clone();
        let _ = std::thread::spawn(move || {
            let _guard = inner.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        let request_id = Uuid::new_v4();
        let mut rx = channels.subscribe(request_id);
        channels.publish(request_id, message(request_id));
        assert_eq!(rx.try_recv().unwrap().request_id, request_id);
    }

    #[tokio::test]
    async fn channels_are_scoped_per_request() {
        let channels = ChatChannels::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = channels.subscribe(a);
        let mut rx_b = channels.subscribe(b);

        channels.publish(a, message(a));
        assert_eq!(rx_a.recv().await.unwrap().request_id, a);
        assert!(rx_b.try_recv().is_err());
    }
}
