//! # Publisher Scenarios

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mq_client::{
        HandlerDescriptor, MessagePublisher, MessageSubscriber, PublishError,
    };
    use mq_media::InMemoryMedia;
    use mq_types::{LifecycleState, StateError};

    use crate::support::contexts::GoodContextFactory;
    use crate::support::handlers::{HelloHandler, WelcomeHandler};
    use crate::support::messages::{DecayingMessage, HelloMessage, DECAY_ON_ENCODE};
    use crate::support::repository::MessageRepository;
    use crate::support::wait_until;

    #[tokio::test]
    async fn test_publish_reaches_a_running_subscriber() {
        let media = InMemoryMedia::new();
        let repository = MessageRepository::new();

        let mut subscriber = MessageSubscriber::new(
            media.clone(),
            Arc::new(GoodContextFactory::new(repository.clone())),
        );
        subscriber
            .subscribe(HandlerDescriptor::sync::<HelloMessage, HelloHandler>())
            .unwrap();
        subscriber
            .subscribe_with_topic(
                HandlerDescriptor::sync::<HelloMessage, WelcomeHandler>(),
                "topic1",
            )
            .unwrap();
        subscriber.start().unwrap();

        let mut publisher = MessagePublisher::new(media.clone());
        publisher.start().unwrap();

        publisher
            .publish(&HelloMessage::with_topic("Lesia", "topic1"))
            .unwrap();
        publisher.publish(&HelloMessage::new("Olia")).unwrap();

        wait_until(|| repository.len() == 3).await;
        let entries = repository.entries();
        assert!(entries.contains(&"hello sync (topic: 'topic1'), Lesia".to_string()));
        assert!(entries.contains(&"welcome sync (topic: 'topic1'), Lesia".to_string()));
        assert!(entries.contains(&"hello sync (no topic), Olia".to_string()));
    }

    #[tokio::test]
    async fn test_publish_is_gated_by_the_lifecycle() {
        let media = InMemoryMedia::new();
        let mut publisher = MessagePublisher::new(media);

        let err = publisher.publish(&HelloMessage::new("early")).unwrap_err();
        assert!(matches!(
            err,
            PublishError::State(StateError::Inappropriate {
                operation: "publish",
                state: LifecycleState::Idle,
            })
        ));

        publisher.start().unwrap();
        publisher.stop().unwrap();
        let err = publisher.publish(&HelloMessage::new("late")).unwrap_err();
        assert!(matches!(
            err,
            PublishError::State(StateError::Inappropriate {
                operation: "publish",
                state: LifecycleState::Stopped,
            })
        ));

        publisher.dispose();
        let err = publisher.publish(&HelloMessage::new("gone")).unwrap_err();
        assert!(matches!(
            err,
            PublishError::State(StateError::Disposed { .. })
        ));
    }

    #[tokio::test]
    async fn test_poisoned_accessor_fails_the_publish_call_itself() {
        let media = InMemoryMedia::new();
        let mut publisher = MessagePublisher::new(media);
        publisher.start().unwrap();

        let err = publisher
            .publish(&DecayingMessage::new(DECAY_ON_ENCODE))
            .unwrap_err();
        assert!(matches!(
            err,
            PublishError::Media(mq_media::PublishError::Encode { .. })
        ));
    }
}
