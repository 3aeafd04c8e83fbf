#[cfg(test)]
mod tests {
    use crate::harness::{FlakyKvStore, RecordingPublisher, StubDirectory, TestBackend};
    use std::sync::Arc;
    use whisperbox_core::{
        now_unix, ChannelId, CoreError, DestinationId, Membership, RoutingEngine, Selection,
    };

    #[tokio::test]
    async fn test_publish_failure_deletes_pending_and_writes_no_record() {
        let backend = TestBackend::builder()
            .member("u2", "d2", "Gaming")
            .member("u2", "d3", "Music")
            .destination("d2", "c2")
            .destination("d3", "c3")
            .build()
            .await;
        let now = now_unix();
        backend.engine.submit("u2", "my secret", vec![], now).await.unwrap();

        backend.publisher.fail_next_publishes();
        let err = backend
            .engine
            .resolve("u2", Selection::Numeric("1".to_string()), now)
            .await;
        assert!(matches!(err, Err(CoreError::Publish(_))));

        // deliberate tradeoff: the confession is lost rather than left in a
        // state the system could replay on the submitter's behalf
        assert!(!backend.engine.has_pending("u2").await.unwrap());
        assert_eq!(backend.record_count("d2") + backend.record_count("d3"), 0);

        let late = backend
            .engine
            .resolve("u2", Selection::Numeric("1".to_string()), now)
            .await;
        assert!(matches!(late, Err(CoreError::SelectionExpired)));
    }

    #[tokio::test]
    async fn test_publish_failure_on_auto_post_writes_no_record() {
        let backend = TestBackend::builder()
            .member("u1", "d1", "One")
            .destination("d1", "c1")
            .build()
            .await;

        backend.publisher.fail_next_publishes();
        let err = backend
            .engine
            .submit("u1", "my secret", vec![], now_unix())
            .await;
        assert!(matches!(err, Err(CoreError::Publish(_))));
        assert_eq!(backend.record_count("d1"), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let kv = Arc::new(FlakyKvStore::new());
        let engine = RoutingEngine::new(
            kv.clone(),
            Arc::new(RecordingPublisher::default()),
            Arc::new(StubDirectory::with_rows(vec![(
                "u1".to_string(),
                Membership {
                    destination_id: DestinationId::new("d1"),
                    display_name: "One".to_string(),
                },
            )])),
        );
        engine
            .destinations()
            .set_destination(&DestinationId::new("d1"), &ChannelId::new("c1"), now_unix())
            .await
            .unwrap();

        kv.fail_next_ops();
        let err = engine.submit("u1", "my secret", vec![], now_unix()).await;
        assert!(matches!(err, Err(CoreError::Storage(_))));
    }

    #[tokio::test]
    async fn test_destination_unconfigured_between_enumeration_and_publish() {
        let backend = TestBackend::builder()
            .member("u2", "d2", "Gaming")
            .member("u2", "d3", "Music")
            .destination("d2", "c2")
            .destination("d3", "c3")
            .build()
            .await;
        let now = now_unix();
        backend.engine.submit("u2", "my secret", vec![], now).await.unwrap();

        // admin disables d2 while the user is choosing
        backend
            .engine
            .destinations()
            .disable_destination(&DestinationId::new("d2"), now)
            .await
            .unwrap();

        let err = backend
            .engine
            .resolve("u2", Selection::Numeric("1".to_string()), now)
            .await;
        assert!(matches!(err, Err(CoreError::NoDestination)));
        assert_eq!(backend.record_count("d2"), 0);
    }

    #[tokio::test]
    async fn test_channel_repoint_honored_at_publish() {
        let backend = TestBackend::builder()
            .member("u2", "d2", "Gaming")
            .member("u2", "d3", "Music")
            .destination("d2", "c2")
            .destination("d3", "c3")
            .build()
            .await;
        let now = now_unix();
        backend.engine.submit("u2", "my secret", vec![], now).await.unwrap();

        backend
            .engine
            .destinations()
            .set_destination(&DestinationId::new("d2"), &ChannelId::new("c2-moved"), now)
            .await
            .unwrap();

        backend
            .engine
            .resolve("u2", Selection::Numeric("1".to_string()), now)
            .await
            .unwrap();

        let published = backend.publisher.published();
        assert_eq!(published[0].0, ChannelId::new("c2-moved"));
        assert_eq!(backend.records("d2")[0].channel_id.as_str(), "c2-moved");
    }
}
