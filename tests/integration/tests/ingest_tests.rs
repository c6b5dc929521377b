//! End-to-end ingestion tests
//!
//! Every scenario runs the real caches, resolver, streams and pipeline over
//! an in-memory store, a scripted transport and a recording sink.
//!
//! Run with: cargo test -p integration-tests --test ingest_tests

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use integration_tests::{config, fixtures::*, TestEnv};
use packscout_cache::MemoryStore;
use packscout_common::IngestMode;
use packscout_core::{EmojiId, KeyValueStore, MessageId, PackId};
use packscout_ingest::testing::{ScriptedTransport, TransportCall};
use packscout_ingest::{ingest, MessageOutcome};

// ============================================================================
// Discovery Scenarios
// ============================================================================

#[tokio::test]
async fn test_short_name_link_discovers_whole_pack() {
    let transport = ScriptedTransport::new()
        .with_pack(foo_pack())
        .with_history("chan", vec![link_message("chan", 1, "foo")]);
    let env = TestEnv::scrape(transport, &["chan"]);

    let stats = env.run().await.unwrap();

    assert_eq!(stats.messages_processed, 1);
    assert_eq!(
        env.memory.value("emojipack:7:emoji_ids").as_deref(),
        Some("[101,102]")
    );
    assert!(env.known_ids().contains("101"));
    assert!(env.known_ids().contains("102"));

    assert_eq!(env.upserted_packs(), vec![PackId::new(7)]);
    let emoji = env.sink.emoji();
    assert_eq!(emoji.len(), 2);
    assert!(emoji.iter().all(|e| e.pack_id == PackId::new(7)));
    assert!(emoji.iter().all(|e| e.description == "Foo Pack"));
    assert_eq!(emoji[0].file_path, "/7/101.tgs");

    assert_eq!(env.transport.pack_fetches(), 1);
    assert_eq!(env.transport.document_fetches(), 0);
    assert_eq!(env.cursor("chan").await.unwrap(), MessageId::new(1));
}

#[tokio::test]
async fn test_cached_parent_skips_document_lookup() {
    let transport = ScriptedTransport::new()
        .with_pack(foo_pack())
        .with_history("chan", vec![reaction_message("chan", 1, 55)]);
    let env = TestEnv::scrape(transport, &["chan"]);
    env.memory.set("emoji:55:emojipack_id", "7").await.unwrap();

    env.run().await.unwrap();

    assert_eq!(env.transport.document_fetches(), 0);
    let emoji = env.sink.emoji();
    assert_eq!(emoji.len(), 1);
    assert_eq!(emoji[0].emoji_id, EmojiId::new(55));
    assert_eq!(emoji[0].pack_id, PackId::new(7));
}

#[tokio::test]
async fn test_failed_pack_fetch_still_advances_cursor() {
    let transport = ScriptedTransport::new()
        .with_pack(foo_pack())
        .with_history("chan", vec![link_message("chan", 1, "foo")]);
    transport.fail_pack_name("foo");
    let env = TestEnv::scrape(transport, &["chan"]);

    let stats = env.run().await.unwrap();

    assert_eq!(stats.messages_processed, 1);
    assert!(env.sink.packs().is_empty());
    assert!(env.sink.emoji().is_empty());
    assert!(env.known_ids().is_empty());
    assert_eq!(env.cursor("chan").await.unwrap(), MessageId::new(1));
}

#[tokio::test]
async fn test_sibling_emoji_resolve_without_transport() {
    let transport = ScriptedTransport::new().with_pack(foo_pack()).with_history(
        "chan",
        vec![
            reaction_message("chan", 1, 101),
            entity_message("chan", 2, 102),
            reaction_message("chan", 3, 101),
        ],
    );
    let env = TestEnv::scrape(transport, &["chan"]);

    env.run().await.unwrap();

    assert_eq!(env.transport.document_fetches(), 1);
    assert_eq!(env.transport.pack_fetches(), 1);
    assert_eq!(env.sink.emoji().len(), 3);
}

#[tokio::test]
async fn test_entry_points_agree_on_members() {
    let transport = ScriptedTransport::new()
        .with_pack(foo_pack())
        .with_pack(bar_pack());
    let env = TestEnv::scrape(transport, &["chan"]);
    let resolver = env.context.resolver();

    let by_name = resolver.resolve_by_short_name("bar").await.unwrap();
    let parent = resolver
        .resolve_parent_pack_id(EmojiId::new(56))
        .await
        .unwrap()
        .unwrap();
    let by_id = resolver.resolve_by_pack_id(parent).await.unwrap().unwrap();

    assert_eq!(parent, PackId::new(8));
    assert_eq!(by_id.emoji_ids, by_name);

    // Through the other order for the second pack
    let parent = resolver
        .resolve_parent_pack_id(EmojiId::new(101))
        .await
        .unwrap()
        .unwrap();
    let by_id = resolver.resolve_by_pack_id(parent).await.unwrap().unwrap();
    let by_name = resolver.resolve_by_short_name("foo").await.unwrap();
    assert_eq!(by_id.emoji_ids, by_name);
}

// ============================================================================
// Resume and Failure Handling
// ============================================================================

#[tokio::test]
async fn test_restart_resumes_from_cursor() {
    let memory = Arc::new(MemoryStore::new());
    let scrape = config(IngestMode::Scrape, &["chan"], Duration::ZERO);

    let first = TestEnv::build(
        ScriptedTransport::new().with_history("chan", history("chan", 1..=3)),
        memory.clone(),
        scrape.clone(),
    );
    assert_eq!(first.run().await.unwrap().messages_processed, 3);

    let second = TestEnv::build(
        ScriptedTransport::new().with_history("chan", history("chan", 1..=5)),
        memory,
        scrape,
    );
    let stats = second.run().await.unwrap();

    assert_eq!(stats.messages_processed, 2);
    assert_eq!(second.cursor("chan").await.unwrap(), MessageId::new(5));
    assert!(second.transport.calls().contains(&TransportCall::Paginate {
        source: "chan".to_string(),
        after_id: MessageId::new(3),
    }));
}

#[tokio::test]
async fn test_persistence_failure_keeps_message_for_replay() {
    let memory = Arc::new(MemoryStore::new());
    let scrape = config(IngestMode::Scrape, &["chan"], Duration::ZERO);
    let messages = vec![link_message("chan", 1, "foo"), link_message("chan", 2, "foo")];

    let failing = TestEnv::build(
        ScriptedTransport::new()
            .with_pack(foo_pack())
            .with_history("chan", messages.clone()),
        memory.clone(),
        scrape.clone(),
    );
    failing.sink.set_failing(true);

    let stats = failing.run().await.unwrap();
    assert_eq!(stats.sources_halted, 1);
    // The halted backfill stops before handing out message 2
    assert_eq!(stats.messages_skipped, 0);
    assert_eq!(stats.messages_processed, 0);
    assert_eq!(failing.cursor("chan").await.unwrap(), MessageId::new(0));

    // After a restart both messages are replayed
    let healed = TestEnv::build(
        ScriptedTransport::new()
            .with_pack(foo_pack())
            .with_history("chan", messages),
        memory,
        scrape,
    );
    let stats = healed.run().await.unwrap();

    assert_eq!(stats.messages_processed, 2);
    assert_eq!(healed.cursor("chan").await.unwrap(), MessageId::new(2));
    // Pack already cached from the failed run
    assert_eq!(healed.transport.pack_fetches(), 0);
}

#[tokio::test]
async fn test_halted_source_does_not_stop_others() {
    let transport = ScriptedTransport::new()
        .with_history("chan", vec![reaction_message("chan", 1, 101)])
        .with_history("other", history("other", 1..=2));
    let env = TestEnv::scrape(transport.with_pack(foo_pack()), &["chan", "other"]);
    env.sink.set_failing(true);

    let stats = env.run().await.unwrap();

    assert_eq!(stats.sources_halted, 1);
    assert_eq!(stats.messages_processed, 2);
    assert_eq!(env.cursor("chan").await.unwrap(), MessageId::new(0));
    assert_eq!(env.cursor("other").await.unwrap(), MessageId::new(2));
}

#[tokio::test]
async fn test_cache_outage_is_fatal() {
    let transport = ScriptedTransport::new().with_history("chan", history("chan", 1..=2));
    let env = TestEnv::scrape(transport, &["chan"]);
    env.memory.set_unavailable(true);

    assert!(env.run().await.is_err());
    assert!(env.sink.packs().is_empty());
}

#[tokio::test]
async fn test_known_set_only_grows() {
    let transport = ScriptedTransport::new()
        .with_pack(foo_pack())
        .with_pack(bar_pack());
    let env = TestEnv::scrape(transport, &["chan"]);
    let mut pipeline = env.context.pipeline();

    let messages = [
        reaction_message("chan", 1, 55),
        link_message("chan", 2, "foo"),
        reaction_message("chan", 3, 999),
        entity_message("chan", 4, 101),
    ];

    let mut previous = env.known_ids();
    for message in &messages {
        pipeline.process_message(message).await.unwrap();
        let current = env.known_ids();
        assert!(previous.is_subset(&current));
        previous = current;
    }

    assert_eq!(previous.len(), 4);
    assert!(previous.contains("999"));
    assert_eq!(env.context.known().count().await.unwrap(), 4);
}

// ============================================================================
// Streams
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_scrape_is_paced_per_source() {
    let cooldown = Duration::from_millis(500);
    let transport = ScriptedTransport::new()
        .with_history("a", history("a", 1..=3))
        .with_history("b", history("b", 1..=3));
    let env = TestEnv::build(
        transport,
        Arc::new(MemoryStore::new()),
        config(IngestMode::Scrape, &["a", "b"], cooldown),
    );

    let started = tokio::time::Instant::now();
    let stats = env.run().await.unwrap();

    assert_eq!(stats.messages_processed, 6);
    assert!(started.elapsed() >= cooldown * 2);
    assert_eq!(env.cursor("a").await.unwrap(), MessageId::new(3));
    assert_eq!(env.cursor("b").await.unwrap(), MessageId::new(3));
}

#[tokio::test]
async fn test_listen_mode_follows_live_feed() {
    let transport = ScriptedTransport::new()
        .with_pack(foo_pack())
        .with_live(vec![
            link_message("chan", 40, "foo"),
            text_message("elsewhere", 1, "ignored"),
            reaction_message("chan", 41, 102),
        ]);
    let env = TestEnv::build(
        transport,
        Arc::new(MemoryStore::new()),
        config(IngestMode::Listen, &["chan"], Duration::from_secs(60)),
    );
    let mut pipeline = env.context.pipeline();
    let messages = env.context.message_stream(&pipeline.halted_sources());

    let stats = pipeline
        .run(messages.take(2).boxed())
        .await
        .unwrap();

    assert_eq!(stats.messages_processed, 2);
    assert_eq!(env.cursor("chan").await.unwrap(), MessageId::new(41));
    assert!(env
        .transport
        .calls()
        .iter()
        .all(|c| !matches!(c, TransportCall::Paginate { .. })));
}

#[tokio::test]
async fn test_listen_mode_fails_on_persistence_error() {
    let transport = ScriptedTransport::new()
        .with_pack(foo_pack())
        .with_live(vec![
            link_message("chan", 40, "foo"),
            link_message("chan", 41, "foo"),
        ]);
    let env = TestEnv::build(
        transport,
        Arc::new(MemoryStore::new()),
        config(IngestMode::Listen, &["chan"], Duration::ZERO),
    );
    env.sink.set_failing(true);

    let err = ingest(&env.context).await.unwrap_err();

    assert_eq!(err.code(), "SOURCE_HALTED");
    assert!(env.sink.emoji().is_empty());
    assert_eq!(env.cursor("chan").await.unwrap(), MessageId::new(0));
}

#[tokio::test]
async fn test_unresolvable_emoji_is_known_only() {
    let transport =
        ScriptedTransport::new().with_history("chan", vec![entity_message("chan", 1, 404)]);
    let env = TestEnv::scrape(transport, &["chan"]);

    let mut pipeline = env.context.pipeline();
    let outcome = pipeline
        .process_message(&entity_message("chan", 1, 404))
        .await
        .unwrap();

    assert!(matches!(outcome, MessageOutcome::Committed { emoji: 1, emoji_upserted: 0, .. }));
    assert!(env.known_ids().contains("404"));
    assert!(env.sink.emoji().is_empty());
}
