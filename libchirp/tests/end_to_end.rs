//! End-to-end tests for the full bot invocation cycle
//!
//! These drive publish + update checks through the public API the way a
//! scheduled invocation would, against a mock feed and a real temp state
//! directory, including restarts (fresh poller and session over the same
//! state directory).

use std::sync::Arc;
use std::sync::Mutex;

use chrono::Utc;
use libchirp::config::{PollingConfig, PublisherConfig};
use libchirp::feed::mock::{MockFeed, MockFeedConfig};
use libchirp::types::{Author, Follower, OwnPost, Status, StatusId, UserId};
use libchirp::{
    Credentials, EventHooks, Feature, FeedSession, PostPublisher, StateStore, UpdatePoller,
};
use tempfile::TempDir;

fn test_credentials() -> Credentials {
    Credentials::new("ck", "cs", "at", "ats")
}

fn session_with(config: MockFeedConfig) -> FeedSession {
    FeedSession::new(Box::new(MockFeed::new(config)), test_credentials())
}

fn fixtures() -> MockFeedConfig {
    let fan = Author {
        id: UserId(7),
        name: "Some Fan".to_string(),
        handle: "somefan".to_string(),
    };

    MockFeedConfig {
        followers: vec![Follower {
            id: fan.id,
            name: fan.name.clone(),
            handle: fan.handle.clone(),
        }],
        own_posts: vec![OwnPost {
            id: StatusId(100),
            favorite_count: 2,
        }],
        retweets: vec![Status {
            id: StatusId(205),
            author: fan.clone(),
            text: "a retweeted status".to_string(),
            in_reply_to_user: None,
            retweet_count: 3,
            created_at: Utc::now(),
        }],
        timeline: vec![Status {
            id: StatusId(301),
            author: fan,
            text: "a reply to the bot".to_string(),
            in_reply_to_user: Some(UserId(1)),
            retweet_count: 0,
            created_at: Utc::now(),
        }],
        ..Default::default()
    }
}

/// Count every notification, whatever the event type.
#[derive(Default)]
struct TallyHooks {
    events: Mutex<u32>,
}

impl TallyHooks {
    fn count(&self) -> u32 {
        *self.events.lock().unwrap()
    }

    fn bump(&self) {
        *self.events.lock().unwrap() += 1;
    }
}

impl EventHooks for TallyHooks {
    fn on_post(&self, _status: &Status) {
        self.bump();
    }

    fn on_retweet(&self, _status: &Status) {
        self.bump();
    }

    fn on_new_follower(&self, _follower: &Follower) {
        self.bump();
    }

    fn on_favorite(&self, _post: &OwnPost, _previous: u64) {
        self.bump();
    }

    fn on_reply(&self, _reply: &Status) {
        self.bump();
    }

    fn on_direct_message(&self, _message: &libchirp::types::DirectMessage) {
        self.bump();
    }
}

#[tokio::test]
async fn test_full_invocation_publishes_and_checks() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let hooks = Arc::new(TallyHooks::default());

    let mock_config = fixtures();
    let posted = mock_config.posted_statuses.clone();
    let mut session = session_with(mock_config);

    let publisher = PostPublisher::with_hooks(
        &PublisherConfig {
            rate_limit_attempts: 2,
            rate_limit_sleep_secs: 0,
        },
        hooks.clone(),
    );
    publisher
        .post(&mut session, "scheduled update")
        .await
        .unwrap();
    assert_eq!(*posted.lock().unwrap(), vec!["scheduled update".to_string()]);

    let polling = PollingConfig {
        interval: 0,
        ..Default::default()
    };
    let poller = UpdatePoller::with_hooks(StateStore::new(&state_dir), polling, hooks.clone());
    poller.check_for_updates(&mut session).await.unwrap();

    // One post + one retweet + one follower + one favorite + one reply.
    assert_eq!(hooks.count(), 5);

    // Every feature persisted its state.
    let store = StateStore::new(&state_dir);
    assert_eq!(store.load_marker(Feature::Retweets), Some(StatusId(205)));
    assert_eq!(store.load_marker(Feature::Replies), Some(StatusId(301)));
    assert_eq!(store.load_follower_set().len(), 1);
    assert_eq!(store.load_favorite_ledger().get(&StatusId(100)), Some(&2));
}

#[tokio::test]
async fn test_second_invocation_reports_nothing_new() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let polling = PollingConfig {
        interval: 0,
        ..Default::default()
    };

    // First run.
    let first_hooks = Arc::new(TallyHooks::default());
    let poller = UpdatePoller::with_hooks(
        StateStore::new(&state_dir),
        polling.clone(),
        first_hooks.clone(),
    );
    let mut session = session_with(fixtures());
    poller.check_for_updates(&mut session).await.unwrap();
    assert_eq!(first_hooks.count(), 4);

    // A fresh process: new poller, new session, same remote data, same
    // state directory. Nothing should be re-reported.
    let second_hooks = Arc::new(TallyHooks::default());
    let poller =
        UpdatePoller::with_hooks(StateStore::new(&state_dir), polling, second_hooks.clone());
    let mut session = session_with(fixtures());
    poller.check_for_updates(&mut session).await.unwrap();
    assert_eq!(second_hooks.count(), 0);
}

#[tokio::test]
async fn test_later_interactions_picked_up_after_restart() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let polling = PollingConfig {
        interval: 0,
        ..Default::default()
    };

    let poller = UpdatePoller::new(StateStore::new(&state_dir), polling.clone());
    let mut session = session_with(fixtures());
    poller.check_for_updates(&mut session).await.unwrap();

    // The feed gains a newer retweet and the old one stays visible.
    let mut later = fixtures();
    later.retweets.push(Status {
        id: StatusId(210),
        author: Author {
            id: UserId(8),
            name: "Another".to_string(),
            handle: "another".to_string(),
        },
        text: "a newer retweet".to_string(),
        in_reply_to_user: None,
        retweet_count: 1,
        created_at: Utc::now(),
    });

    let poller = UpdatePoller::new(StateStore::new(&state_dir), polling);
    let mut session = session_with(later);
    let found = poller.check_retweets(&mut session).await.unwrap();

    // Only the item past the marker comes back, and the marker advances.
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, StatusId(210));
    let store = StateStore::new(&state_dir);
    assert_eq!(store.load_marker(Feature::Retweets), Some(StatusId(210)));
}

#[tokio::test]
async fn test_cadence_counter_persists_across_invocations() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let polling = PollingConfig {
        interval: 3,
        ..Default::default()
    };

    let mock_config = fixtures();
    let auth_calls = mock_config.auth_call_count.clone();

    // Invocation 1: fresh counter, so the check fires and resets it.
    let poller = UpdatePoller::new(StateStore::new(&state_dir), polling.clone());
    let mut session = session_with(mock_config);
    poller.check_for_updates(&mut session).await.unwrap();
    assert_eq!(*auth_calls.lock().unwrap(), 1);

    // Invocations 2 and 3: countdown, no remote contact.
    for expected_remaining in [2, 1] {
        let mock_config = fixtures();
        let auth_calls = mock_config.auth_call_count.clone();
        let poller = UpdatePoller::new(StateStore::new(&state_dir), polling.clone());
        let mut session = session_with(mock_config);
        poller.check_for_updates(&mut session).await.unwrap();
        assert_eq!(*auth_calls.lock().unwrap(), 0);
        assert_eq!(
            StateStore::new(&state_dir).load_cadence_counter(),
            expected_remaining
        );
    }

    // Invocation 4: interval hit again.
    let mock_config = fixtures();
    let auth_calls = mock_config.auth_call_count.clone();
    let poller = UpdatePoller::new(StateStore::new(&state_dir), polling);
    let mut session = session_with(mock_config);
    poller.check_for_updates(&mut session).await.unwrap();
    assert_eq!(*auth_calls.lock().unwrap(), 1);
    assert_eq!(StateStore::new(&state_dir).load_cadence_counter(), 3);
}

#[tokio::test]
async fn test_corrupt_state_recovers_with_renotification() {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let polling = PollingConfig {
        interval: 0,
        ..Default::default()
    };

    let poller = UpdatePoller::new(StateStore::new(&state_dir), polling.clone());
    let mut session = session_with(fixtures());
    poller.check_retweets(&mut session).await.unwrap();

    // Someone truncates the marker file mid-write; the next run falls
    // back to "never seen anything" and reports the retweet again.
    std::fs::write(state_dir.join("retweets.toml"), "latest_se").unwrap();

    let poller = UpdatePoller::new(StateStore::new(&state_dir), polling);
    let mut session = session_with(fixtures());
    let found = poller.check_retweets(&mut session).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(
        StateStore::new(&state_dir).load_marker(Feature::Retweets),
        Some(StatusId(205))
    );
}
