//! End-to-end scenarios.
//!
//! Each scenario runs the real runtime, store, and state machines on a virtual
//! clock and checks the final world with an oracle.

use std::time::Duration;

use upside_app::View;
use upside_core::{
    codec,
    error::StoreError,
    noise::GridPattern,
    playback::{PlaybackConfig, PlaybackEvent},
};
use upside_harness::{
    Scenario,
    model::{Cue, playback_timeline},
    sim_env::UNIX_EPOCH_MILLIS,
};
use upside_proto::Mode;

const RECOVERY: &str = "up up down down left right left right b a";

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

fn cue(event: &PlaybackEvent) -> Cue {
    match event {
        PlaybackEvent::Active { bit, .. } => Cue::On(bit.is_one()),
        PlaybackEvent::Inactive { .. } => Cue::Off,
        PlaybackEvent::Finished { .. } => Cue::Finished,
    }
}

#[tokio::test]
async fn transmit_plays_then_returns_to_feed() {
    Scenario::new("transmit")
        .input(Duration::ZERO, "/login will")
        .input(secs(1), "HELLO")
        .input(secs(30), "/quit")
        .oracle(Box::new(|world| {
            assert_eq!(world.view_history(), [View::Login, View::Compose, View::Playback, View::Feed]);
            assert_eq!(world.finished_runs(), 1);

            let expected = playback_timeline(&codec::encode("HELLO"), &PlaybackConfig::default());
            let observed: Vec<_> =
                world.signals().iter().map(|(at, event)| (*at - secs(1), cue(event))).collect();
            assert_eq!(observed, expected);
            assert_eq!(observed.last().map(|(at, _)| *at), Some(millis(24_450)));

            let records = world.records("broadcast");
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].record.from.as_deref(), Some("will"));
            assert_eq!(records[0].record.content.as_deref(), Some("HELLO"));
            assert_eq!(records[0].record.mode.as_deref(), Some("MORSE"));
            assert_eq!(records[0].record.timestamp, Some(UNIX_EPOCH_MILLIS + 1000));

            assert_eq!(world.app().feed().len(), 1);
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn sanity_reaches_possession_after_one_hundred_periods() {
    Scenario::new("possession")
        .input(secs(199), "/login will")
        .input(secs(205), "/back")
        .input(secs(206), "/feed")
        .input(secs(210), "/quit")
        .oracle(Box::new(|world| {
            assert_eq!(world.possessed_at(), Some(secs(200)));
            assert_eq!(world.min_sanity(), Some(0));

            let app = world.app();
            assert!(app.session().is_possessed());
            assert_eq!(app.session().next_deadline(), None);
            assert_eq!(app.view(), View::Compose);
            assert_eq!(app.status(), Some("possessed: enter the sequence"));
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn recovery_sequence_ends_possession() {
    Scenario::new("recovery")
        .input(secs(201), "up up down down left right")
        .input(secs(202), "left right b a")
        .input(secs(203), "/quit")
        .oracle(Box::new(|world| {
            let app = world.app();
            assert!(!app.session().is_possessed());
            assert_eq!(app.session().sanity(), 100);
            assert_eq!(app.status(), Some("recovered"));
            assert_eq!(app.session().recovery_window().count(), 0);
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn decay_resumes_one_period_after_recovery() {
    Scenario::new("decay after recovery")
        .input(secs(201), RECOVERY)
        .input(millis(204_500), "/quit")
        .oracle(Box::new(|world| {
            assert_eq!(world.app().session().sanity(), 99);
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn single_deviation_keeps_possession() {
    Scenario::new("deviation")
        .input(secs(201), "up up down down left right left right a b")
        .input(secs(202), "/quit")
        .oracle(Box::new(|world| {
            assert!(world.app().session().is_possessed());
            assert_eq!(world.app().session().sanity(), 0);
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn unknown_words_are_rejected_while_possessed() {
    Scenario::new("unknown words")
        .input(secs(201), "up up sideways")
        .input(secs(202), "/quit")
        .oracle(Box::new(|world| {
            let app = world.app();
            assert!(app.session().is_possessed());
            assert_eq!(app.session().recovery_window().count(), 0);
            assert_eq!(app.status(), Some("not a recovery token: \"sideways\""));
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn replay_uses_the_mode_it_was_sent_with() {
    Scenario::new("replay")
        .seed(11)
        .input(Duration::ZERO, "/login will")
        .remote(secs(1), "mike", "RUN", Mode::Grid)
        .input(secs(2), "/feed")
        .input(secs(3), "/play 1")
        .input(secs(4), "/quit")
        .oracle(Box::new(|world| {
            let app = world.app();
            assert_eq!(app.view(), View::Playback);

            let playback = app.playback().ok_or("no playback on screen")?;
            assert_eq!(playback.mode, Mode::Grid);
            assert_eq!(playback.content, "RUN");
            assert_eq!(playback.symbols, codec::encode("RUN"));
            assert!(playback.noise.is_some());
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn feed_is_ordered_newest_first() {
    Scenario::new("ordering")
        .input(Duration::ZERO, "/login will")
        .remote(secs(1), "mike", "FIRST", Mode::Morse)
        .remote(secs(2), "dustin", "SECOND", Mode::Beep)
        .input(secs(3), "/quit")
        .oracle(Box::new(|world| {
            let feed = world.app().feed();
            let senders: Vec<_> = feed.entries().iter().map(|e| e.message.sender_id()).collect();
            assert_eq!(senders, ["dustin", "mike"]);
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn feed_error_keeps_previous_snapshot() {
    Scenario::new("feed error")
        .input(Duration::ZERO, "/login will")
        .remote(secs(1), "mike", "HELP", Mode::Color)
        .feed_error(secs(2), StoreError::Unavailable("offline".into()))
        .input(secs(3), "/quit")
        .oracle(Box::new(|world| {
            let app = world.app();
            assert_eq!(app.feed().len(), 1);
            assert_eq!(app.feed().version(), 2);
            assert_eq!(app.status(), Some("feed unavailable: store unavailable: offline"));
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn failed_append_still_plays_locally() {
    Scenario::new("append failure")
        .fail_appends(Duration::ZERO, Some(StoreError::Unavailable("offline".into())))
        .input(Duration::ZERO, "/login will")
        .input(secs(1), "A")
        .input(secs(10), "/quit")
        .oracle(Box::new(|world| {
            assert_eq!(world.store().rejected_appends(), 1);
            assert!(world.records("broadcast").is_empty());
            assert_eq!(world.finished_runs(), 1);
            assert_eq!(world.app().view(), View::Feed);
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn new_transmission_supersedes_the_old_one() {
    Scenario::new("supersede")
        .input(Duration::ZERO, "/login will")
        .input(secs(1), "A")
        .input(secs(2), "B")
        .input(secs(10), "/quit")
        .oracle(Box::new(|world| {
            assert_eq!(world.finished_runs(), 1);

            let first_run = world.signals().first().map(|(_, e)| e.run()).ok_or("no signals")?;
            let after: Vec<_> =
                world.signals().iter().filter(|(at, _)| *at >= secs(2)).collect();
            assert!(after.iter().all(|(_, e)| e.run() != first_run));

            let finished = world.signals().iter().find(|(_, e)| e.is_finished());
            assert_eq!(finished.map(|(at, _)| *at), Some(millis(6_750)));
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn stop_cancels_without_finishing() {
    Scenario::new("stop")
        .input(Duration::ZERO, "/login will")
        .input(secs(1), "HELLO")
        .input(secs(3), "/stop")
        .input(secs(30), "/quit")
        .oracle(Box::new(|world| {
            assert_eq!(world.finished_runs(), 0);
            assert!(world.signals().iter().all(|(at, _)| *at <= secs(3)));
            assert_eq!(world.app().view(), View::Feed);
            assert!(world.app().playback().is_none());
            Ok(())
        }))
        .run()
        .await
        .expect("scenario should succeed");
}

#[tokio::test]
async fn same_seed_same_session() {
    type Observed = (Vec<upside_harness::Frame>, Option<[GridPattern; 2]>);

    async fn observe(seed: u64) -> Observed {
        let (tx, rx) = std::sync::mpsc::channel();
        Scenario::new("determinism")
            .seed(seed)
            .input(Duration::ZERO, "/login will")
            .input(Duration::ZERO, "/mode grid")
            .input(secs(1), "SHOULD I STAY")
            .input(secs(5), "/quit")
            .oracle(Box::new(move |world| {
                let noise = world.app().playback().and_then(|p| p.noise.clone());
                tx.send((world.frames().to_vec(), noise)).map_err(|e| e.to_string())
            }))
            .run()
            .await
            .expect("scenario should succeed");
        rx.recv().expect("oracle ran")
    }

    let first = observe(3).await;
    assert!(first.1.is_some());
    assert_eq!(first, observe(3).await);
    assert_ne!(first.1, observe(4).await.1);
}
