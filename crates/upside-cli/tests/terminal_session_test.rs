//! End-to-end terminal sessions.
//!
//! Runs the real runtime over an in-memory pipe on tokio's paused clock, so a
//! full transmission plays out without real waiting.

use std::{sync::Arc, time::Duration};

use tokio::io::{AsyncWriteExt, BufReader};
use upside_app::{App, AppAction, AppConfig, Command, Runtime, View};
use upside_cli::TerminalDriver;
use upside_core::env::SystemEnv;
use upside_store::MemoryStore;

#[tokio::test(start_paused = true)]
async fn color_transmission_plays_and_lands_in_feed() {
    let (reader, mut writer) = tokio::io::duplex(1024);
    let store = Arc::new(MemoryStore::new());
    let app = App::new(AppConfig::default(), SystemEnv::seeded(1));
    let driver = TerminalDriver::new(BufReader::new(reader), Vec::new());
    let runtime = Runtime::new(app, driver, store.clone());

    let typing = async move {
        writer.write_all(b"/login will\n/mode color\nA\n").await.unwrap();
        // "A" plays for 5.1 s; closing input afterwards quits.
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(writer);
    };

    let (result, ()) = tokio::join!(runtime.run(), typing);
    let (app, driver) = result.unwrap();
    let out = String::from_utf8(driver.into_output()).unwrap();

    assert_eq!(store.len("broadcast"), 1);
    assert_eq!(app.view(), View::Feed);
    assert_eq!(app.feed().len(), 1);
    assert!((95..=96).contains(&app.session().sanity()));

    assert!(out.contains("> IDENTIFY YOURSELF:"));
    assert!(out.contains("> SIGNAL TYPE: COLOR"));
    assert!(out.contains("> RECEIVING COLOR SIGNAL:"));
    assert_eq!(out.matches("[RED]").count(), 4);
    assert_eq!(out.matches("[CYAN]").count(), 4);
    assert_eq!(out.matches("-- END OF SIGNAL --").count(), 1);

    let end = out.find("-- END OF SIGNAL --").unwrap();
    let feed = out.rfind("> GLOBAL BROADCAST FEED (ALL USERS):").unwrap();
    assert!(feed > end);
    assert!(out[feed..].contains("1. will  SIGNAL: COLOR"));
}

#[tokio::test(start_paused = true)]
async fn stop_cuts_playback_short() {
    let (reader, mut writer) = tokio::io::duplex(1024);
    let store = Arc::new(MemoryStore::new());
    let app = App::new(AppConfig::default(), SystemEnv::new());
    let driver = TerminalDriver::new(BufReader::new(reader), Vec::new());
    let runtime = Runtime::new(app, driver, store);

    let typing = async move {
        writer.write_all(b"eleven\nHELLO\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        writer.write_all(b"/stop\n").await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(writer);
    };

    let (result, ()) = tokio::join!(runtime.run(), typing);
    let (app, driver) = result.unwrap();
    let out = String::from_utf8(driver.into_output()).unwrap();

    assert_eq!(app.user(), Some("eleven"));
    assert_eq!(app.view(), View::Feed);
    assert!(app.playback().is_none());
    assert!(!out.contains("-- END OF SIGNAL --"));
    let cues = out.matches("(#####)").count() + out.matches("(#)").count();
    assert!(cues > 0 && cues < 40);
}

#[tokio::test(start_paused = true)]
async fn closed_input_ends_session() {
    let input: &[u8] = b"/login will\n";
    let store = Arc::new(MemoryStore::new());
    let app = App::new(AppConfig::default(), SystemEnv::new());
    let driver = TerminalDriver::new(BufReader::new(input), Vec::new());

    let (app, driver) = Runtime::new(app, driver, store.clone()).run().await.unwrap();

    assert_eq!(app.view(), View::Compose);
    assert_eq!(store.subscriber_count(), 0);
    let out = String::from_utf8(driver.into_output()).unwrap();
    assert!(out.contains("ID: will"));
}

#[tokio::test(start_paused = true)]
async fn actions_from_before_the_runtime_are_executed() {
    let input: &[u8] = b"";
    let store = Arc::new(MemoryStore::new());
    let mut app = App::new(AppConfig::default(), SystemEnv::new());
    let mut startup = app.handle(Command::Login { user_id: "will".into() }.into());
    startup.extend(app.handle(Command::Message { content: "HI".into() }.into()));
    assert!(startup.iter().any(|a| matches!(a, AppAction::Append { .. })));

    let driver = TerminalDriver::new(BufReader::new(input), Vec::new());
    let mut runtime = Runtime::new(app, driver, store.clone());
    runtime.queue(startup);
    let (app, driver) = runtime.run().await.unwrap();

    assert_eq!(store.len("broadcast"), 1);
    assert_eq!(app.feed().len(), 1);
    let out = String::from_utf8(driver.into_output()).unwrap();
    assert!(out.contains("> RECEIVING MORSE SIGNAL:"));
}
