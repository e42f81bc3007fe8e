//! Title/post dialog against the mock backend.

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;

use common::{ACCESS_TOKEN, Harness, TEST_TIMEOUT};
use easygen::auth::SESSION_EXPIRED_MESSAGE;
use easygen::error::DialogError;
use easygen::generate::{DialogPhase, EXAMPLE_TITLES, PostLine};

const TITLE: &str = "Why Most LinkedIn Posts Fail";

#[tokio::test]
async fn generate_shows_exactly_the_returned_post() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        let seen = Arc::new(Mutex::new(Vec::<(String, String)>::new()));
        let sink = Arc::clone(&seen);
        let dialog = h.app.generation_dialog(Some(Box::new(move |title: &str, body: &str| {
            sink.lock().unwrap().push((title.to_string(), body.to_string()));
        })));

        dialog.set_title(TITLE).await;
        let post = dialog.generate().await.unwrap();

        let expected = format!("Variation 1: {TITLE}\n\nThanks for reading!");
        assert_eq!(post.body, expected);
        assert_eq!(dialog.phase().await, DialogPhase::Post);
        assert_eq!(dialog.post().await.unwrap().body, expected);
        assert_eq!(
            h.backend.last_generate_auth.lock().unwrap().as_deref(),
            Some(format!("Bearer {ACCESS_TOKEN}").as_str())
        );
        assert_eq!(
            seen.lock().unwrap().clone(),
            vec![(TITLE.to_string(), expected)]
        );
        assert_eq!(
            dialog.formatted_post().await,
            vec![
                PostLine::Text(format!("Variation 1: {TITLE}")),
                PostLine::Gap,
                PostLine::Text("Thanks for reading!".into()),
            ]
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn generate_without_token_makes_no_call() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::start().await;
        let dialog = h.app.generation_dialog(None);
        dialog.set_title(TITLE).await;

        let err = dialog.generate().await.unwrap_err();
        assert!(matches!(err, DialogError::NotLoggedIn));
        assert_eq!(h.backend.total_hits(), 0);
        assert_eq!(h.messages(), vec!["Please log in to generate posts"]);
        assert_eq!(dialog.phase().await, DialogPhase::Title);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failed_generate_stays_on_title() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        h.backend.fail_generate.store(true, Ordering::SeqCst);
        let dialog = h.app.generation_dialog(None);
        dialog.set_title(TITLE).await;

        let err = dialog.generate().await.unwrap_err();
        assert!(matches!(err, DialogError::Api(_)));
        assert_eq!(dialog.phase().await, DialogPhase::Title);
        assert!(dialog.post().await.is_none());
        assert!(!dialog.is_generating());
        assert_eq!(
            h.messages(),
            vec!["Failed to generate post. Please try again."]
        );
        assert!(h.app.session().is_authenticated().await);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn regenerate_replaces_body_in_place() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        let dialog = h.app.generation_dialog(None);
        dialog.select_suggestion(3).await.unwrap();
        dialog.generate().await.unwrap();

        // Editing the title afterwards does not change what is regenerated.
        dialog.set_title("Something else").await;
        let post = dialog.regenerate().await.unwrap();

        assert_eq!(post.title, EXAMPLE_TITLES[3]);
        assert!(post.body.starts_with("Variation 2:"));
        assert_eq!(dialog.phase().await, DialogPhase::Post);
        assert_eq!(h.messages(), vec!["Generated a new post variation"]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failed_regenerate_keeps_previous_post() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        let dialog = h.app.generation_dialog(None);
        dialog.set_title(TITLE).await;
        let first = dialog.generate().await.unwrap();

        h.backend.fail_generate.store(true, Ordering::SeqCst);
        let err = dialog.regenerate().await.unwrap_err();
        assert!(matches!(err, DialogError::Api(_)));

        assert_eq!(dialog.phase().await, DialogPhase::Post);
        assert_eq!(dialog.post().await, Some(first));
        assert!(!dialog.is_regenerating());
        assert_eq!(
            h.messages(),
            vec!["Failed to regenerate post. Please try again."]
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn expired_token_during_generate_ends_session() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        h.backend.expire_tokens();
        let dialog = h.app.generation_dialog(None);
        dialog.set_title(TITLE).await;

        let err = dialog.generate().await.unwrap_err();
        assert!(matches!(err, DialogError::SessionExpired));
        assert!(h.app.session().snapshot().await.is_cleared());
        assert_eq!(h.messages(), vec![SESSION_EXPIRED_MESSAGE]);
        assert_eq!(dialog.phase().await, DialogPhase::Title);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn copy_back_and_close() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        let dialog = h
            .app
            .generation_dialog(None)
            .with_copied_indicator(Duration::from_millis(100));
        dialog.set_title(TITLE).await;
        let post = dialog.generate().await.unwrap();

        dialog.copy_to_clipboard().await.unwrap();
        assert_eq!(h.clipboard.contents(), Some(post.body.clone()));
        assert!(dialog.is_copied().await);
        assert_eq!(h.messages(), vec!["Post copied to clipboard"]);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!dialog.is_copied().await);

        dialog.back_to_title().await;
        assert_eq!(dialog.phase().await, DialogPhase::Title);
        assert_eq!(dialog.title().await, TITLE);
        assert!(dialog.post().await.is_some());

        dialog.close().await;
        let state = dialog.state().await;
        assert_eq!(state.phase, DialogPhase::Title);
        assert!(state.post.is_none());
        assert_eq!(state.title, TITLE);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn concurrent_generate_is_rejected_while_in_flight() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        let dialog = h.app.generation_dialog(None);
        dialog.set_title(TITLE).await;

        let (a, b) = tokio::join!(dialog.generate(), dialog.generate());
        let busy = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(DialogError::Busy(_))))
            .count();
        assert_eq!(busy, 1, "results: {a:?} / {b:?}");
        assert!(a.is_ok() || b.is_ok());

        assert_eq!(h.backend.generated.load(Ordering::SeqCst), 1);
        assert_eq!(dialog.phase().await, DialogPhase::Post);
        assert!(!dialog.is_generating());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn expired_token_during_regenerate_ends_session() {
    timeout(TEST_TIMEOUT, async {
        let h = Harness::logged_in().await;
        let dialog = h.app.generation_dialog(None);
        dialog.set_title(TITLE).await;
        let first = dialog.generate().await.unwrap();

        h.backend.expire_tokens();
        let err = dialog.regenerate().await.unwrap_err();
        assert!(matches!(err, DialogError::SessionExpired));

        assert!(h.app.session().snapshot().await.is_cleared());
        assert_eq!(h.messages(), vec![SESSION_EXPIRED_MESSAGE]);
        assert_eq!(dialog.post().await, Some(first));
        assert!(!dialog.is_regenerating());
    })
    .await
    .expect("test timed out");
}
