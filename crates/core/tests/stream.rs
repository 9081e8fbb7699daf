//! Tests for token streams and cancellation.

use savant_core::{CancelToken, Generate, Message, TokenStream, testing::Scripted};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

#[test]
fn spawned_stream_yields_pushed_fragments() {
    let stream = TokenStream::spawn("test-gen", |sink| {
        for fragment in ["a", "b", "c"] {
            sink.push(fragment);
        }
        Ok(())
    })
    .unwrap();

    let fragments: Vec<String> = stream.map(Result::unwrap).collect();
    assert_eq!(fragments, ["a", "b", "c"]);
}

#[test]
fn generation_error_is_the_last_item() {
    let mut stream = TokenStream::spawn("test-gen", |sink| {
        sink.push("a");
        anyhow::bail!("malformed chat input")
    })
    .unwrap();

    assert_eq!(stream.next().unwrap().unwrap(), "a");
    let err = stream.next().unwrap().unwrap_err();
    assert!(err.to_string().contains("malformed chat input"));
    assert!(stream.next().is_none());
}

#[test]
fn generation_panic_surfaces_as_error() {
    let mut stream =
        TokenStream::spawn("test-gen", |_sink| -> anyhow::Result<()> { panic!("boom") }).unwrap();
    assert!(stream.next().unwrap().is_err());
    assert!(stream.next().is_none());
}

#[test]
fn dropping_stream_stops_generation() {
    let pushed = Arc::new(AtomicUsize::new(0));
    let counter = pushed.clone();
    let mut stream = TokenStream::spawn("test-gen", move |sink| {
        while sink.push("tick") {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    })
    .unwrap();

    assert!(stream.next().is_some());
    // joins the generation thread, which only returns once the push fails
    drop(stream);
    let after_drop = pushed.load(Ordering::SeqCst);
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(pushed.load(Ordering::SeqCst), after_drop);
}

#[test]
fn cancel_token_is_shared() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());
    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn scripted_stops_when_cancelled() {
    let generator = Scripted::new(["a", "b", "c", "d"]).delay(Duration::from_millis(20));
    let cancel = CancelToken::new();
    let mut stream = generator
        .start(&[Message::user("hi")], cancel.clone())
        .unwrap();

    assert_eq!(stream.next().unwrap().unwrap(), "a");
    cancel.cancel();
    let rest: Vec<_> = stream.collect();
    assert!(rest.len() < 3);
}

#[test]
fn scripted_refusal_fails_start() {
    let generator = Scripted::new(["a"]).refuse("no model");
    let err = generator
        .start(&[Message::user("hi")], CancelToken::new())
        .err()
        .unwrap();
    assert!(err.to_string().contains("no model"));
    assert!(generator.received().is_empty());
}
