//! Tests for the one-shot answer printer.

use savant_cli::cmd::ask::stream_to_terminal;
use savant_core::{Prompt, Submission, testing::Scripted};
use std::time::Duration;

#[tokio::test]
async fn answer_is_printed_as_it_streams() {
    let model = Scripted::new(["Magma ", "rises ", "because it is buoyant."])
        .delay(Duration::from_millis(2));
    let prompt = Prompt::new("volcanology", "Why do volcanoes erupt?");
    let submission = Submission::start(&model, &prompt).unwrap();

    let mut out = Vec::new();
    stream_to_terminal(submission, &mut out).await.unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Magma rises because it is buoyant.\n"
    );
}

#[tokio::test]
async fn failure_keeps_the_partial_answer() {
    let model = Scripted::new(["Half an "]).fail_with("device lost");
    let submission = Submission::start(&model, &Prompt::new("x", "y")).unwrap();

    let mut out = Vec::new();
    let err = stream_to_terminal(submission, &mut out).await.unwrap_err();
    assert_eq!(err.to_string(), "device lost");
    assert_eq!(String::from_utf8(out).unwrap(), "Half an \n");
}

#[tokio::test]
async fn empty_answer_prints_a_newline() {
    let model = Scripted::default();
    let submission = Submission::start(&model, &Prompt::new("x", "y")).unwrap();

    let mut out = Vec::new();
    stream_to_terminal(submission, &mut out).await.unwrap();
    assert_eq!(out, b"\n");
}

#[tokio::test]
async fn long_answers_stream_back_to_back() {
    let words = (0..500).map(|i| format!("w{i} ")).collect::<Vec<_>>();
    let expected = format!("{}\n", words.concat());

    for _ in 0..2 {
        let model = Scripted::new(words.clone());
        let submission = Submission::start(&model, &Prompt::new("x", "y")).unwrap();
        let mut out = Vec::new();
        stream_to_terminal(submission, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
