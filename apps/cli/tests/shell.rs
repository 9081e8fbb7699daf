//! Tests for the terminal shell, driven by key events and a scripted model.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};
use savant_cli::shell::{Focus, Shell, render};
use savant_core::{Assistant, Phase, ShellConfig, Status, testing::Scripted};
use std::time::{Duration, Instant};

fn new_shell(model: Scripted) -> Shell<Scripted> {
    Shell::new(Assistant::new(model, ShellConfig::default()))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_text(shell: &mut Shell<Scripted>, text: &str) {
    for c in text.chars() {
        let code = if c == '\n' {
            KeyCode::Enter
        } else {
            KeyCode::Char(c)
        };
        shell.handle_key(key(code), Instant::now());
    }
}

/// Tick until the answer completes, advancing a fake clock past each period.
fn run_to_completion(shell: &mut Shell<Scripted>) {
    let mut now = Instant::now();
    let deadline = Instant::now() + Duration::from_secs(10);
    while shell.assistant().phase() != Phase::Complete {
        assert!(Instant::now() < deadline, "answer never completed");
        shell.tick(now);
        now += Duration::from_millis(100);
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn screen(shell: &Shell<Scripted>) -> String {
    screen_sized(shell, 100, 30)
}

fn screen_sized(shell: &Shell<Scripted>, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|frame| render(frame, shell)).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn typing_goes_to_the_focused_field() {
    let model = Scripted::new(["unused"]);
    let mut shell = new_shell(model);
    assert_eq!(shell.focus(), Focus::Expertise);

    type_text(&mut shell, "botany\nWhy are\nleaves green?");
    assert_eq!(shell.focus(), Focus::Question);
    assert_eq!(shell.assistant().form().expertise, "botany");
    assert_eq!(shell.assistant().form().question, "Why are\nleaves green?");

    shell.handle_key(key(KeyCode::Backspace), Instant::now());
    assert_eq!(shell.assistant().form().question, "Why are\nleaves green");

    shell.handle_key(key(KeyCode::Tab), Instant::now());
    assert_eq!(shell.focus(), Focus::Expertise);
}

#[test]
fn submit_streams_the_answer_into_the_response() {
    let model = Scripted::new(["Chloro", "phyll", " absorbs red."]);
    let mut shell = new_shell(model.clone());
    type_text(&mut shell, "botany\nWhy are leaves green?  ");

    shell.handle_key(ctrl('s'), Instant::now());
    assert_eq!(*shell.assistant().status(), Status::Generating);
    assert!(!shell.assistant().form().can_submit());

    run_to_completion(&mut shell);
    assert_eq!(
        shell.assistant().form().response(),
        "Chlorophyll absorbs red."
    );
    assert_eq!(*shell.assistant().status(), Status::Done);
    assert!(shell.assistant().form().can_submit());

    let received = model.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0][1].content, "Why are leaves green?");
}

#[test]
fn failure_is_shown_and_submit_re_enabled() {
    let model = Scripted::new(["partial"]).fail_with("out of memory");
    let mut shell = new_shell(model);
    type_text(&mut shell, "x\ny");
    shell.handle_key(key(KeyCode::F(5)), Instant::now());

    run_to_completion(&mut shell);
    assert_eq!(shell.assistant().form().response(), "partial");
    assert_eq!(
        *shell.assistant().status(),
        Status::Failed("out of memory".into())
    );
    assert!(shell.assistant().form().can_submit());
    assert!(screen(&shell).contains("error: out of memory"));
}

#[test]
fn reset_clears_everything_and_cancels() {
    let model = Scripted::new(["a"; 50]).delay(Duration::from_millis(20));
    let mut shell = new_shell(model);
    type_text(&mut shell, "history\nWho built Rome?");
    shell.handle_key(ctrl('s'), Instant::now());
    shell.tick(Instant::now());

    shell.handle_key(ctrl('r'), Instant::now());
    let form = shell.assistant().form();
    assert!(form.expertise.is_empty());
    assert!(form.question.is_empty());
    assert!(form.response().is_empty());
    assert!(form.can_submit());
    assert_eq!(shell.focus(), Focus::Expertise);
    assert_eq!(*shell.assistant().status(), Status::Ready);

    // idempotent
    shell.handle_key(ctrl('r'), Instant::now());
    assert!(shell.assistant().form().can_submit());
}

#[test]
fn quit_keys() {
    let mut shell = new_shell(Scripted::default());
    shell.handle_key(ctrl('c'), Instant::now());
    assert!(shell.should_quit());

    let mut shell = new_shell(Scripted::default());
    shell.handle_key(key(KeyCode::Esc), Instant::now());
    assert!(shell.should_quit());
}

#[test]
fn control_chords_are_not_typed() {
    let mut shell = new_shell(Scripted::default());
    shell.handle_key(ctrl('x'), Instant::now());
    assert!(shell.assistant().form().expertise.is_empty());
}

#[test]
fn scrolling_the_response() {
    let mut shell = new_shell(Scripted::default());
    shell.handle_key(key(KeyCode::PageUp), Instant::now());
    shell.handle_key(key(KeyCode::PageUp), Instant::now());
    assert_eq!(shell.scroll_back(), 10);
    shell.handle_key(key(KeyCode::PageDown), Instant::now());
    assert_eq!(shell.scroll_back(), 5);
    shell.handle_key(
        KeyEvent::new(KeyCode::End, KeyModifiers::CONTROL),
        Instant::now(),
    );
    assert_eq!(shell.scroll_back(), 0);
}

#[test]
fn screen_shows_fields_and_status() {
    let mut shell = new_shell(Scripted::default());
    type_text(&mut shell, "geology");
    let text = screen(&shell);
    assert!(text.contains("Expertise"));
    assert!(text.contains("Question"));
    assert!(text.contains("Response"));
    assert!(text.contains("geology"));
    assert!(text.contains("ready"));
}

#[test]
fn response_follows_the_newest_text() {
    let mut fragments = (0..400).map(|i| format!("abcdef{i} ")).collect::<Vec<_>>();
    fragments.push("LASTWORD".into());
    let mut shell = new_shell(Scripted::new(fragments));
    type_text(&mut shell, "x\ny");
    shell.handle_key(ctrl('s'), Instant::now());
    run_to_completion(&mut shell);

    assert_eq!(shell.scroll_back(), 0);
    let text = screen_sized(&shell, 45, 30);
    assert!(text.contains("LASTWORD"));
    assert!(!text.contains("abcdef0 "));

    // scrolled up, the newest word leaves the pane
    for _ in 0..4 {
        shell.handle_key(key(KeyCode::PageUp), Instant::now());
    }
    assert!(!screen_sized(&shell, 45, 30).contains("LASTWORD"));
}

#[test]
fn very_long_question_keeps_its_last_line_visible() {
    let mut shell = new_shell(Scripted::default());
    shell.handle_key(key(KeyCode::Tab), Instant::now());
    for _ in 0..70_000 {
        shell.handle_key(key(KeyCode::Enter), Instant::now());
    }
    type_text(&mut shell, "TAIL");

    assert!(screen(&shell).contains("TAIL"));
}
