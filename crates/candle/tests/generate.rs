//! Tests for the decoding loop, driven by a scripted forward step.

use candle_core::{Device, Tensor};
use parking_lot::Mutex;
use savant_candle::{Decoding, sample_len};
use savant_core::{CancelToken, GenerationConfig, TokenStream};
use std::sync::Arc;
use tokenizers::Tokenizer;

const TOKENIZER: &str = r#"{
    "version": "1.0",
    "truncation": null,
    "padding": null,
    "added_tokens": [],
    "normalizer": null,
    "pre_tokenizer": null,
    "post_processor": null,
    "decoder": null,
    "model": {
        "type": "WordLevel",
        "vocab": {"[UNK]": 0, "hello": 1, "world": 2, "<end_of_turn>": 3, "!": 4},
        "unk_token": "[UNK]"
    }
}"#;

const VOCAB: usize = 5;
const END_OF_TURN: u32 = 3;

/// What the forward step saw: the unseen tokens and their start position.
type Calls = Arc<Mutex<Vec<(Vec<u32>, usize)>>>;

/// Logits that make greedy sampling pick `token`.
fn one_hot(token: u32) -> Tensor {
    let mut logits = vec![0f32; VOCAB];
    logits[token as usize] = 10.0;
    Tensor::new(logits.as_slice(), &Device::Cpu).unwrap()
}

/// Run the loop on a generation thread and collect the text and the calls.
///
/// The i-th forward call picks `script[i]`, then the last entry forever.
fn decode(
    script: Vec<u32>,
    prompt: Vec<u32>,
    max_new_tokens: usize,
    cancel: CancelToken,
) -> (Vec<String>, Vec<(Vec<u32>, usize)>, usize) {
    let calls: Calls = Arc::default();
    let generated = Arc::new(Mutex::new(0));

    let (recorded, count) = (calls.clone(), generated.clone());
    let stream = TokenStream::spawn("decode-test", move |sink| {
        let tokenizer = Tokenizer::from_bytes(TOKENIZER).map_err(anyhow::Error::msg)?;
        let config = GenerationConfig::default().temperature(0.0);
        let stop = [END_OF_TURN];
        let forward = |input: &[u32], start_pos: usize| -> anyhow::Result<Tensor> {
            let mut calls = recorded.lock();
            let step = calls.len().min(script.len() - 1);
            calls.push((input.to_vec(), start_pos));
            Ok(one_hot(script[step]))
        };
        *count.lock() = Decoding::new(&tokenizer, &stop, &config).run(
            forward,
            prompt,
            max_new_tokens,
            &cancel,
            &sink,
        )?;
        Ok(())
    })
    .unwrap();

    let fragments = stream.collect::<anyhow::Result<Vec<_>>>().unwrap();
    let calls = calls.lock().clone();
    let generated = *generated.lock();
    (fragments, calls, generated)
}

#[test]
fn output_is_capped_by_the_token_budget() {
    let (fragments, calls, generated) = decode(vec![1], vec![2, 2], 4, CancelToken::new());
    assert_eq!(generated, 4);
    assert_eq!(calls.len(), 4);
    assert_eq!(fragments.concat(), "hello hello hello hello");
}

#[test]
fn prompt_goes_in_whole_then_one_token_at_a_time() {
    let (_, calls, _) = decode(vec![1, 2], vec![4, 4, 4], 3, CancelToken::new());
    assert_eq!(calls[0], (vec![4, 4, 4], 0));
    assert_eq!(calls[1], (vec![1], 3));
    assert_eq!(calls[2], (vec![2], 4));
}

#[test]
fn stop_token_ends_generation_and_is_not_emitted() {
    let (fragments, calls, generated) =
        decode(vec![1, 2, END_OF_TURN, 1], vec![2], 16, CancelToken::new());
    assert_eq!(generated, 2);
    assert_eq!(calls.len(), 3);
    assert_eq!(fragments.concat(), "hello world");
}

#[test]
fn held_back_text_is_flushed_at_the_end() {
    let (fragments, _, _) = decode(vec![1, 4, END_OF_TURN], vec![2], 16, CancelToken::new());
    assert_eq!(fragments, vec!["hello".to_string(), " !".to_string()]);
}

#[test]
fn cancelled_generation_yields_nothing() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let (fragments, calls, generated) = decode(vec![1], vec![2], 16, cancel);
    assert!(fragments.is_empty());
    assert!(calls.is_empty());
    assert_eq!(generated, 0);
}

#[test]
fn budget_respects_the_context_window() {
    assert_eq!(sample_len(8, 10, 384).unwrap(), 2);
    assert_eq!(sample_len(8, 4096, 384).unwrap(), 384);
    assert!(sample_len(10, 10, 384).is_err());
    assert!(sample_len(11, 10, 384).is_err());
}
