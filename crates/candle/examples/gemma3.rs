use savant_candle::{Gemma3, ModelConfig};
use savant_core::{CancelToken, Generate, GenerationConfig, Prompt};
use std::io::Write;

fn main() -> anyhow::Result<()> {
    let model = Gemma3::load(&ModelConfig::default(), GenerationConfig::default())?;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }

        let prompt = Prompt::new("Rust", input);
        for fragment in model.start(&prompt.messages(), CancelToken::new())? {
            print!("{}", fragment?);
            std::io::stdout().flush()?;
        }
        println!();
    }
}
