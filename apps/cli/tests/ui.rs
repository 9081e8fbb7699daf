//! Tests for the shell command outside the terminal.

use savant_candle::ModelConfig;
use savant_cli::{cmd::Ui, config::SavantConfig};

#[tokio::test]
async fn load_failure_is_reported_from_the_blocking_thread() {
    let dir = tempfile::tempdir().unwrap();
    let config = SavantConfig {
        model: ModelConfig::new(dir.path().join("absent")),
        ..Default::default()
    };

    let err = Ui.spawn(config).await.unwrap_err();
    assert!(err.to_string().contains("no repo is configured"));
}
