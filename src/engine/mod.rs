pub mod keymap;
pub mod runner;

pub use runner::Engine;

use crate::config::ClientConfig;

/// Runs the interactive client until the user quits. The terminal is
/// restored on every exit path, including errors.
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let mut engine = Engine::new(config)?;
    let mut terminal = ratatui::init();
    let result = engine.run(&mut terminal).await;
    ratatui::restore();
    result
}
