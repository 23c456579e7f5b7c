use anyhow::Result;
use clap::Parser;

use ghcnd_cache::{
    app::load_config,
    cli::{handle_command, Cli},
    utils::init_logger,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Load configuration
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir = Some(dir.clone());
    }

    let all_ok = handle_command(&cli.command, &config, cli.verbose).await?;

    // Exit with appropriate code
    if !all_ok {
        std::process::exit(1);
    }

    Ok(())
}
