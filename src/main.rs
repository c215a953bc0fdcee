use anyhow::Result;
use clap::Parser;
use htr_trainer::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("htr_trainer=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
