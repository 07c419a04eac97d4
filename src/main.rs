use daterange_filter::{cli_parse, run};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DATERANGE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_env_filter(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = cli_parse();
    run(&cli)
}
