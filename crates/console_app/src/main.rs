mod platform;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = platform::Args::parse();
    console_logging::initialize(args.log.into(), args.log_level, args.log_file.as_deref());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let result = runtime.block_on(platform::run_app(args));
    // A pending stdin read would otherwise hold the process open until the next newline.
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}
