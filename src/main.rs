// src/main.rs

use cng::errors::CngError;
use cng::{cli, config, logging, run, working_dir};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        if err.is_usage() {
            cli::usage_failure(&err.to_string());
        }
        eprintln!("cng error: {err}");
        std::process::exit(err.exit_code());
    }
}

async fn run_main() -> Result<(), CngError> {
    let args = cli::parse();
    let work_dir = working_dir()?;
    let cfg = config::load_and_validate(&args, &work_dir)?;
    logging::init_logging(args.log_level, cfg.verbose())?;
    run(cfg, work_dir).await
}
