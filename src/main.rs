// src/main.rs

use std::process::ExitCode;

use vertexflow::errors::EngineError;
use vertexflow::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("vertexflow: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        // 130: interrupted by Ctrl-C.
        Err(err) if matches!(err.downcast_ref::<EngineError>(), Some(EngineError::Aborted)) => {
            eprintln!("vertexflow: run aborted");
            ExitCode::from(130)
        }
        Err(err) => {
            eprintln!("vertexflow error: {err:?}");
            ExitCode::FAILURE
        }
    }
}
