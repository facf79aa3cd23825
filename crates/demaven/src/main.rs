use demaven::{Args, DemavenError, USAGE};
use demaven_ivy::IvyError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::parse(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    if args.help {
        print!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let mut stdout = std::io::stdout().lock();
    match demaven::run(&args, &mut stdout).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(DemavenError::Ivy(IvyError::MissingDependencies { marker, missing })) => {
            tracing::error!("Unresolved dependencies for {}", marker);
            for dependency in &missing {
                tracing::error!(" -> {}", dependency.identifier());
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
