mod cli;

use std::process::ExitCode;

use fcx_lib::{FcxError, FigmaClient, FigmaMcpServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // The stdio transport owns stdout; every diagnostic goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let auth = match args.auth() {
        Some(auth) => auth,
        None => {
            eprintln!("{}", FcxError::MissingAuth);
            return ExitCode::from(2);
        }
    };

    let client = match FigmaClient::new(auth) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let server = FigmaMcpServer::new(
        client,
        args.output_format.into(),
        args.skip_image_downloads,
    );

    let result = if args.stdio {
        server.run_stdio().await
    } else {
        server.run_http(args.port).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}
