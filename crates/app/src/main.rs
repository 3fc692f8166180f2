use app::config::{Args, Backend, prepare_sqlite_file, print_usage};
use services::{AppServices, Clock};
use storage::Storage;
use tokio::net::TcpListener;
use tracing::info;

async fn build_services(args: &Args) -> Result<AppServices, Box<dyn std::error::Error>> {
    let clock = Clock::system();
    let template = args.document_template();
    let services = match args.backend {
        Backend::Json => {
            info!(path = %args.data_file.display(), "using JSON document store");
            AppServices::new_json_file(args.data_file.clone(), clock, &template).await?
        }
        Backend::Sqlite => {
            // Open + migrate SQLite at startup. Keep this in the binary glue so services stay pure.
            prepare_sqlite_file(&args.db_url)?;
            info!(url = %args.db_url, "using SQLite document store");
            AppServices::new_sqlite(&args.db_url, clock, &template).await?
        }
        Backend::Memory => {
            info!("using in-memory document store; edits are lost on exit");
            AppServices::bootstrap(Storage::in_memory(), clock, &template).await?
        }
    };
    Ok(services)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
        .inspect_err(|e| {
            eprintln!("{e}");
            print_usage();
        })?
    else {
        print_usage();
        return Ok(());
    };

    let services = build_services(&args).await?;
    let app = app::router(services);

    let addr = args.listen_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
