use clap::Parser;

use course_sync::{run, Cli};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) if report.failed == 0 => std::process::exit(0),
        Ok(report) => {
            // Completed, but some items failed to transfer.
            eprintln!("Completed with {} failed transfers", report.failed);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("[ERROR] Synchronisation failed: {}", e);
            std::process::exit(1);
        }
    }
}
