use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = cors_relay::cli::Cli::parse();
    if let Err(e) = cors_relay::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
