#[tokio::main]
async fn main() {
    if let Err(e) = cert_tx_lookup::cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
