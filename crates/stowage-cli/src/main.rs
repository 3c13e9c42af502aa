//! Thin entrypoint for the `stowage` binary.

#[tokio::main]
async fn main() {
    std::process::exit(stowage_cli::run().await);
}
