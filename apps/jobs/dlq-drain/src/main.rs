//! Dead-letter drain - Entry Point

#[tokio::main]
async fn main() -> eyre::Result<()> {
    jobs_dlq_drain::run().await
}
