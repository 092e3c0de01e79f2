//! Jobs API - Entry Point

#[tokio::main]
async fn main() -> eyre::Result<()> {
    jobs_api::run().await
}
