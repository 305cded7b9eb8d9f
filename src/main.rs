/*
 * Responsibility
 * - tokio runtime start-up
 * - calls app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    yata_server::app::run().await
}
