use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    immo_server::run().await
}
