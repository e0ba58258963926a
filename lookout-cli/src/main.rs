use anyhow::Result;
use lookout_cli::app;

#[tokio::main]
async fn main() -> Result<()> {
    app::run().await
}
