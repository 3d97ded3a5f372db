use clap::Parser;
use weerdash::cli::{run, Cli};
use weerdash::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
