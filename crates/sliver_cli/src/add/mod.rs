use anyhow::Result;
use clap::Args;
use sliver_core::config::Config;
use sliver_core::expr::Expression;
use sliver_store::store::Store;
use tokio::fs;

#[derive(Args, Clone, Debug)]
pub struct AddArgs {
    /// File holding a printed expression term.
    pub file: String,
}

pub async fn add_cli(args: AddArgs) -> Result<()> {
    let store = Store::open(Config::new()).await?;
    let text = fs::read_to_string(&args.file).await?;
    let expr = Expression::parse(&text)?;
    let (id, path) = store.write_term(&expr, "").await?;
    println!("{id} {path}");
    Ok(())
}
