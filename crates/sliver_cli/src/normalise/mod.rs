use anyhow::Result;
use clap::Args;
use sliver_core::config::Config;
use sliver_core::expr::Expression;
use sliver_core::hash::Id;
use sliver_store::normalise::normalise;
use sliver_store::store::Store;

#[derive(Args, Clone, Debug)]
pub struct NormaliseArgs {
    /// Id of the expression to normalise.
    pub id: String,
}

pub async fn normalise_cli(args: NormaliseArgs) -> Result<()> {
    let store = Store::open(Config::new()).await?;
    let id = Id::try_from(args.id.as_str())?;
    let slice = normalise(&store, id).await?;
    println!("{}", Expression::Slice(slice));
    Ok(())
}
