use anyhow::Result;
use clap::Args;
use sliver_core::config::Config;
use sliver_core::hash::Id;
use sliver_store::normalise::normalise;
use sliver_store::realise::realise_slice;
use sliver_store::store::Store;

#[derive(Args, Clone, Debug)]
pub struct RealiseArgs {
    /// Id of the expression to normalise and install.
    pub id: String,
}

pub async fn realise_cli(args: RealiseArgs) -> Result<()> {
    let store = Store::open(Config::new()).await?;
    let id = Id::try_from(args.id.as_str())?;
    let slice = normalise(&store, id).await?;
    realise_slice(&store, &slice).await?;
    for elem in &slice.elems {
        println!("{}", elem.path);
    }
    Ok(())
}
