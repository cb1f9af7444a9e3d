use anyhow::Result;
use clap::Args;
use sliver_store::hash::hash_path;

#[derive(Args, Clone, Debug)]
pub struct HashArgs {
    /// File, directory, or symlink to fingerprint.
    pub path: String,
}

pub async fn hash_cli(args: HashArgs) -> Result<()> {
    let id = hash_path(&args.path).await?;
    println!("{id}");
    Ok(())
}
