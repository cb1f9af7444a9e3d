use crate::store::Store;
use log::debug;
use sliver_core::error::{Error, Result};
use sliver_core::expr::Slice;

/// Ensure every element of the slice is installed at its path with its
/// declared content id.
pub async fn realise_slice(store: &Store, slice: &Slice) -> Result<()> {
    debug!("realising slice");

    if slice.elems.is_empty() {
        return Err(Error::EmptySlice);
    }

    // Perhaps every path already carries the right id.
    let mut missing = false;
    for elem in &slice.elems {
        match store.path_id(&elem.path).await? {
            Some(id) if id == elem.id => {}
            Some(_) => return Err(Error::PathObstructed(elem.path.clone())),
            None => {
                if Store::path_exists(&elem.path) {
                    // Something unregistered is squatting on the path.
                    return Err(Error::PathObstructed(elem.path.clone()));
                }
                missing = true;
                break;
            }
        }
    }

    if !missing {
        debug!("already installed");
        return Ok(());
    }

    // Expand every element; expansion is a no-op for the installed ones.
    for elem in &slice.elems {
        store.expand_id(&elem.id, &elem.path).await?;
    }
    Ok(())
}
