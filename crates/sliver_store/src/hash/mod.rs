use sha2::{Digest, Sha256};
use sliver_core::error::{Error, Result};
use sliver_core::hash::{ID_LEN, Id};
use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::fs;

const DIR_MODE: u64 = 0o040755;
const FILE_MODE: u64 = 0o100644;
const EXEC_FILE_MODE: u64 = 0o100755;
const SYMLINK_MODE: u64 = 0o120000;

/// Content fingerprint of a filesystem subtree. Directory entries are
/// folded in name order together with a type tag, so the result does not
/// depend on readdir order or timestamps.
pub async fn hash_path<P>(path: P) -> Result<Id>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let Some(digest) = hash_root(path).await? else {
        return Err(Error::Store(format!(
            "cannot hash unknown file type at `{}'",
            path.display()
        )));
    };
    Ok(Id::from(digest))
}

async fn hash_root(path: &Path) -> Result<Option<[u8; ID_LEN]>> {
    let meta = fs::symlink_metadata(path).await?;
    Ok(if meta.is_symlink() {
        Some(hash_symlink(path).await?)
    } else if meta.is_dir() {
        Some(hash_dir(path).await?)
    } else if meta.is_file() {
        Some(hash_file(path).await?)
    } else {
        None
    })
}

async fn hash_file(path: &Path) -> Result<[u8; ID_LEN]> {
    let contents = fs::read(path).await?;
    Ok(Sha256::digest(&contents).into())
}

async fn hash_symlink(path: &Path) -> Result<[u8; ID_LEN]> {
    let target = fs::read_link(path).await?;
    Ok(Sha256::digest(target.as_os_str().as_encoded_bytes()).into())
}

async fn hash_dir(path: &Path) -> Result<[u8; ID_LEN]> {
    let mut entries = fs::read_dir(path).await?;
    let mut sorted = BTreeMap::new();
    while let Some(entry) = entries.next_entry().await? {
        sorted.insert(entry.file_name(), entry.path());
    }

    let mut hasher = Sha256::new();
    for (name, child) in sorted {
        let Some(digest) = Box::pin(hash_root(&child)).await? else {
            continue;
        };
        hasher.update(entry_mode(&child).await?.to_be_bytes());
        hasher.update((name.len() as u64).to_be_bytes());
        hasher.update(name.as_encoded_bytes());
        hasher.update(digest);
    }
    Ok(hasher.finalize().into())
}

async fn entry_mode(path: &Path) -> Result<u64> {
    let meta = fs::symlink_metadata(path).await?;
    Ok(if meta.is_symlink() {
        SYMLINK_MODE
    } else if meta.is_dir() {
        DIR_MODE
    } else if meta.permissions().mode() & 0o111 != 0 {
        EXEC_FILE_MODE
    } else {
        FILE_MODE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_hash_is_content_hash() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        std::fs::write(&a, "payload").unwrap();
        std::fs::write(&b, "payload").unwrap();
        assert_eq!(
            hash_path(&a).await.unwrap(),
            hash_path(&b).await.unwrap(),
            "same contents, same fingerprint, whatever the path"
        );
        assert_eq!(
            hash_path(&a).await.unwrap(),
            sliver_core::hash::hash_bytes(b"payload")
        );
    }

    #[tokio::test]
    async fn directory_hash_sees_names_and_contents() {
        let tmp = TempDir::new().unwrap();
        let d1 = tmp.path().join("d1");
        let d2 = tmp.path().join("d2");
        std::fs::create_dir(&d1).unwrap();
        std::fs::create_dir(&d2).unwrap();
        std::fs::write(d1.join("x"), "one").unwrap();
        std::fs::write(d2.join("x"), "one").unwrap();
        assert_eq!(hash_path(&d1).await.unwrap(), hash_path(&d2).await.unwrap());

        std::fs::write(d2.join("x"), "two").unwrap();
        assert_ne!(hash_path(&d1).await.unwrap(), hash_path(&d2).await.unwrap());

        std::fs::write(d2.join("x"), "one").unwrap();
        std::fs::rename(d2.join("x"), d2.join("y")).unwrap();
        assert_ne!(hash_path(&d1).await.unwrap(), hash_path(&d2).await.unwrap());
    }
}
