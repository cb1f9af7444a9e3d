use log::debug;
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use std::fs::{self, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const NUM_RAND_CHARS: usize = 12;

fn tmpname() -> String {
    let rand: String = (0..NUM_RAND_CHARS)
        .map(|_| rng().sample(Alphanumeric) as char)
        .collect();
    format!("sliver-{}-{}", std::process::id(), rand)
}

/// Private working directory, removed on every exit path once the guard
/// drops.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn create_in<P>(root: P) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = root.as_ref().join(tmpname());
        fs::create_dir(&path)?;
        fs::set_permissions(&path, Permissions::from_mode(0o777))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.path) {
            debug!(
                "cannot remove working directory {}: {err}",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop() {
        let root = tempfile::TempDir::new().unwrap();
        let kept;
        {
            let tmp = TempDir::create_in(root.path()).unwrap();
            kept = tmp.path().to_path_buf();
            assert!(kept.is_dir());
        }
        assert!(!kept.exists());
    }

    #[test]
    fn names_are_unique() {
        let root = tempfile::TempDir::new().unwrap();
        let a = TempDir::create_in(root.path()).unwrap();
        let b = TempDir::create_in(root.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
