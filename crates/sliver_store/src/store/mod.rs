mod queries;

use log::debug;
use sliver_core::config::Config;
use sliver_core::error::{Error, Result};
use sliver_core::expr::{EXPR_EXT, Expression};
use sliver_core::hash::Id;
use sliver_core::system::System;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::path::Path;
use tokio::fs;

/// Facade over the store directory and its database: term storage, the
/// path→id map, and the successor index.
pub struct Store {
    config: Config,
    db: SqlitePool,
}

impl Store {
    /// Open the store, creating its directories and database on first
    /// use.
    pub async fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.store_dir).await?;
        fs::create_dir_all(&config.log_dir).await?;
        fs::create_dir_all(config.db_dir()).await?;
        let opts = SqliteConnectOptions::new()
            .filename(config.db_path())
            .create_if_missing(true);
        let db = SqlitePool::connect_with(opts).await?;
        queries::init_schema(&db).await?;
        Ok(Self { config, db })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn system(&self) -> &System {
        &self.config.system
    }

    /// Resolve an id to its stored term and the path it was read from.
    pub async fn term_from_id(&self, id: &Id) -> Result<(Expression, String)> {
        let Some(path) = self.find_source(id, None).await? else {
            return Err(Error::Store(format!("cannot find a term for id `{id}'")));
        };
        let text = fs::read_to_string(&path).await?;
        Ok((Expression::parse(&text)?, path))
    }

    /// Write a term's canonical form under its id and register the path.
    /// Rewriting an already-stored term leaves the store unchanged.
    pub async fn write_term(&self, expr: &Expression, suffix: &str) -> Result<(Id, String)> {
        let id = expr.id();
        let path = format!("{}/{id}{suffix}{EXPR_EXT}", self.config.store_dir);
        fs::write(&path, expr.to_string()).await?;
        self.register_path(&path, &id).await?;
        Ok((id, path))
    }

    pub async fn register_path(&self, path: &str, id: &Id) -> Result<()> {
        queries::upsert_path(&self.db, path, id).await
    }

    pub async fn path_id(&self, path: &str) -> Result<Option<Id>> {
        queries::path_id(&self.db, path).await
    }

    /// A dangling symlink still counts as present.
    pub fn path_exists(path: &str) -> bool {
        Path::new(path).symlink_metadata().is_ok()
    }

    /// Remove a path from the store directory and drop its mapping.
    pub async fn delete_path(&self, path: &str) -> Result<()> {
        if let Ok(meta) = fs::symlink_metadata(path).await {
            if meta.is_dir() {
                fs::remove_dir_all(path).await?;
            } else {
                fs::remove_file(path).await?;
            }
        }
        queries::delete_path(&self.db, path).await
    }

    /// Materialise the content identified by `id` at `target` by copying
    /// from any registered on-disk path that carries the id. Idempotent: a
    /// target already registered under `id` and present is left alone.
    pub async fn expand_id(&self, id: &Id, target: &str) -> Result<()> {
        if self.path_id(target).await?.as_ref() == Some(id) && Self::path_exists(target) {
            return Ok(());
        }
        let Some(source) = self.find_source(id, Some(target)).await? else {
            return Err(Error::Store(format!("cannot expand unknown id `{id}'")));
        };
        debug!("expanding {id} from {source} into {target}");
        copy_path(&source, target).await?;
        self.register_path(target, id).await?;
        Ok(())
    }

    async fn find_source(&self, id: &Id, skip: Option<&str>) -> Result<Option<String>> {
        for path in queries::paths_for_id(&self.db, id).await? {
            if skip == Some(path.as_str()) {
                continue;
            }
            if Self::path_exists(&path) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Record that `id`'s normal form, or a form closer to normal, is
    /// stored under `successor`.
    pub async fn register_successor(&self, id: &Id, successor: &Id) -> Result<()> {
        queries::upsert_successor(&self.db, id, successor).await
    }

    pub async fn query_successor(&self, id: &Id) -> Result<Option<Id>> {
        queries::successor(&self.db, id).await
    }
}

/// Copy a file, directory tree, or symlink, replacing `dst` if present.
pub(crate) async fn copy_path(src: &str, dst: &str) -> Result<()> {
    if let Ok(meta) = fs::symlink_metadata(dst).await {
        if meta.is_dir() {
            fs::remove_dir_all(dst).await?;
        } else {
            fs::remove_file(dst).await?;
        }
    }
    copy_all(Path::new(src), Path::new(dst)).await
}

async fn copy_all(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(src).await?;
    if meta.is_symlink() {
        let target = fs::read_link(src).await?;
        fs::symlink(target, dst).await?;
    } else if meta.is_dir() {
        fs::create_dir(dst).await?;
        let mut entries = fs::read_dir(src).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            Box::pin(copy_all(&entry.path(), &dst.join(&name))).await?;
        }
        fs::set_permissions(dst, meta.permissions()).await?;
    } else {
        fs::copy(src, dst).await?;
    }
    Ok(())
}
