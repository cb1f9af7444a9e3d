use sliver_core::error::Result;
use sliver_core::hash::Id;
use sqlx::SqlitePool;

pub(super) async fn init_schema(db: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS path_to_id (
            path TEXT PRIMARY KEY,
            id TEXT NOT NULL
        )",
    )
    .execute(db)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS path_to_id_by_id ON path_to_id (id)")
        .execute(db)
        .await?;
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS successor (
            expr TEXT PRIMARY KEY,
            succ TEXT NOT NULL
        )",
    )
    .execute(db)
    .await?;
    Ok(())
}

pub(super) async fn upsert_path(db: &SqlitePool, path: &str, id: &Id) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO path_to_id (path, id) VALUES (?, ?)")
        .bind(path)
        .bind(*id)
        .execute(db)
        .await?;
    Ok(())
}

pub(super) async fn path_id(db: &SqlitePool, path: &str) -> Result<Option<Id>> {
    let row: Option<(Id,)> = sqlx::query_as("SELECT id FROM path_to_id WHERE path = ?")
        .bind(path)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|(id,)| id))
}

pub(super) async fn paths_for_id(db: &SqlitePool, id: &Id) -> Result<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT path FROM path_to_id WHERE id = ? ORDER BY path")
            .bind(*id)
            .fetch_all(db)
            .await?;
    Ok(rows.into_iter().map(|(path,)| path).collect())
}

pub(super) async fn delete_path(db: &SqlitePool, path: &str) -> Result<()> {
    sqlx::query("DELETE FROM path_to_id WHERE path = ?")
        .bind(path)
        .execute(db)
        .await?;
    Ok(())
}

pub(super) async fn upsert_successor(db: &SqlitePool, expr: &Id, succ: &Id) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO successor (expr, succ) VALUES (?, ?)")
        .bind(*expr)
        .bind(*succ)
        .execute(db)
        .await?;
    Ok(())
}

pub(super) async fn successor(db: &SqlitePool, expr: &Id) -> Result<Option<Id>> {
    let row: Option<(Id,)> = sqlx::query_as("SELECT succ FROM successor WHERE expr = ?")
        .bind(*expr)
        .fetch_optional(db)
        .await?;
    Ok(row.map(|(id,)| id))
}
