use sliver_core::error::Result;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// Which of `candidates` (absolute path strings) are textually referenced
/// by the subtree at `path`. File contents, symlink targets, and entry
/// names are all searched for the candidate bytes.
pub async fn filter_references(
    path: &str,
    candidates: &HashSet<String>,
) -> Result<HashSet<String>> {
    let mut found = HashSet::new();
    scan_root(Path::new(path), candidates, &mut found).await?;
    Ok(found)
}

async fn scan_root(
    path: &Path,
    candidates: &HashSet<String>,
    found: &mut HashSet<String>,
) -> Result<()> {
    if found.len() == candidates.len() {
        return Ok(());
    }
    let meta = fs::symlink_metadata(path).await?;
    if meta.is_symlink() {
        let target = fs::read_link(path).await?;
        search(target.as_os_str().as_encoded_bytes(), candidates, found);
    } else if meta.is_dir() {
        let mut entries = fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            search(entry.file_name().as_encoded_bytes(), candidates, found);
            Box::pin(scan_root(&entry.path(), candidates, found)).await?;
        }
    } else if meta.is_file() {
        let contents = fs::read(path).await?;
        search(&contents, candidates, found);
    }
    Ok(())
}

fn search(buff: &[u8], candidates: &HashSet<String>, found: &mut HashSet<String>) {
    for candidate in candidates {
        if found.contains(candidate) {
            continue;
        }
        if contains(buff, candidate.as_bytes()) {
            found.insert(candidate.clone());
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
