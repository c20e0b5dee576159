use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use models::VoterSet;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use super::VoterStore;
use crate::errors::StoreError;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// JSON file-backed voter ledger.
///
/// The file holds a pretty-printed array of voter records. Saves go to a
/// temporary sibling file which is fsynced and then renamed over the ledger,
/// so a crash mid-write leaves the previous ledger intact.
#[derive(Clone, Debug)]
pub struct JsonVoterStore {
    file_path: PathBuf,
}

impl JsonVoterStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    fn parent_dir(&self) -> PathBuf {
        match self.file_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voters".to_string());
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.parent_dir().join(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }

    fn write_err(&self, what: &str, e: impl std::fmt::Display) -> StoreError {
        StoreError::StorageWriteError(format!("{what} {}: {e}", self.file_path.display()))
    }

    /// First half of a save: the full payload lands in a synced temp file.
    pub(crate) async fn write_temp(&self, data: &[u8]) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(self.parent_dir())
            .await
            .map_err(|e| self.write_err("create directory for", e))?;
        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp).await.map_err(|e| self.write_err("create temp file for", e))?;
        let written = async {
            file.write_all(data).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(self.write_err("write temp file for", e));
        }
        Ok(tmp)
    }

    /// Second half: atomically swap the temp file in.
    pub(crate) async fn commit(&self, tmp: PathBuf) -> Result<(), StoreError> {
        if let Err(e) = fs::rename(&tmp, &self.file_path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(self.write_err("replace", e));
        }
        // Persist the rename itself; not every platform lets us open a directory.
        match fs::File::open(self.parent_dir()).await {
            Ok(dir) => {
                if let Err(e) = dir.sync_all().await {
                    debug!(error = %e, "directory fsync not supported");
                }
            }
            Err(e) => debug!(error = %e, "cannot open ledger directory for fsync"),
        }
        Ok(())
    }
}

#[async_trait]
impl VoterStore for JsonVoterStore {
    async fn load(&self) -> Result<VoterSet, StoreError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.file_path.display().to_string()));
            }
            Err(e) => {
                return Err(StoreError::StorageUnavailable(format!("{}: {e}", self.file_path.display())));
            }
        };
        serde_json::from_slice::<VoterSet>(&bytes)
            .map_err(|e| StoreError::CorruptData(format!("{}: {e}", self.file_path.display())))
    }

    async fn save(&self, voters: &VoterSet) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(voters).map_err(|e| self.write_err("serialize", e))?;
        let tmp = self.write_temp(&data).await?;
        self.commit(tmp).await?;
        debug!(path = %self.file_path.display(), voters = voters.len(), "voter ledger saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.file_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{VoteTimestamp, VoterRecord};
    use std::path::Path;

    fn tmp_ledger(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("voter_store_{tag}_{}", uuid::Uuid::new_v4()))
            .join("voters.json")
    }

    fn sample() -> VoterSet {
        VoterSet::from_records(vec![
            VoterRecord::new("A1", "Asha", "f1.jpg"),
            VoterRecord::new("B2", "Bala", "f2.png"),
        ])
        .unwrap()
    }

    async fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir).await;
        }
    }

    #[tokio::test]
    async fn save_then_load_round_trips() -> Result<(), anyhow::Error> {
        let path = tmp_ledger("roundtrip");
        let store = JsonVoterStore::new(&path);
        let mut set = sample();
        set.record_vote("B2", "NOTA", VoteTimestamp::now())?;
        store.save(&set).await?;

        // a fresh handle plays the part of a restarted process
        let reloaded = JsonVoterStore::new(&path).load().await?;
        assert_eq!(reloaded, set);
        assert!(reloaded.get("B2").unwrap().has_voted());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_reported_not_empty() {
        let path = tmp_ledger("missing");
        let err = JsonVoterStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Missing(_)));
    }

    #[tokio::test]
    async fn garbage_is_corrupt_data() -> Result<(), anyhow::Error> {
        let path = tmp_ledger("garbage");
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, b"[{\"id\": \"A1\", \"fingerprint_ref\": ").await?;
        let err = JsonVoterStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptData(_)));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_fingerprint_on_disk_is_corrupt_data() -> Result<(), anyhow::Error> {
        let path = tmp_ledger("dupfp");
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(
            &path,
            br#"[{"id":"A1","fingerprint_ref":"f.jpg"},{"id":"A2","fingerprint_ref":"f.jpg"}]"#,
        )
        .await?;
        let err = JsonVoterStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptData(_)));
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_array_is_a_genuinely_empty_ledger() -> Result<(), anyhow::Error> {
        let path = tmp_ledger("empty");
        fs::create_dir_all(path.parent().unwrap()).await?;
        fs::write(&path, b"[]").await?;
        let set = JsonVoterStore::new(&path).load().await?;
        assert!(set.is_empty());
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn crash_before_rename_keeps_previous_ledger() -> Result<(), anyhow::Error> {
        let path = tmp_ledger("crash");
        let store = JsonVoterStore::new(&path);
        let old = sample();
        store.save(&old).await?;

        // New contents fully written to the temp file but never committed.
        let mut new = old.clone();
        new.record_vote("A1", "Candidate A", VoteTimestamp::now())?;
        let data = serde_json::to_vec_pretty(&new)?;
        let _tmp = store.write_temp(&data).await?;
        assert_eq!(store.load().await?, old);

        // A torn temp file left next to the ledger is ignored as well.
        fs::write(path.parent().unwrap().join(".voters.json.torn.tmp"), &data[..data.len() / 2]).await?;
        assert_eq!(store.load().await?, old);

        // Completing a save afterwards yields exactly the new state.
        store.save(&new).await?;
        assert_eq!(store.load().await?, new);
        cleanup(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_into_unwritable_location_is_write_error() -> Result<(), anyhow::Error> {
        let path = tmp_ledger("unwritable");
        let dir = path.parent().unwrap().to_path_buf();
        fs::create_dir_all(&dir).await?;
        // The ledger path is a directory, so the final rename must fail.
        fs::create_dir_all(&path).await?;
        fs::write(path.join("keep"), b"x").await?;
        let err = JsonVoterStore::new(&path).save(&sample()).await.unwrap_err();
        assert!(matches!(err, StoreError::StorageWriteError(_)));
        // no temp files left behind
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            assert!(!entry.file_name().to_string_lossy().ends_with(".tmp"));
        }
        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
