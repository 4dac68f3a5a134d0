use crate::error::AppError;
use crate::storage::KeyValueStorage;
use std::path::{Path, PathBuf};

pub const STORE_DIR_ENV_VAR: &str = "TASKLIST_STORE_DIR";
const APP_DIR_NAME: &str = "tasklist";

/// Keeps each slot in its own `<key>.json` file under one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn slot_path(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !valid {
            return Err(AppError::invalid_input(format!(
                "invalid storage key '{key}'"
            )));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.slot_path(key)?;
        std::fs::create_dir_all(&self.root)
            .map_err(|err| AppError::io(format!("{}: {}", self.root.display(), err)))?;
        std::fs::write(&path, value)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        Ok(())
    }
}

/// Resolves the storage directory: `TASKLIST_STORE_DIR`, then the configured
/// directory, then the per-user config directory.
pub fn store_dir(configured: Option<&Path>) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStorage, STORE_DIR_ENV_VAR, store_dir};
    use crate::storage::KeyValueStorage;
    use std::path::{Path, PathBuf};

    // The only test in this crate that touches STORE_DIR_ENV_VAR, so the
    // sequential set/remove calls below do not race other tests.
    #[test]
    fn store_dir_prefers_env_then_config() {
        let configured = Path::new("/cfg/tasklist");

        unsafe { std::env::remove_var(STORE_DIR_ENV_VAR) };
        assert_eq!(
            store_dir(Some(configured)).unwrap(),
            PathBuf::from("/cfg/tasklist")
        );

        unsafe { std::env::set_var(STORE_DIR_ENV_VAR, "  ") };
        assert_eq!(
            store_dir(Some(configured)).unwrap(),
            PathBuf::from("/cfg/tasklist")
        );

        unsafe { std::env::set_var(STORE_DIR_ENV_VAR, "/env/tasklist") };
        assert_eq!(
            store_dir(Some(configured)).unwrap(),
            PathBuf::from("/env/tasklist")
        );

        unsafe { std::env::remove_var(STORE_DIR_ENV_VAR) };
        if let Ok(fallback) = store_dir(None) {
            assert!(fallback.ends_with("tasklist"));
        }
    }

    #[test]
    fn missing_slot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.get("tasks").unwrap(), None);
    }

    #[test]
    fn set_creates_directory_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("store");
        let mut storage = FileStorage::new(&root);

        storage.set("tasks", "[]").unwrap();

        assert!(root.join("tasks.json").exists());
        assert_eq!(storage.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[cfg(unix)]
    #[test]
    fn set_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage.set("tasks", "[]").unwrap();

        let mode = std::fs::metadata(dir.path().join("tasks.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn rejects_keys_that_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        let err = storage.get("../tasks").unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
