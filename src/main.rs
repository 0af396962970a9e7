use anyhow::Result;
use fin_snap::keys::KeyStore;
use fin_snap::sections::SectionStore;
use fin_snap::storage::{FileStore, KeyValueStore, MemoryStore};
use fin_snap::{logging, tui};
use std::sync::Arc;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let (store, storage_dir): (Arc<dyn KeyValueStore>, _) = match FileStore::open_default() {
        Some(file_store) => {
            let dir = file_store.dir().clone();
            (Arc::new(file_store), Some(dir))
        }
        // No config directory: settings simply don't survive the session.
        None => (Arc::new(MemoryStore::new()), None),
    };

    let _log_guard = logging::init(storage_dir.as_deref())?;

    let key_store = KeyStore::new(Arc::clone(&store));
    let section_store = SectionStore::new(store);

    let mut app = tui::App::new(key_store, section_store);
    tui::run(&mut app).await
}
