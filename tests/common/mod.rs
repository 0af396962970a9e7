//! Common test utilities: stores backed by in-memory storage and canned
//! search results.

use fin_snap::keys::{AiProvider, KeyStore};
use fin_snap::provider::StockSearchResult;
use fin_snap::sections::SectionStore;
use fin_snap::storage::{KeyValueStore, MemoryStore};
use std::sync::Arc;

/// Test fixture: one shared in-memory storage backend with both stores
/// attached, mirroring how the app wires them up.
pub struct TestFixture {
    pub backing: Arc<MemoryStore>,
    pub key_store: KeyStore,
    pub section_store: SectionStore,
}

impl TestFixture {
    pub fn new() -> Self {
        let backing = Arc::new(MemoryStore::new());
        let shared: Arc<dyn KeyValueStore> = backing.clone();
        let key_store = KeyStore::new(shared.clone());
        let section_store = SectionStore::new(shared);
        Self {
            backing,
            key_store,
            section_store,
        }
    }

    /// Seed a raw persisted value, as if written by an earlier session.
    pub fn seed(&self, key: &str, value: &str) {
        self.backing.set(key, value);
    }
}

/// A canned successful result, as an adapter would produce it.
pub fn canned_result(query: &str, provider: AiProvider) -> StockSearchResult {
    StockSearchResult {
        query: query.to_string(),
        provider,
        content: format!("## 📊 {query} 스냅샷"),
        created_at: chrono::Utc::now().to_rfc3339(),
        sources: None,
    }
}
