use crate::store::MemoryStore;

/// Shared state handed to every handler as `State<Arc<AppState>>`
#[derive(Debug, Default)]
pub struct AppState {
    pub store: MemoryStore,
}

impl AppState {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// State preloaded with the demo transactions
    pub fn with_demo_data() -> Self {
        Self::new(MemoryStore::with_demo_data())
    }
}
