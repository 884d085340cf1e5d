//! Graph fixture for integration tests

use graphkv::{Document, GraphEnvironment, KvStore, Node, Session, StoreConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Test fixture with an isolated store and graph
pub struct GraphFixture {
    pub store: KvStore,
    pub env: Arc<GraphEnvironment>,
    graph_name: String,
    _temp_dir: Option<tempfile::TempDir>,
}

impl GraphFixture {
    /// Fixture over an in-memory store
    pub fn memory() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(StoreConfig::memory(), None)
    }

    /// Fixture over an in-memory store with a small scan chunk, so every
    /// cursor crosses several chunk boundaries
    pub fn chunked(chunk_size: usize) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config(
            StoreConfig::memory().with_scan_chunk_size(chunk_size),
            None,
        )
    }

    /// Fixture over a sled store in a fresh temporary directory
    pub fn sled() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let config = StoreConfig::sled(temp_dir.path().join("graphkv_test"))
            .with_flush_on_commit(false);
        Self::with_config(config, Some(temp_dir))
    }

    fn with_config(
        config: StoreConfig,
        temp_dir: Option<tempfile::TempDir>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        super::init_logging();
        let store = KvStore::open(config)?;
        // Unique graph name for isolation
        let graph_name = format!("test_graph_{}", fastrand::u64(..));
        let env = GraphEnvironment::open(&graph_name, &store)?;
        Ok(Self {
            store,
            env,
            graph_name,
            _temp_dir: temp_dir,
        })
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    pub fn session(&self) -> Session {
        self.env.open_session()
    }

    /// Close the store and open it again from disk
    ///
    /// Only meaningful for sled fixtures.
    pub fn reopen(self) -> Result<Self, Box<dyn std::error::Error>> {
        let GraphFixture {
            store,
            env,
            graph_name,
            _temp_dir,
        } = self;
        let config = store.config().clone();
        store.flush()?;
        drop(env);
        drop(store);

        let store = KvStore::open(config)?;
        let env = GraphEnvironment::open(&graph_name, &store)?;
        Ok(Self {
            store,
            env,
            graph_name,
            _temp_dir,
        })
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.store.config().path.clone()
    }

    /// Create and commit `count` nodes with an `n` property, returning them
    pub fn committed_nodes(&self, count: usize) -> Result<Vec<Node>, Box<dyn std::error::Error>> {
        let mut session = self.session();
        let mut nodes = Vec::with_capacity(count);
        for n in 0..count {
            nodes.push(session.create_node(Document::object([("n", n as i64)]))?);
        }
        session.save_changes()?;
        session.dispose();
        Ok(nodes)
    }
}
