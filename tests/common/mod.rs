//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test doubles used across
//! multiple integration test files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragline::adapters::embeddings::HashEmbeddingProvider;
use ragline::adapters::sqlite::{create_migrated_test_pool, initialize_database, SqliteChunkStore};
use ragline::domain::errors::{GenerationError, RagResult};
use ragline::domain::ports::GenerationProvider;
use ragline::services::RagService;
use tempfile::TempDir;

/// Dimension used by the offline hash embedder in tests.
pub const TEST_DIMENSION: usize = 256;

pub const CAPITALS: &str = "Paris is the capital of France. Berlin is the capital of Germany.";

/// Create a temporary test database
///
/// Returns the path to a SQLite database file in a temporary directory.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    (dir, db_path)
}

/// Open a migrated store over the database file at `path`.
pub async fn file_store(path: &std::path::Path) -> SqliteChunkStore {
    let pool = initialize_database(&format!("sqlite:{}", path.display()), None)
        .await
        .expect("Failed to initialize database");
    SqliteChunkStore::new(pool)
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Generator that records prompts and replies with a fixed answer or an upstream status.
pub struct ScriptedGenerator {
    reply: Result<String, (u16, String)>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn replying(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, message.to_string())),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts().pop().expect("generator was never called")
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> RagResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(answer) => Ok(answer.clone()),
            Err((status, message)) => Err(GenerationError::Status {
                status: *status,
                message: message.clone(),
            }
            .into()),
        }
    }
}

/// In-memory store plus a service wired with the hash embedder and `generator`.
pub async fn in_memory_service(generator: Arc<ScriptedGenerator>) -> (RagService, Arc<SqliteChunkStore>) {
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    let store = Arc::new(SqliteChunkStore::new(pool));
    let embedder = Arc::new(HashEmbeddingProvider::new(TEST_DIMENSION).expect("valid dimension"));
    let service = RagService::new(store.clone(), embedder, generator);
    (service, store)
}

/// Build an in-memory PDF with one line of Courier text per page.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encodable content")));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("PDF serializes");
    bytes
}
