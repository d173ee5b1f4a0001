//! Collection processing pipeline
//!
//! Embeds the query, parses and embeds every document on a bounded pool of
//! blocking tasks, ranks all sections globally and builds the report.

use crate::config::Settings;
use crate::error::{PipelineError, PipelineResult};
use crate::input::Collection;
use crate::parser::parse_document;
use crate::report::{Report, ReportBuilder};
use docrank_core::{Chunker, Document, RankingEngine, VectorEngine};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// A document left out of the run, with the reason
pub type SkippedDocument = (PathBuf, String);

/// Runs a collection through parsing, embedding, ranking and reporting
pub struct Pipeline {
    settings: Settings,
    vectors: Arc<VectorEngine>,
    chunker: Arc<Chunker>,
    ranking: RankingEngine,
}

impl Pipeline {
    /// Create a pipeline with the embedder described by `settings`
    ///
    /// # Errors
    /// Returns error if the settings are invalid or the embedder fails to load.
    pub fn new(settings: Settings) -> PipelineResult<Self> {
        let embedder = settings.embedding.build_embedder()?;
        let vectors = Arc::new(VectorEngine::new(embedder)?);
        Self::with_vector_engine(settings, vectors)
    }

    /// Create a pipeline sharing an existing vector engine
    pub fn with_vector_engine(settings: Settings, vectors: Arc<VectorEngine>) -> PipelineResult<Self> {
        settings.validate()?;
        let ranking = RankingEngine::new(settings.ranking.clone())?;
        let chunker = Arc::new(Chunker::new(settings.chunking.clone()));

        tracing::info!(
            "Pipeline ready (embedder: {}, {}d, workers: {})",
            vectors.model_name(),
            vectors.dimension(),
            settings.workers
        );

        Ok(Self {
            settings,
            vectors,
            chunker,
            ranking,
        })
    }

    /// Process a collection into a report, within the configured time budget
    pub async fn run(&self, collection: &Collection) -> PipelineResult<Report> {
        match self.settings.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), self.run_inner(collection))
                .await
                .map_err(|_| PipelineError::Timeout(secs))?,
            None => self.run_inner(collection).await,
        }
    }

    async fn run_inner(&self, collection: &Collection) -> PipelineResult<Report> {
        let paths = collection.document_paths()?;
        let input_documents: Vec<String> = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();

        // Query embedding
        let query_text = collection.query();
        let vectors = Arc::clone(&self.vectors);
        let query = tokio::task::spawn_blocking(move || vectors.embed_query(&query_text))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;

        let documents = self.process_documents(paths).await?;
        if documents.is_empty() {
            tracing::warn!("No document could be processed; the report will be empty");
        }

        let ranked = self.ranking.rank_sections_globally(documents, &query)?;
        let analysis = self.ranking.perform_sub_section_analysis(&ranked);

        Ok(
            ReportBuilder::new(input_documents, collection.persona(), collection.job_to_be_done())
                .extracted_sections_limit(self.settings.extracted_sections_limit)
                .build(&ranked, &analysis),
        )
    }

    /// Parse, chunk and embed documents concurrently.
    ///
    /// Documents that fail are logged and left out. The result follows the
    /// order of `paths` regardless of completion order.
    pub async fn process_documents(&self, paths: Vec<PathBuf>) -> PipelineResult<Vec<Document>> {
        let (documents, skipped) = self.process_documents_with_skips(paths).await?;
        for (path, reason) in &skipped {
            tracing::warn!("Skipping {}: {}", path.display(), reason);
        }
        Ok(documents)
    }

    async fn process_documents_with_skips(
        &self,
        paths: Vec<PathBuf>,
    ) -> PipelineResult<(Vec<Document>, Vec<SkippedDocument>)> {
        let semaphore = Arc::new(Semaphore::new(self.settings.workers.max(1)));
        let mut tasks = JoinSet::new();
        // Task id -> document, so a panicked worker can still be named
        let mut task_paths = HashMap::new();

        for (index, path) in paths.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| PipelineError::Task(e.to_string()))?;
            let vectors = Arc::clone(&self.vectors);
            let chunker = Arc::clone(&self.chunker);
            let task_path = path.clone();

            let handle = tasks.spawn_blocking(move || {
                let _permit = permit;
                let result = process_document(&path, &vectors, &chunker);
                (index, path, result)
            });
            task_paths.insert(handle.id(), task_path);
        }

        let mut documents = Vec::new();
        let mut skipped = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(document))) => documents.push((index, document)),
                Ok((_, path, Err(e))) => skipped.push((path, e.to_string())),
                Err(e) => match task_paths.remove(&e.id()) {
                    Some(path) => skipped.push((path, worker_failure(&e))),
                    None => tracing::error!("Document task failed: {}", e),
                },
            }
        }

        documents.sort_by_key(|(index, _)| *index);
        let documents = documents.into_iter().map(|(_, doc)| doc).collect();
        Ok((documents, skipped))
    }
}

fn worker_failure(error: &JoinError) -> String {
    if error.is_panic() {
        "worker panicked".to_string()
    } else {
        "worker cancelled".to_string()
    }
}

/// Parse one document and attach embedded chunks to every section
pub fn process_document(
    path: &Path,
    vectors: &VectorEngine,
    chunker: &Chunker,
) -> PipelineResult<Document> {
    let mut document = parse_document(path)?;

    for section in &mut document.sections {
        vectors.process_section(section, chunker)?;
    }

    tracing::debug!(
        "Processed {} ({} sections, {} chunks)",
        document.filename,
        document.sections.len(),
        document.chunk_count()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{DOCUMENTS_DIR, INPUT_FILE};
    use tempfile::TempDir;

    const GUIDES: &[(&str, &str)] = &[
        (
            "Cities.md",
            "# Marseille\nThe old port and its fish market.\n\n# Nice\nPromenade and pebble beaches.\n",
        ),
        (
            "Nightlife.md",
            "# Bars and Clubs\nNightlife for groups of college friends: bars, clubs and beach parties.\n",
        ),
        ("Broken.pdf", "not really a pdf"),
        (
            "Cuisine.txt",
            "# Wine Regions\nWine tasting tours in Provence.\x0c# Cooking Classes\nLearn to cook bouillabaisse.\n",
        ),
    ];

    fn collection_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join(DOCUMENTS_DIR);
        std::fs::create_dir(&docs).unwrap();
        for (name, content) in GUIDES {
            std::fs::write(docs.join(name), content).unwrap();
        }

        let listing: Vec<String> = GUIDES
            .iter()
            .map(|(name, _)| format!(r#"{{"filename": "{name}", "title": "{name}"}}"#))
            .collect();
        let input = format!(
            r#"{{
                "documents": [{}, {{"filename": "Missing.md"}}],
                "persona": {{"role": "Travel Planner"}},
                "job_to_be_done": {{"task": "Plan nightlife with bars and clubs for a group of college friends"}}
            }}"#,
            listing.join(", ")
        );
        std::fs::write(dir.path().join(INPUT_FILE), input).unwrap();
        dir
    }

    fn pipeline(workers: usize) -> Pipeline {
        let settings = Settings {
            workers,
            ..Default::default()
        };
        Pipeline::new(settings).unwrap()
    }

    #[tokio::test]
    async fn test_process_documents_keeps_input_order_and_skips_failures() {
        let dir = collection_dir();
        let collection = Collection::open(dir.path()).unwrap();
        let paths = collection.document_paths().unwrap();
        assert_eq!(paths.len(), 4);

        let documents = pipeline(3).process_documents(paths).await.unwrap();
        let names: Vec<&str> = documents.iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["Cities.md", "Nightlife.md", "Cuisine.txt"]);
        assert!(documents.iter().all(|d| d.chunk_count() > 0));
        assert_eq!(documents[2].sections[1].page_number, 2);
    }

    #[tokio::test]
    async fn test_run_produces_report() {
        let dir = collection_dir();
        let collection = Collection::open(dir.path()).unwrap();

        let report = pipeline(2).run(&collection).await.unwrap();

        assert_eq!(report.metadata.persona, "Travel Planner");
        assert_eq!(report.metadata.input_documents.len(), 4);
        assert_eq!(report.extracted_sections.len(), 5);
        assert_eq!(report.extracted_sections[0].section_title, "Bars and Clubs");
        assert_eq!(report.extracted_sections[0].importance_rank, 1);
        assert_eq!(report.subsection_analysis[0].document, "Nightlife.md");

        let ranks: Vec<usize> = report
            .extracted_sections
            .iter()
            .map(|s| s.importance_rank)
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_repeated_runs_match() {
        let dir = collection_dir();
        let collection = Collection::open(dir.path()).unwrap();
        let pipeline = pipeline(4);

        let first = pipeline.run(&collection).await.unwrap();
        let second = pipeline.run(&collection).await.unwrap();
        assert_eq!(first.extracted_sections, second.extracted_sections);
        assert_eq!(first.subsection_analysis, second.subsection_analysis);
    }

    /// Panics on any text mentioning "detonate"
    struct FragileEmbedder;

    impl docrank_core::Embedder for FragileEmbedder {
        fn name(&self) -> &str {
            "fragile"
        }

        fn dimension(&self) -> usize {
            4
        }

        fn embed_batch(&self, texts: &[&str]) -> docrank_core::Result<Vec<Vec<f32>>> {
            if texts.iter().any(|t| t.contains("detonate")) {
                panic!("embedder blew up");
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect())
        }
    }

    #[tokio::test]
    async fn test_worker_panic_names_document() {
        let dir = TempDir::new().unwrap();
        let calm = dir.path().join("Calm.md");
        let fragile = dir.path().join("Fragile.md");
        std::fs::write(&calm, "# Harbour\nQuiet walks by the water.\n").unwrap();
        std::fs::write(&fragile, "# Fireworks\nWe detonate rockets at midnight.\n").unwrap();

        let vectors = Arc::new(VectorEngine::new(Arc::new(FragileEmbedder)).unwrap());
        let pipeline = Pipeline::with_vector_engine(Settings::default(), vectors).unwrap();

        let (documents, skipped) = pipeline
            .process_documents_with_skips(vec![calm, fragile.clone()])
            .await
            .unwrap();

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].filename, "Calm.md");
        assert_eq!(skipped, vec![(fragile, "worker panicked".to_string())]);
    }

    #[tokio::test]
    async fn test_parse_failure_recorded_with_path() {
        let dir = collection_dir();
        let broken = dir.path().join(DOCUMENTS_DIR).join("Broken.pdf");

        let (documents, skipped) = pipeline(1)
            .process_documents_with_skips(vec![broken.clone()])
            .await
            .unwrap();

        assert!(documents.is_empty());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, broken);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            workers: 0,
            ..Default::default()
        };
        assert!(Pipeline::new(settings.clone()).is_err());

        let vectors = Arc::new(VectorEngine::new(Arc::new(docrank_core::HashEmbedder::new(8))).unwrap());
        assert!(Pipeline::with_vector_engine(settings, vectors).is_err());
    }
}
