//! Query-time retrieval and grounded answer generation.

use std::sync::Arc;

use super::store::VectorStore;
use crate::core::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, ModelProvider};

/// Number of candidate chunks retrieved per query.
const TOP_K: usize = 3;

/// Hard relevance gate: a top match below this suppresses the whole
/// answer, even if lower-ranked results might be informative.
const SCORE_THRESHOLD: f32 = 0.3;

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Returned when retrieval finds nothing relevant. A defined outcome, not
/// an error; provider outages surface as `ApiError::Provider` instead.
pub const NO_MATCH_MESSAGE: &str = "Unable to find matching results.";

/// Preserved verbatim for behavioral compatibility with the original
/// grounding prompt.
const PROMPT_TEMPLATE: &str = "
Answer the question based only on the following context:

{context}

---

Answer the question based on the above context: {question}

While answering the question, prioritize the connected documents I have added!
";

#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    /// Source titles in ranking order; `None` when no relevant match.
    pub sources: Option<Vec<String>>,
}

/// Answers a query with exactly one embedding lookup and at most one
/// generation call. No retries, no streaming, no multi-turn reasoning.
pub struct Answerer {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn VectorStore>,
    embed_model: String,
    chat_model: String,
}

impl Answerer {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn VectorStore>,
        embed_model: impl Into<String>,
        chat_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            embed_model: embed_model.into(),
            chat_model: chat_model.into(),
        }
    }

    pub async fn answer(&self, query: &str) -> Result<Answer, ApiError> {
        let query_embedding = self
            .provider
            .embed(&[query.to_string()], &self.embed_model)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Provider("empty embedding response".to_string()))?;

        let results = self.store.search(&query_embedding, TOP_K).await?;

        if results.is_empty() || results[0].score < SCORE_THRESHOLD {
            tracing::info!(
                "no relevant match for query (top score: {:?})",
                results.first().map(|r| r.score)
            );
            return Ok(Answer {
                answer: NO_MATCH_MESSAGE.to_string(),
                sources: None,
            });
        }

        let context = results
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        let prompt = render_prompt(&context, query);

        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let reply = self.provider.chat(request, &self.chat_model).await?;

        let mut sources = Vec::new();
        for result in &results {
            if !sources.contains(&result.chunk.title) {
                sources.push(result.chunk.title.clone());
            }
        }

        Ok(Answer {
            answer: reply,
            sources: Some(sources),
        })
    }
}

fn render_prompt(context: &str, question: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::rag::chunker::Chunk;
    use crate::rag::store::{IndexStats, IndexedChunk, SearchResult};

    struct FixedStore {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl VectorStore for FixedStore {
        async fn rebuild(&self, _items: Vec<(Chunk, Vec<f32>)>) -> Result<(), ApiError> {
            Ok(())
        }

        async fn search(
            &self,
            _query_embedding: &[f32],
            limit: usize,
        ) -> Result<Vec<SearchResult>, ApiError> {
            let mut results = self.results.clone();
            results.truncate(limit);
            Ok(results)
        }

        async fn stats(&self) -> Result<IndexStats, ApiError> {
            Ok(IndexStats {
                chunks: self.results.len(),
                ready: true,
            })
        }
    }

    struct RecordingProvider {
        reply: String,
        last_prompt: Mutex<Option<String>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            *self.last_prompt.lock().unwrap() = Some(request.messages[0].content.clone());
            Ok(self.reply.clone())
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    fn result(text: &str, title: &str, score: f32) -> SearchResult {
        SearchResult {
            chunk: IndexedChunk {
                chunk_id: format!("id-{title}-{score}"),
                text: text.to_string(),
                title: title.to_string(),
                start_index: 0,
            },
            score,
        }
    }

    fn answerer(provider: Arc<RecordingProvider>, results: Vec<SearchResult>) -> Answerer {
        Answerer::new(
            provider,
            Arc::new(FixedStore { results }),
            "embed-model",
            "chat-model",
        )
    }

    #[tokio::test]
    async fn empty_results_return_the_sentinel_with_no_sources() {
        let provider = Arc::new(RecordingProvider::new("unused"));
        let answerer = answerer(provider.clone(), vec![]);

        let answer = answerer.answer("anything?").await.unwrap();
        assert_eq!(answer.answer, NO_MATCH_MESSAGE);
        assert!(answer.sources.is_none());
        // The generation service is never called on a gated query.
        assert!(provider.last_prompt.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn low_top_score_suppresses_the_whole_answer() {
        let provider = Arc::new(RecordingProvider::new("unused"));
        let answerer = answerer(
            provider.clone(),
            vec![
                result("weak match", "a.docx", 0.29),
                result("weaker match", "b.docx", 0.1),
            ],
        );

        let answer = answerer.answer("anything?").await.unwrap();
        assert_eq!(answer.answer, NO_MATCH_MESSAGE);
        assert!(answer.sources.is_none());
        assert!(provider.last_prompt.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn relevant_results_ground_a_single_generation_call() {
        let provider = Arc::new(RecordingProvider::new("Dhaka."));
        let answerer = answerer(
            provider.clone(),
            vec![
                result("The capital of Bangladesh is Dhaka.", "bd.docx", 0.92),
                result("Dhaka is on the Buriganga river.", "bd.docx", 0.71),
                result("Bangladesh borders India.", "geo.docx", 0.55),
            ],
        );

        let answer = answerer
            .answer("What is the capital of Bangladesh?")
            .await
            .unwrap();
        assert_eq!(answer.answer, "Dhaka.");
        assert_eq!(
            answer.sources,
            Some(vec!["bd.docx".to_string(), "geo.docx".to_string()])
        );

        let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Answer the question based only on the following context:"));
        assert!(prompt.contains("The capital of Bangladesh is Dhaka."));
        assert!(prompt.contains("\n\n---\n\n"));
        assert!(prompt
            .contains("Answer the question based on the above context: What is the capital of Bangladesh?"));
        assert!(prompt
            .contains("While answering the question, prioritize the connected documents I have added!"));
    }

    #[tokio::test]
    async fn context_joins_results_in_ranking_order() {
        let provider = Arc::new(RecordingProvider::new("ok"));
        let answerer = answerer(
            provider.clone(),
            vec![
                result("first ranked", "a.docx", 0.9),
                result("second ranked", "b.docx", 0.8),
            ],
        );

        answerer.answer("q").await.unwrap();
        let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("first ranked\n\n---\n\nsecond ranked"));
    }
}
