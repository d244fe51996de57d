//! End-to-end pipeline tests over scripted fakes.

use concierge_chat::{ChatSession, ConversationTurn, QueryRequest};
use concierge_core::{AppResult, NamespaceRegistry};
use concierge_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use concierge_prompt::{Example, ExampleStore};
use concierge_retrieval::embeddings::trigram::TrigramEmbedder;
use concierge_retrieval::{
    new_record, EmbeddingProvider, PassageIndex, RetrievalOptions, SqlitePassageIndex,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scripted LLM that routes by which pipeline stage built the prompt.
#[derive(Debug)]
struct FakeLlm {
    classification_reply: String,
    entity_reply: String,
    generation_reply: String,
    classification_calls: AtomicUsize,
    entity_calls: AtomicUsize,
    generation_calls: AtomicUsize,
    last_generation_prompt: Mutex<String>,
}

impl FakeLlm {
    fn new(classification: &str, entity: &str, generation: &str) -> Arc<Self> {
        Arc::new(Self {
            classification_reply: classification.to_string(),
            entity_reply: entity.to_string(),
            generation_reply: generation.to_string(),
            classification_calls: AtomicUsize::new(0),
            entity_calls: AtomicUsize::new(0),
            generation_calls: AtomicUsize::new(0),
            last_generation_prompt: Mutex::new(String::new()),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let content = if request.prompt.ends_with("Classification:") {
            self.classification_calls.fetch_add(1, Ordering::SeqCst);
            self.classification_reply.clone()
        } else if request.prompt.ends_with("Entity:") {
            self.entity_calls.fetch_add(1, Ordering::SeqCst);
            self.entity_reply.clone()
        } else {
            self.generation_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_generation_prompt.lock().unwrap() = request.prompt.clone();
            self.generation_reply.clone()
        };

        Ok(LlmResponse {
            content,
            model: "fake".to_string(),
            usage: LlmUsage::default(),
        })
    }
}

fn examples() -> ExampleStore {
    ExampleStore::new(vec![
        Example {
            input: "suggest a red wine for steak".to_string(),
            output: "Name: Cabernet Sauvignon, Region: Napa".to_string(),
        },
        Example {
            input: "what medicine helps with headaches".to_string(),
            output: "Name: Ibuprofen, Dosage: 200mg".to_string(),
        },
    ])
    .unwrap()
}

async fn session(llm: Arc<FakeLlm>) -> (ChatSession, Arc<FakeLlm>) {
    let embedder = Arc::new(TrigramEmbedder::new(128));
    let index = Arc::new(SqlitePassageIndex::open_in_memory().unwrap());

    let passages = [
        ("wine", "merlot is a smooth red wine with plum notes"),
        ("wine", "cabernet sauvignon pairs well with steak"),
        ("cvs-health", "ibuprofen should not be mixed with alcohol"),
        ("cvs-health", "acetaminophen is gentler on the stomach"),
    ];
    for (namespace, text) in passages {
        let embedding = embedder.embed(text).await.unwrap();
        index
            .upsert(&new_record(namespace, text, embedding))
            .await
            .unwrap();
    }

    let session = ChatSession::new(
        llm.clone(),
        embedder,
        index,
        &examples(),
        NamespaceRegistry::default(),
        RetrievalOptions::default(),
        "fake-model",
    )
    .await
    .unwrap();

    (session, llm)
}

#[tokio::test]
async fn greeting_with_explicit_workflow_skips_classification() {
    let llm = FakeLlm::new("Other", "", "System: Hello! How can I help you today?");
    let (session, llm) = session(llm).await;

    let request = QueryRequest::new("Hi", "wine");
    let response = session.process_query(&request).await.unwrap();

    assert_eq!(response.response, "Hello! How can I help you today?");
    assert_eq!(response.classified, "Wine");
    assert_eq!(llm.classification_calls.load(Ordering::SeqCst), 0);
    assert_eq!(llm.entity_calls.load(Ordering::SeqCst), 0);
    assert_eq!(llm.generation_calls.load(Ordering::SeqCst), 1);
}

/// Embedder that remembers every text it was asked to embed.
#[derive(Debug)]
struct RecordingEmbedder {
    inner: TrigramEmbedder,
    texts: Mutex<Vec<String>>,
}

impl RecordingEmbedder {
    fn new(dimensions: usize) -> Self {
        Self {
            inner: TrigramEmbedder::new(dimensions),
            texts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    fn provider_name(&self) -> &str {
        "recording"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.texts.lock().unwrap().extend(texts.iter().cloned());
        self.inner.embed_batch(texts).await
    }
}

#[tokio::test]
async fn anaphoric_query_resolves_against_recent_response() {
    let llm = FakeLlm::new("Other", "2019 Merlot", "System: It pairs well with lamb.");
    let embedder = Arc::new(RecordingEmbedder::new(128));
    let index = Arc::new(SqlitePassageIndex::open_in_memory().unwrap());

    // Only the entity makes the merlot passage lexically reachable; the raw
    // query shares no words with either passage.
    let passages = [
        ("wine", "the 2019 merlot has notes of dark plum"),
        ("wine", "a crisp sauvignon blanc for summer evenings"),
    ];
    for (namespace, text) in passages {
        let embedding = embedder.embed(text).await.unwrap();
        index
            .upsert(&new_record(namespace, text, embedding))
            .await
            .unwrap();
    }

    let options = RetrievalOptions {
        top_k: 1,
        ..RetrievalOptions::default()
    };
    let session = ChatSession::new(
        llm.clone(),
        embedder.clone(),
        index,
        &examples(),
        NamespaceRegistry::default(),
        options,
        "fake-model",
    )
    .await
    .unwrap();

    let mut request = QueryRequest::new("What about that one?", "wine");
    request.recent_response = "The 2019 Merlot is excellent".to_string();
    request.history = vec![
        ConversationTurn::human("suggest a wine"),
        ConversationTurn::system("The 2019 Merlot is excellent"),
    ];

    let response = session.process_query(&request).await.unwrap();

    assert_eq!(response.response, "It pairs well with lamb.");
    assert_eq!(llm.entity_calls.load(Ordering::SeqCst), 1);
    assert_eq!(llm.classification_calls.load(Ordering::SeqCst), 0);

    // The extracted entity was appended to the retrieval query
    let embedded = embedder.texts.lock().unwrap().clone();
    assert!(
        embedded.iter().any(|t| t == "What about that one? 2019 Merlot"),
        "retrieval should embed the entity-augmented query, got {:?}",
        embedded
    );

    // The entity steered retrieval: the merlot passage wins the single
    // context slot, and the history reaches the generation prompt
    let prompt = llm.last_generation_prompt.lock().unwrap().clone();
    assert!(prompt.contains("the 2019 merlot has notes of dark plum"));
    assert!(!prompt.contains("sauvignon blanc"));
    assert!(prompt.contains("Human: suggest a wine"));
    assert!(prompt.contains("User: What about that one?"));
}

#[tokio::test]
async fn other_workflow_triggers_classification() {
    let llm = FakeLlm::new(
        "Healthcare, medicines",
        "",
        "System: Ibuprofen with wine is not recommended.",
    );
    let (session, llm) = session(llm).await;

    let request = QueryRequest::new("Is ibuprofen safe with wine?", "Other");
    let response = session.process_query(&request).await.unwrap();

    assert_eq!(llm.classification_calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.classified, "Healthcare-medicines");
    assert_eq!(response.response, "Ibuprofen with wine is not recommended.");
}

#[tokio::test]
async fn malformed_classification_degrades_to_ungrounded() {
    let llm = FakeLlm::new("I really cannot tell", "", "An ungrounded answer");
    let (session, llm) = session(llm).await;

    let request = QueryRequest::new("tell me something", "Other");
    let response = session.process_query(&request).await.unwrap();

    assert_eq!(response.classified, "Other");
    assert_eq!(response.response, "An ungrounded answer");

    // With no namespace the context block is empty
    let prompt = llm.last_generation_prompt.lock().unwrap().clone();
    assert!(prompt.contains("<context>\n\n</context>"));
}

#[tokio::test]
async fn unknown_namespace_yields_empty_context_not_error() {
    let llm = FakeLlm::new("Other", "", "still answers");
    let (session, _) = session(llm).await;

    let request = QueryRequest::new("a question", "no-such-namespace");
    let response = session.process_query(&request).await.unwrap();
    assert_eq!(response.response, "still answers");
    assert_eq!(response.classified, "Other");
}

#[tokio::test]
async fn retrieved_context_reaches_the_prompt() {
    let llm = FakeLlm::new("Other", "", "System: Try the cabernet.");
    let (session, llm) = session(llm).await;

    let request = QueryRequest::new("cabernet sauvignon pairs with steak?", "wine");
    session.process_query(&request).await.unwrap();

    let prompt = llm.last_generation_prompt.lock().unwrap().clone();
    assert!(prompt.contains("cabernet sauvignon pairs well with steak"));
}

#[tokio::test]
async fn braces_in_indexed_passages_do_not_break_composition() {
    let llm = FakeLlm::new("Other", "", "fine");
    let embedder = Arc::new(TrigramEmbedder::new(128));
    let index = Arc::new(SqlitePassageIndex::open_in_memory().unwrap());

    let spiky = "tasting notes {bold} with hints of {plum} fruit";
    let embedding = embedder.embed(spiky).await.unwrap();
    index
        .upsert(&new_record("wine", spiky, embedding))
        .await
        .unwrap();

    let session = ChatSession::new(
        llm.clone(),
        embedder,
        index,
        &examples(),
        NamespaceRegistry::default(),
        RetrievalOptions::default(),
        "fake-model",
    )
    .await
    .unwrap();

    let request = QueryRequest::new("tasting notes bold plum fruit", "wine");
    let response = session.process_query(&request).await.unwrap();
    assert_eq!(response.response, "fine");

    let prompt = llm.last_generation_prompt.lock().unwrap().clone();
    assert!(prompt.contains("tasting notes bold with hints of plum fruit"));
}

#[tokio::test]
async fn empty_example_store_fails_session_construction() {
    let result = ExampleStore::new(vec![]);
    assert!(result.is_err());
}

#[tokio::test]
async fn answer_without_colon_is_returned_unchanged() {
    let llm = FakeLlm::new("Other", "", "a plain answer with no label");
    let (session, _) = session(llm).await;

    let request = QueryRequest::new("Hi", "wine");
    let response = session.process_query(&request).await.unwrap();
    assert_eq!(response.response, "a plain answer with no label");
}
