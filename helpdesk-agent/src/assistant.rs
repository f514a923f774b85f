//! Wiring: builds both orchestrators from [`Settings`].

use std::sync::Arc;

use helpdesk_model::openai::OpenAIChatConfig;
use helpdesk_model::{CompletionModel, OpenAIChatModel};
use helpdesk_rag::{
    EmbeddingProvider, Indexer, OpenAIEmbeddingProvider, PineconeVectorStore, Retriever,
    VectorStore,
};
use tracing::info;

use crate::agentic::ToolCallingAgent;
use crate::direct::DirectRagAgent;
use crate::error::{AgentError, ConfigError, Result};
use crate::settings::Settings;
use crate::tool::SearchTool;

/// Both conversation protocols over one shared set of clients.
pub struct Assistant {
    direct: DirectRagAgent,
    agentic: ToolCallingAgent,
    retriever: Retriever,
}

impl Assistant {
    /// Build OpenAI and Pinecone clients from `settings`.
    ///
    /// When no index host is configured it is resolved once through the
    /// Pinecone control plane.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::new();
        let config_err =
            |e: &dyn std::fmt::Display| AgentError::Config(ConfigError::new(e.to_string()));

        let mut embedder = OpenAIEmbeddingProvider::new(settings.openai_api_key.clone())
            .map_err(|e| config_err(&e))?
            .with_model(settings.embedding_model.clone())
            .with_client(client.clone());
        if let Some(base_url) = &settings.openai_base_url {
            embedder = embedder.with_base_url(base_url);
        }

        let store = match &settings.pinecone_index_host {
            Some(host) => PineconeVectorStore::new(settings.pinecone_api_key.clone(), host)
                .map_err(|e| config_err(&e))?,
            None => {
                PineconeVectorStore::connect(
                    settings.pinecone_api_key.clone(),
                    &settings.pinecone_index_name,
                )
                .await?
            }
        }
        .with_client(client.clone());

        let chat_model = |model: &str| -> Result<Arc<dyn CompletionModel>> {
            let mut config = OpenAIChatConfig::new(settings.openai_api_key.clone(), model);
            if let Some(base_url) = &settings.openai_base_url {
                config = config.with_base_url(base_url.clone());
            }
            let model = OpenAIChatModel::new(config).map_err(|e| config_err(&e))?;
            Ok(Arc::new(model.with_client(client.clone())))
        };

        info!(
            index = %settings.pinecone_index_name,
            answer_model = %settings.answer_model,
            agent_model = %settings.agent_model,
            "assistant clients ready"
        );

        Self::from_parts(
            settings,
            chat_model(&settings.answer_model)?,
            chat_model(&settings.agent_model)?,
            Arc::new(embedder),
            Arc::new(store),
        )
    }

    /// Assemble the orchestrators from already-built clients.
    pub fn from_parts(
        settings: &Settings,
        answer_model: Arc<dyn CompletionModel>,
        agent_model: Arc<dyn CompletionModel>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let retriever = Retriever::builder()
            .config(settings.retrieval_config())
            .embedding_provider(embedder)
            .vector_store(store)
            .build()?;

        let direct = DirectRagAgent::builder()
            .retriever(retriever.clone())
            .model(answer_model)
            .system_prompt(settings.system_prompt.clone())
            .max_history(settings.max_history)
            .no_results_message(settings.no_results_message.clone())
            .fallback_message(settings.fallback_message.clone())
            .build()?;

        let tool = SearchTool::new(
            retriever.with_config(settings.tool_retrieval_config()),
            settings.no_context_message.clone(),
        );
        let agentic = ToolCallingAgent::new(agent_model, tool, settings.agent_prompt.clone());

        Ok(Self { direct, agentic, retriever })
    }

    pub fn direct(&self) -> &DirectRagAgent {
        &self.direct
    }

    pub fn agentic(&self) -> &ToolCallingAgent {
        &self.agentic
    }

    /// An indexer writing to `namespace`, or to the configured namespace.
    pub fn indexer(&self, namespace: Option<&str>) -> Indexer {
        let indexer = Indexer::new(
            self.retriever.embedding_provider().clone(),
            self.retriever.vector_store().clone(),
        );
        match namespace.or(self.retriever.config().namespace.as_deref()) {
            Some(ns) => indexer.with_namespace(ns),
            None => indexer,
        }
    }
}
