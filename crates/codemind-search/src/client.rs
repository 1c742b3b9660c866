//! Qdrant client wrapper: the C11 vector store's backing transport.
//!
//! Grounded on the teacher's repo-scoped client, generalized to a single
//! `memories` collection (schema.rs) with project/scope/category/tags
//! filtering instead of a `repo_id`-keyed multi-tenant split.

use std::hash::{Hash, Hasher};

use qdrant_client::qdrant::{
    point_id::PointIdOptions, vectors_config::Config, Condition, CreateCollectionBuilder,
    CreateFieldIndexCollectionBuilder, DeletePointsBuilder, FieldType, Filter, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParams, VectorsConfig,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info};

use crate::error::Result;
use crate::schema::{fields, CollectionConfig};

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl QdrantConfig {
    pub fn local() -> Self {
        Self::default()
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Maps a `Memory::id` (stable sha-256 hex) to the numeric id Qdrant points
/// require, deterministically so re-upserts update rather than duplicate.
pub fn point_id_for(memory_id: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    memory_id.hash(&mut hasher);
    hasher.finish()
}

pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    pub async fn connect(config: QdrantConfig) -> Result<Self> {
        info!("Connecting to Qdrant at {}", config.url);

        let mut builder = Qdrant::from_url(&config.url);
        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        let client = builder
            .build()
            .map_err(|e| crate::error::SearchError::Connection(format!("failed to build Qdrant client: {e}")))?;

        client
            .list_collections()
            .await
            .map_err(|e| crate::error::SearchError::Connection(format!("failed to connect to Qdrant: {e}")))?;

        info!("Connected to Qdrant");
        Ok(Self { client })
    }

    pub async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.client.collection_exists(name).await?)
    }

    pub async fn create_collection(&self, config: &CollectionConfig) -> Result<()> {
        if self.collection_exists(config.name).await? {
            debug!("collection '{}' already exists", config.name);
            return Ok(());
        }

        info!("creating collection '{}' (dim={})", config.name, config.dimension);

        let vectors_config = VectorsConfig {
            config: Some(Config::Params(VectorParams {
                size: config.dimension,
                distance: config.distance.into(),
                ..Default::default()
            })),
        };

        self.client
            .create_collection(CreateCollectionBuilder::new(config.name).vectors_config(vectors_config))
            .await?;

        self.create_payload_indexes(config.name).await?;
        Ok(())
    }

    async fn create_payload_indexes(&self, collection_name: &str) -> Result<()> {
        for field in [
            fields::PROJECT_NAME,
            fields::SCOPE,
            fields::CATEGORY,
            fields::CONTEXT_LEVEL,
            fields::FILE_PATH,
            fields::ID,
        ] {
            self.client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    collection_name,
                    field,
                    FieldType::Keyword,
                ))
                .await?;
        }
        debug!("payload indexes created for '{}'", collection_name);
        Ok(())
    }

    pub async fn ensure_collection(&self) -> Result<()> {
        self.create_collection(&CollectionConfig::MEMORIES).await
    }

    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        if !self.collection_exists(name).await? {
            return Ok(());
        }
        self.client.delete_collection(name).await?;
        Ok(())
    }

    pub async fn upsert(&self, collection_name: &str, memory_id: &str, vector: Vec<f32>, payload: serde_json::Value) -> Result<()> {
        self.upsert_batch(collection_name, vec![(memory_id.to_string(), vector, payload)]).await
    }

    pub async fn upsert_batch(
        &self,
        collection_name: &str,
        items: Vec<(String, Vec<f32>, serde_json::Value)>,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = items
            .into_iter()
            .map(|(id, vector, payload_json)| {
                let payload = Payload::try_from(payload_json).expect("payload is always a JSON object");
                PointStruct::new(point_id_for(&id), vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection_name, points).wait(true))
            .await?;
        Ok(())
    }

    pub async fn search(
        &self,
        collection_name: &str,
        query_vector: Vec<f32>,
        limit: u64,
        filter: Option<Filter>,
    ) -> Result<Vec<(serde_json::Map<String, serde_json::Value>, f32)>> {
        let mut builder = SearchPointsBuilder::new(collection_name, query_vector, limit).with_payload(true);
        if let Some(filter) = filter {
            builder = builder.filter(filter);
        }

        let response = self.client.search_points(builder).await?;
        Ok(response
            .result
            .into_iter()
            .map(|point| (payload_to_json_map(point.payload), cosine_to_unit(point.score)))
            .collect())
    }

    pub async fn scroll(
        &self,
        collection_name: &str,
        filter: Option<Filter>,
        limit: u32,
    ) -> Result<Vec<serde_json::Map<String, serde_json::Value>>> {
        let mut builder = ScrollPointsBuilder::new(collection_name).limit(limit).with_payload(true);
        if let Some(filter) = filter {
            builder = builder.filter(filter);
        }

        let response = self.client.scroll(builder).await?;
        Ok(response.result.into_iter().map(|p| payload_to_json_map(p.payload)).collect())
    }

    pub async fn get_by_id(&self, collection_name: &str, memory_id: &str) -> Result<Option<serde_json::Map<String, serde_json::Value>>> {
        let filter = Filter::must([Condition::matches(fields::ID, memory_id.to_string())]);
        let hits = self.scroll(collection_name, Some(filter), 1).await?;
        Ok(hits.into_iter().next())
    }

    pub async fn delete_by_id(&self, collection_name: &str, memory_id: &str) -> Result<()> {
        let ids = vec![qdrant_client::qdrant::PointId::from(point_id_for(memory_id))];
        self.client
            .delete_points(DeletePointsBuilder::new(collection_name).points(ids).wait(true))
            .await?;
        Ok(())
    }

    pub async fn delete_by_filter(&self, collection_name: &str, filter: Filter) -> Result<()> {
        self.client
            .delete_points(DeletePointsBuilder::new(collection_name).points(filter).wait(true))
            .await?;
        Ok(())
    }

    /// Merges `payload` into the point's existing payload (Qdrant
    /// `set_payload` semantics: existing keys not present in `payload` are
    /// left untouched, including the vector).
    pub async fn set_payload(&self, collection_name: &str, memory_id: &str, payload: serde_json::Value) -> Result<()> {
        use qdrant_client::qdrant::SetPayloadPointsBuilder;

        let payload = Payload::try_from(payload).expect("payload is always a JSON object");
        let ids = vec![qdrant_client::qdrant::PointId::from(point_id_for(memory_id))];

        self.client
            .set_payload(SetPayloadPointsBuilder::new(collection_name, payload).points(ids).wait(true))
            .await?;
        Ok(())
    }

    pub async fn count(&self, collection_name: &str, filter: Option<Filter>) -> Result<usize> {
        use qdrant_client::qdrant::CountPointsBuilder;
        let mut builder = CountPointsBuilder::new(collection_name);
        if let Some(filter) = filter {
            builder = builder.filter(filter);
        }
        let response = self.client.count(builder).await?;
        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }
}

fn cosine_to_unit(score: f32) -> f32 {
    ((score + 1.0) / 2.0).clamp(0.0, 1.0)
}

fn payload_to_json_map(payload: std::collections::HashMap<String, qdrant_client::qdrant::Value>) -> serde_json::Map<String, serde_json::Value> {
    payload.into_iter().map(|(k, v)| (k, qdrant_value_to_json(v))).collect()
}

fn qdrant_value_to_json(value: qdrant_client::qdrant::Value) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind;
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::json!(d),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields.into_iter().map(|(k, v)| (k, qdrant_value_to_json(v))).collect(),
        ),
    }
}
