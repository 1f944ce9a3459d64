// In-memory data source, optionally seeded from a fixture file
use crate::application::usage_repository::UsageDataSource;
use crate::domain::model::ModelDescriptor;
use crate::domain::usage::{parse_usage, Acknowledgement, ModelUsage, UsageEntry, WireModelUsage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Store {
    models: Vec<ModelDescriptor>,
    usage: Vec<ModelUsage>,
}

/// Fixture file layout, shared by the JSON and TOML formats.
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
    #[serde(default)]
    pub usage: Vec<WireModelUsage>,
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(models: Vec<ModelDescriptor>, usage: Vec<ModelUsage>) -> Self {
        Self {
            store: RwLock::new(Store { models, usage }),
        }
    }

    pub fn from_fixture(fixture: Fixture) -> Result<Self> {
        let usage = parse_usage(fixture.usage).context("Invalid usage records in fixture")?;
        Ok(Self::seeded(fixture.models, usage))
    }

    /// Load a `.json` or `.toml` fixture file
    pub fn load_fixture(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;

        let fixture: Fixture = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse fixture {}", path.display()))?,
            Some("toml") => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse fixture {}", path.display()))?,
            _ => anyhow::bail!("Unsupported fixture format: {}", path.display()),
        };

        let repository = Self::from_fixture(fixture)?;
        tracing::info!("Loaded fixture {}", path.display());
        Ok(repository)
    }
}

#[async_trait]
impl UsageDataSource for InMemoryRepository {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        Ok(self.store.read().await.models.clone())
    }

    async fn list_model_usage(&self) -> Result<Vec<ModelUsage>> {
        Ok(self.store.read().await.usage.clone())
    }

    async fn append_usage(&self, entries: Vec<UsageEntry>) -> Result<Acknowledgement> {
        let count = entries.len();
        let mut store = self.store.write().await;

        for entry in entries {
            match store.usage.iter().position(|u| u.model_id == entry.model_id) {
                Some(idx) => store.usage[idx].records.push(entry.record),
                None => store.usage.push(ModelUsage::new(
                    entry.model_id,
                    entry.display_name,
                    vec![entry.record],
                )),
            }
        }

        tracing::debug!("Appended {} usage records", count);
        Ok(Acknowledgement::new(format!("Appended {count} usage record(s)")))
    }

    async fn register_models(&self, models: Vec<ModelDescriptor>) -> Result<Acknowledgement> {
        let count = models.len();
        let mut store = self.store.write().await;

        for model in models {
            match store.models.iter().position(|m| m.model_id == model.model_id) {
                Some(idx) => store.models[idx] = model,
                None => store.models.push(model),
            }
        }

        tracing::debug!("Registered {} models", count);
        Ok(Acknowledgement::new(format!("Registered {count} model(s)")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::usage::{parse_timestamp, UsageRecord};

    fn entry(id: &str, ts: &str, count: u64) -> UsageEntry {
        UsageEntry {
            model_id: id.to_string(),
            display_name: id.to_uppercase(),
            record: UsageRecord::new(parse_timestamp(ts).unwrap(), count),
        }
    }

    fn descriptor(id: &str, version: &str) -> ModelDescriptor {
        ModelDescriptor {
            model_id: id.to_string(),
            name: id.to_uppercase(),
            provider: "Acme".to_string(),
            version: version.to_string(),
            description: String::new(),
            primary_use_case: String::new(),
            link: String::new(),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let repo = InMemoryRepository::new();
        assert!(repo.list_models().await.unwrap().is_empty());
        assert!(repo.list_model_usage().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_groups_by_model_in_order() {
        let repo = InMemoryRepository::new();
        let ack = repo
            .append_usage(vec![
                entry("a", "2024-05-01T10:00:00Z", 1),
                entry("b", "2024-05-01T10:00:00Z", 2),
                entry("a", "2024-05-01T11:00:00Z", 3),
            ])
            .await
            .unwrap();
        assert_eq!(ack.message, "Appended 3 usage record(s)");

        let usage = repo.list_model_usage().await.unwrap();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].model_id, "a");
        assert_eq!(usage[0].display_name, "A");
        let counts: Vec<u64> = usage[0].records.iter().map(|r| r.request_count).collect();
        assert_eq!(counts, vec![1, 3]);
        assert_eq!(usage[1].records.len(), 1);
    }

    #[tokio::test]
    async fn test_register_upserts_by_id() {
        let repo = InMemoryRepository::new();
        repo.register_models(vec![descriptor("a", "1"), descriptor("b", "1")])
            .await
            .unwrap();
        let ack = repo
            .register_models(vec![descriptor("a", "2"), descriptor("c", "1")])
            .await
            .unwrap();
        assert_eq!(ack.message, "Registered 2 model(s)");

        let models = repo.list_models().await.unwrap();
        let ids: Vec<&str> = models.iter().map(|m| m.model_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(models[0].version, "2");
    }

    #[test]
    fn test_fixture_from_toml() {
        let fixture: Fixture = toml::from_str(
            r#"
            [[models]]
            model_uid = "gpt-4o"
            name = "GPT-4o"
            provider = "OpenAI"

            [[usage]]
            model_uid = "gpt-4o"
            name = "GPT-4o"
            usageRecords = [
                { timestamp = "2024-05-01T10:00:00Z", requests = 4 },
                { timestamp = "2024-05-01T11:00:00Z", requests = "6" },
            ]
            "#,
        )
        .unwrap();

        let repo = InMemoryRepository::from_fixture(fixture).unwrap();
        let store = repo.store.try_read().unwrap();
        assert_eq!(store.models.len(), 1);
        assert_eq!(store.usage[0].total_requests(), 10);
    }

    #[test]
    fn test_fixture_with_bad_timestamp_fails() {
        let fixture: Fixture = serde_json::from_str(
            r#"{ "usage": [{ "model_uid": "m", "name": "M",
                 "usageRecords": [{ "timestamp": "soon", "requests": 1 }] }] }"#,
        )
        .unwrap();

        assert!(InMemoryRepository::from_fixture(fixture).is_err());
    }

    #[tokio::test]
    async fn test_load_bundled_fixture() {
        let repo = InMemoryRepository::load_fixture(Path::new("fixtures/usage.json")).unwrap();
        let models = repo.list_models().await.unwrap();
        let usage = repo.list_model_usage().await.unwrap();
        assert!(!models.is_empty());
        assert!(usage.iter().all(|u| models.iter().any(|m| m.model_id == u.model_id)));
    }

    #[test]
    fn test_unsupported_fixture_extension() {
        let err = InMemoryRepository::load_fixture(Path::new("DESIGN.md")).unwrap_err();
        assert!(err.to_string().contains("Unsupported fixture format"));
    }
}
