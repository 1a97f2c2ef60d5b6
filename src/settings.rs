use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tokio::sync::RwLock;

use crate::event_bus::{AppEvent, EventBus};
use crate::models::{ConfigUpdate, PersistedConfig};

pub struct SettingsManager {
    path: PathBuf,
    data: RwLock<PersistedConfig>,
    event_bus: Option<Arc<EventBus>>,
}

impl SettingsManager {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let initial = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => {
                match serde_json::from_slice::<PersistedConfig>(&bytes) {
                    Ok(config) if config.validate().is_ok() => config,
                    Ok(_) | Err(_) => {
                        tracing::warn!("配置文件无效，使用默认配置: {:?}", path);
                        PersistedConfig::default()
                    }
                }
            }
            _ => {
                let default = PersistedConfig::default();
                let json = serde_json::to_string_pretty(&default)?;
                tokio::fs::write(&path, json).await?;
                default
            }
        };

        Ok(Self {
            path,
            data: RwLock::new(initial),
            event_bus: None,
        })
    }

    /// 保存成功后在事件总线上发布 ConfigUpdated
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> PersistedConfig {
        self.data.read().await.clone()
    }

    pub async fn update(&self, update: ConfigUpdate) -> Result<PersistedConfig> {
        let mut config = self.data.write().await;
        let mut next = config.clone();
        let changed = update.changed_sections();

        if let Some(interval) = update.sample_interval_ms {
            next.sample_interval_ms = interval;
        }
        if let Some(duration) = update.countdown_duration {
            next.emergency.countdown_duration = duration;
        }
        if let Some(cooldown) = update.retrigger_cooldown_ms {
            next.emergency.retrigger_cooldown_ms = cooldown;
        }
        if let Some(interval) = update.escalation_interval {
            next.emergency.escalation_interval = interval;
        }
        if let Some(contacts) = update.contacts {
            next.emergency.contacts = contacts;
        }
        if let Some(responder) = update.responder {
            next.responder = responder;
        }
        if let Some(effectors) = update.effectors {
            next.effectors = effectors;
        }

        next.validate()?;
        self.save(&next).await?;
        *config = next;

        if let Some(bus) = &self.event_bus {
            for section in changed {
                bus.publish(AppEvent::ConfigUpdated {
                    config_type: section.to_string(),
                });
            }
        }
        tracing::info!("配置已更新: {:?}", self.path);
        Ok(config.clone())
    }

    async fn save(&self, config: &PersistedConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("写入配置文件失败: {:?}", self.path))?;
        Ok(())
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", "driver-guard") {
        dirs.config_dir().join("config.json")
    } else {
        PathBuf::from("config.json")
    }
}
