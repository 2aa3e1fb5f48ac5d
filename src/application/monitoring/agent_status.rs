use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Health of a scheduled agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum HealthStatus {
    /// Execution context spawned, no decision pass completed yet
    Starting,
    Healthy,
    /// Last decision pass ended in an unexpected failure
    Degraded,
    Stopped,
}

/// Status of a specific agent
#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub health: HealthStatus,
    pub last_heartbeat: DateTime<Utc>,
    pub metrics: HashMap<String, String>, // Key-Value pairs for specific metrics
}

/// Registry to track the status of all agents in the system
pub struct AgentStatusRegistry {
    statuses: RwLock<HashMap<String, AgentStatus>>,
}

impl AgentStatusRegistry {
    pub fn new() -> Self {
        Self {
            statuses: RwLock::new(HashMap::new()),
        }
    }

    /// Update the heartbeat of an agent
    pub async fn update_heartbeat(&self, name: &str, health: HealthStatus) {
        let mut statuses = self.statuses.write().await;

        if let Some(status) = statuses.get_mut(name) {
            status.health = health;
            status.last_heartbeat = Utc::now();
        } else {
            statuses.insert(
                name.to_string(),
                AgentStatus {
                    name: name.to_string(),
                    health,
                    last_heartbeat: Utc::now(),
                    metrics: HashMap::new(),
                },
            );
        }
    }

    /// Update a specific metric for an agent
    pub async fn update_metric(&self, name: &str, key: &str, value: String) {
        let mut statuses = self.statuses.write().await;
        if let Some(status) = statuses.get_mut(name) {
            status.metrics.insert(key.to_string(), value);
            status.last_heartbeat = Utc::now(); // Updating a metric counts as alive
        }
    }

    /// Get all agent statuses
    pub async fn get_all(&self) -> HashMap<String, AgentStatus> {
        self.statuses.read().await.clone()
    }

    /// Get status for a specific agent
    pub async fn get_status(&self, name: &str) -> Option<AgentStatus> {
        self.statuses.read().await.get(name).cloned()
    }
}

impl Default for AgentStatusRegistry {
    fn default() -> Self {
        Self::new()
    }
}
