use serde::{Deserialize, Serialize};

/// Connection parameters for one CouchDB database.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Host including scheme, e.g. "http://127.0.0.1".
    pub host: String,
    pub port: u16,
    /// Database name as it appears in the URL path.
    pub database: String,
    /// Treat non-2xx responses as errors instead of decoding their bodies.
    #[serde(default = "default_check_status")]
    pub check_status: bool,
}

fn default_check_status() -> bool {
    true
}

impl ClientConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// URL prefix shared by both endpoints: `{host}:{port}/{database}`.
    pub fn base_url(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 5984,
            database: "db".to_string(),
            check_status: default_check_status(),
        }
    }
}
