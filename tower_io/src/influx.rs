//! InfluxDB 1.x HTTP writer.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use tower_traits::{MeasurementRecord, PointSink};

use crate::error::{IoError, Result};
use crate::line_protocol::encode_batch;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub username: String,
    pub password: Option<String>,
    pub ssl: bool,
    pub timeout: Duration,
}

impl InfluxSettings {
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

pub struct InfluxWriter {
    client: Client,
    settings: InfluxSettings,
    base: String,
}

impl std::fmt::Debug for InfluxWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfluxWriter")
            .field("base", &self.base)
            .field("dbname", &self.settings.dbname)
            .field("username", &self.settings.username)
            .finish_non_exhaustive()
    }
}

impl InfluxWriter {
    /// Build a client and check the server answers `/ping`.
    pub fn connect(settings: InfluxSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| IoError::Http(e.to_string()))?;
        let base = settings.base_url();
        let writer = Self {
            client,
            settings,
            base,
        };
        writer.ping()?;
        tracing::info!(
            url = %writer.base,
            db = %writer.settings.dbname,
            user = %writer.settings.username,
            "database reachable"
        );
        Ok(writer)
    }

    pub fn ping(&self) -> Result<()> {
        let url = format!("{}/ping", self.base);
        let unreachable = |reason: String| IoError::Unreachable {
            url: url.clone(),
            reason,
        };
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| unreachable(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(unreachable(format!("status {}", resp.status())))
        }
    }

    /// POST `records` to `/write`. Records without fields are left out.
    pub fn write(&self, records: &[MeasurementRecord]) -> Result<()> {
        let body = encode_batch(records);
        if body.is_empty() {
            tracing::debug!("nothing to write");
            return Ok(());
        }
        let mut req = self
            .client
            .post(format!("{}/write", self.base))
            .query(&[("db", self.settings.dbname.as_str())])
            .body(body);
        if !self.settings.username.is_empty() {
            req = req.basic_auth(&self.settings.username, self.settings.password.as_ref());
        }
        let resp = req.send().map_err(|e| IoError::Http(e.to_string()))?;
        let status = resp.status();
        if status == StatusCode::NO_CONTENT || status.is_success() {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(IoError::Rejected {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

impl PointSink for InfluxWriter {
    fn write_points(
        &mut self,
        points: &[MeasurementRecord],
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(points).map_err(Into::into)
    }
}
