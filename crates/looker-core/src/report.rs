use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Dashboard filters, keyed by filter title
pub type Filter = BTreeMap<String, String>;

/// Identifier of a Looker dashboard
///
/// Batch files may carry either a number or a string; both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ReportId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ReportId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ReportId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// One entry of a batch download file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRequest {
    pub report: ReportId,
    #[serde(default)]
    pub filter: Filter,
    pub destination: PathBuf,
}

impl ReportRequest {
    /// Read a JSON array of report requests from a file
    pub fn load_batch(path: &Path) -> Result<Vec<ReportRequest>> {
        tracing::debug!("Reading report batch from: {}", path.display());

        let file = File::open(path)?;
        let requests: Vec<ReportRequest> = serde_json::from_reader(BufReader::new(file))?;

        tracing::info!("Loaded {} report requests", requests.len());
        Ok(requests)
    }

    /// Parse a JSON array of report requests
    pub fn parse_batch(content: &str) -> Result<Vec<ReportRequest>> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Build the zip download URL for a dashboard
///
/// `host` must not carry a trailing slash. The filter is serialized to JSON and
/// percent-encoded into the `filters` query parameter.
pub fn download_url(host: &str, report: &ReportId, filter: &Filter) -> Result<String> {
    let filters = serde_json::to_string(filter)?;
    Ok(format!(
        "{}/dashboards/{}/downloadzip?filters={}",
        host,
        urlencoding::encode(report.as_str()),
        urlencoding::encode(&filters)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_id_accepts_numbers_and_strings() {
        let numeric: ReportId = serde_json::from_str("42").unwrap();
        let text: ReportId = serde_json::from_str("\"sales::overview\"").unwrap();

        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text.as_str(), "sales::overview");
    }

    #[test]
    fn test_parse_batch() {
        let json = r#"[
            {"report": 42, "filter": {"Year": "Current Year"}, "destination": "out/a.csv"},
            {"report": "17", "destination": "out/b.csv"}
        ]"#;

        let requests = ReportRequest::parse_batch(json).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].report, ReportId::from(42));
        assert_eq!(requests[0].filter.get("Year").unwrap(), "Current Year");
        assert_eq!(requests[1].destination, PathBuf::from("out/b.csv"));
        assert!(requests[1].filter.is_empty());
    }

    #[test]
    fn test_parse_batch_rejects_missing_destination() {
        let result = ReportRequest::parse_batch(r#"[{"report": 1}]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_batch_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            r#"[{"report": 7, "filter": {}, "destination": "r.csv"}]"#,
        )
        .unwrap();

        let requests = ReportRequest::load_batch(temp.path()).unwrap();
        assert_eq!(requests[0].report.as_str(), "7");
    }

    #[test]
    fn test_download_url_encodes_filter() {
        let mut filter = Filter::new();
        filter.insert("Year".to_string(), "Current Year".to_string());

        let url = download_url("https://looker.example.com", &ReportId::from(42), &filter).unwrap();

        assert_eq!(
            url,
            "https://looker.example.com/dashboards/42/downloadzip?filters=%7B%22Year%22%3A%22Current%20Year%22%7D"
        );
    }

    #[test]
    fn test_download_url_with_empty_filter() {
        let url = download_url("http://localhost:9999", &ReportId::from("7"), &Filter::new()).unwrap();
        assert!(url.ends_with("/dashboards/7/downloadzip?filters=%7B%7D"));
    }
}
