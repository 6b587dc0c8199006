use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::error::{RecapError, TransportError};

/// Body of `POST /api/process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channel: String,
    #[serde(
        rename = "duration",
        alias = "duration_seconds",
        default,
        deserialize_with = "whole_seconds"
    )]
    pub duration_seconds: u64,
    #[serde(
        rename = "thumbnail",
        alias = "thumbnail_url",
        default,
        deserialize_with = "null_as_default"
    )]
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub summary: String,
    /// Display string such as `MM:SS`. Empty when the service had none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
}

/// Term to definition mapping that keeps the order terms arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Terminology(Vec<(String, String)>);

impl Terminology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a term. A term seen before keeps its position and takes the new
    /// definition.
    pub fn insert(&mut self, term: impl Into<String>, definition: impl Into<String>) {
        let term = term.into();
        let definition = definition.into();
        match self.0.iter_mut().find(|(t, _)| *t == term) {
            Some(entry) => entry.1 = definition,
            None => self.0.push((term, definition)),
        }
    }

    pub fn get(&self, term: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, d)| d.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(t, d)| (t.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Into<String>, D: Into<String>> FromIterator<(T, D)> for Terminology {
    fn from_iter<I: IntoIterator<Item = (T, D)>>(iter: I) -> Self {
        let mut terminology = Terminology::new();
        for (term, definition) in iter {
            terminology.insert(term, definition);
        }
        terminology
    }
}

impl Serialize for Terminology {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (term, definition) in &self.0 {
            map.serialize_entry(term, definition)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Terminology {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TerminologyVisitor;

        impl<'de> Visitor<'de> for TerminologyVisitor {
            type Value = Terminology;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of term to definition")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut terminology = Terminology::new();
                while let Some((term, definition)) = access.next_entry::<String, String>()? {
                    terminology.insert(term, definition);
                }
                Ok(terminology)
            }
        }

        deserializer.deserialize_map(TerminologyVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_points: Vec<KeyPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chapters: Vec<Chapter>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub terminology: Terminology,
}

/// A successful analysis. Only ever built from a response whose status was
/// `"success"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub video_info: VideoInfo,
    pub summary: StructuredSummary,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
}

/// A parsed `/api/process` body, classified by its `status` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResponse {
    Success(SummaryResult),
    Failure {
        status: Option<String>,
        message: Option<String>,
    },
}

pub const SUCCESS_STATUS: &str = "success";

impl ProcessResponse {
    /// Classifies a raw body. Unparseable bodies, and success bodies that do
    /// not carry a complete summary, are transport failures.
    pub fn from_body(body: &str) -> Result<Self, TransportError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        let status = value.get("status").and_then(|s| s.as_str());

        // Decode from the raw text so terminology keeps its source order.
        if status == Some(SUCCESS_STATUS) {
            return Ok(ProcessResponse::Success(serde_json::from_str(body)?));
        }

        Ok(ProcessResponse::Failure {
            status: status.map(str::to_string),
            message: value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
        })
    }

    pub fn into_result(self) -> crate::error::Result<SummaryResult> {
        match self {
            ProcessResponse::Success(result) => Ok(result),
            ProcessResponse::Failure { message, .. } => Err(RecapError::service(message)),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn whole_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSeconds {
        Whole(u64),
        Fractional(f64),
    }

    Ok(match Option::<RawSeconds>::deserialize(deserializer)? {
        Some(RawSeconds::Whole(secs)) => secs,
        Some(RawSeconds::Fractional(secs)) if secs.is_finite() && secs > 0.0 => secs.floor() as u64,
        _ => 0,
    })
}
