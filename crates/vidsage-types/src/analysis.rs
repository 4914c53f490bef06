use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Analysis tag as chosen in the sidebar
///
/// Unknown tags are kept verbatim so they travel back to the caller unchanged,
/// but they are analysed as open-ended questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Summary,
    Chapters,
    Highlights,
    Search,
    OpenEnded,
    Other(String),
}

impl AnalysisKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "summary" => AnalysisKind::Summary,
            "chapters" => AnalysisKind::Chapters,
            "highlights" => AnalysisKind::Highlights,
            "search" => AnalysisKind::Search,
            "open-ended" => AnalysisKind::OpenEnded,
            other => AnalysisKind::Other(other.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::Chapters => "chapters",
            AnalysisKind::Highlights => "highlights",
            AnalysisKind::Search => "search",
            AnalysisKind::OpenEnded => "open-ended",
            AnalysisKind::Other(tag) => tag,
        }
    }

    pub fn backend_type(&self) -> BackendAnalysisType {
        match self {
            AnalysisKind::Summary => BackendAnalysisType::Summary,
            AnalysisKind::Chapters => BackendAnalysisType::Chapter,
            AnalysisKind::Highlights => BackendAnalysisType::Highlight,
            AnalysisKind::Search | AnalysisKind::OpenEnded | AnalysisKind::Other(_) => {
                BackendAnalysisType::OpenEnded
            }
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl Serialize for AnalysisKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for AnalysisKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(AnalysisKind::from_tag(&tag))
    }
}

/// Analysis vocabulary understood by `/api/analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendAnalysisType {
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "chapter")]
    Chapter,
    #[serde(rename = "highlight")]
    Highlight,
    #[serde(rename = "open-ended")]
    OpenEnded,
}

impl BackendAnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendAnalysisType::Summary => "summary",
            BackendAnalysisType::Chapter => "chapter",
            BackendAnalysisType::Highlight => "highlight",
            BackendAnalysisType::OpenEnded => "open-ended",
        }
    }
}

impl fmt::Display for BackendAnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of an analyze call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeParams {
    /// Backend video identifier
    pub video_id: String,
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

impl AnalyzeParams {
    pub fn new(video_id: impl Into<String>, kind: AnalysisKind) -> Self {
        Self {
            video_id: video_id.into(),
            kind,
            prompt: None,
            custom_prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    /// Prompt sent to the backend; a custom prompt wins over the preset one
    pub fn effective_prompt(&self) -> Option<&str> {
        self.custom_prompt
            .as_deref()
            .filter(|p| !p.is_empty())
            .or_else(|| self.prompt.as_deref().filter(|p| !p.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_mapping() {
        let cases = [
            ("summary", BackendAnalysisType::Summary),
            ("chapters", BackendAnalysisType::Chapter),
            ("highlights", BackendAnalysisType::Highlight),
            ("search", BackendAnalysisType::OpenEnded),
            ("open-ended", BackendAnalysisType::OpenEnded),
            ("vibes", BackendAnalysisType::OpenEnded),
            ("", BackendAnalysisType::OpenEnded),
        ];

        for (tag, expected) in cases {
            assert_eq!(AnalysisKind::from_tag(tag).backend_type(), expected, "tag {:?}", tag);
        }
    }

    #[test]
    fn test_unknown_tag_round_trips_verbatim() {
        let kind: AnalysisKind = serde_json::from_str(r#""vibes""#).unwrap();
        assert_eq!(kind, AnalysisKind::Other("vibes".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), r#""vibes""#);
    }

    #[test]
    fn test_custom_prompt_wins() {
        let params = AnalyzeParams::new("tl_1", AnalysisKind::Search)
            .with_prompt("preset")
            .with_custom_prompt("what is said at 2:00?");
        assert_eq!(params.effective_prompt(), Some("what is said at 2:00?"));

        let params = AnalyzeParams::new("tl_1", AnalysisKind::Summary).with_custom_prompt("");
        assert_eq!(params.effective_prompt(), None);
    }

    #[test]
    fn test_params_wire_shape() {
        let params: AnalyzeParams = serde_json::from_str(
            r#"{"videoId":"tl_1","type":"chapters","customPrompt":"short"}"#,
        )
        .unwrap();

        assert_eq!(params.kind, AnalysisKind::Chapters);
        assert_eq!(params.prompt, None);
        assert_eq!(params.effective_prompt(), Some("short"));
    }
}
