//! Structured story output and the schema that constrains it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One turn of story as produced by the story model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    /// The next segment of the story.
    pub narrative: String,
    /// Full inventory after this turn.
    pub inventory: Vec<String>,
    /// Current quest or objective.
    pub quest: String,
    /// Suggested next actions.
    pub choices: Vec<String>,
    /// Visual description handed to the image model.
    pub image_prompt: String,
}

impl StoryResponse {
    /// Parse the model's JSON text.
    ///
    /// Models occasionally wrap JSON in a markdown fence even in JSON mode,
    /// so a surrounding ```json fence is stripped first.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(strip_code_fence(text))
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Response schema for the story model.
pub fn story_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "narrative": {
                "type": "STRING",
                "description": "The next segment of the story. Be descriptive, immersive, and engaging. About 100-150 words."
            },
            "inventory": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "The updated list of items in the player's inventory based on the story events."
            },
            "quest": {
                "type": "STRING",
                "description": "The current active quest or objective for the player."
            },
            "choices": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3 distinct choices for the player to take next."
            },
            "imagePrompt": {
                "type": "STRING",
                "description": "A detailed visual description of the current scene for an image generator. Focus on environment, mood, and key characters. Do not include text instructions."
            }
        },
        "required": ["narrative", "inventory", "quest", "choices", "imagePrompt"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "narrative": "You wake in a **crypt**.",
        "inventory": ["Torch"],
        "quest": "Escape the crypt",
        "choices": ["Light the torch", "Call out", "Search the sarcophagus"],
        "imagePrompt": "A dim crypt lit by a single torch"
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let story = StoryResponse::parse(SAMPLE).unwrap();
        assert_eq!(story.inventory, vec!["Torch"]);
        assert_eq!(story.choices.len(), 3);
        assert_eq!(story.image_prompt, "A dim crypt lit by a single torch");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{SAMPLE}\n```");
        let story = StoryResponse::parse(&fenced).unwrap();
        assert_eq!(story.quest, "Escape the crypt");
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let text = r#"{"narrative": "x", "inventory": [], "quest": "q", "choices": []}"#;
        assert!(StoryResponse::parse(text).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_text() {
        assert!(StoryResponse::parse("   ").is_err());
    }

    #[test]
    fn test_schema_requires_every_field() {
        let schema = story_schema();
        assert_eq!(schema["type"], "OBJECT");
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        for field in ["narrative", "inventory", "quest", "choices", "imagePrompt"] {
            assert!(required.contains(&field), "{field} should be required");
            assert!(schema["properties"][field].is_object());
        }
        assert_eq!(schema["properties"]["choices"]["items"]["type"], "STRING");
    }

    #[test]
    fn test_serializes_image_prompt_camel_case() {
        let story = StoryResponse::parse(SAMPLE).unwrap();
        let value = serde_json::to_value(&story).unwrap();
        assert!(value.get("imagePrompt").is_some());
    }
}
