//! Prompt text sent to the story and image models.

/// Opening action that kicks off a new adventure.
pub const INITIAL_PROMPT: &str = "Start a new fantasy adventure. The player wakes up in a mysterious location. Briefly describe the setting and provide 3 initial choices.";

/// System instruction for the story model.
pub const SYSTEM_INSTRUCTION: &str = r#"You are an advanced Dungeon Master for a text-based Choose Your Own Adventure game.
Your goal is to create an immersive, infinite story where the user's choices genuinely alter the plot.

RULES:
1. Manage the player's INVENTORY and CURRENT QUEST automatically.
2. If the user finds an item, add it to inventory. If they use/lose it, remove it.
3. Update the Quest based on narrative progression.
4. Provide 3 distinct choices at the end of each turn, but acknowledge the user can type anything.
5. Maintain a consistent tone: Epic, slightly dark fantasy, high stakes.
6. Output JSON matching the schema provided."#;

/// Art direction prepended to every scene prompt so images share a style.
pub const IMAGE_STYLE_PREFIX: &str = "Art style: Digital oil painting, fantasy concept art, high detail, atmospheric lighting, cinematic composition. ";

/// Aspect ratio requested for scene images.
pub const SCENE_ASPECT_RATIO: &str = "16:9";

/// Build the full image prompt for a scene description.
pub fn scene_prompt(description: &str) -> String {
    format!("{IMAGE_STYLE_PREFIX}{description}")
}
