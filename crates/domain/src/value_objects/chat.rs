//! NPC dialogue value objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest relationship swing a single model reply may apply.
pub const RELATIONSHIP_CHANGE_BOUND: i32 = 10;

/// One line of conversation history as the client stores it.
///
/// `role` is `"player"` for the player's own lines; the client writes the NPC's
/// name (or anything else) for replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn player(content: impl Into<String>) -> Self {
        Self {
            role: "player".to_string(),
            content: content.into(),
        }
    }

    pub fn npc(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: name.into(),
            content: content.into(),
        }
    }

    pub fn is_player(&self) -> bool {
        self.role == "player"
    }
}

/// Emotion an NPC displays alongside a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    #[default]
    Neutral,
    Angry,
    Sad,
    Surprised,
    Contempt,
    Jealous,
}

impl Emotion {
    pub fn all() -> &'static [Emotion] {
        &[
            Emotion::Happy,
            Emotion::Neutral,
            Emotion::Angry,
            Emotion::Sad,
            Emotion::Surprised,
            Emotion::Contempt,
            Emotion::Jealous,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Neutral => "neutral",
            Emotion::Angry => "angry",
            Emotion::Sad => "sad",
            Emotion::Surprised => "surprised",
            Emotion::Contempt => "contempt",
            Emotion::Jealous => "jealous",
        }
    }

    /// Parse whatever the model wrote; anything unrecognised reads as neutral.
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        Self::all()
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(raw))
            .unwrap_or_default()
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `/api/chat` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcReply {
    pub npc_response: String,
    #[serde(default)]
    pub emotion: Emotion,
    #[serde(default)]
    pub relationship_change: i32,
}

impl NpcReply {
    pub fn neutral(text: impl Into<String>) -> Self {
        Self {
            npc_response: text.into(),
            emotion: Emotion::Neutral,
            relationship_change: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_parse_is_lenient() {
        assert_eq!(Emotion::parse_lenient("ANGRY"), Emotion::Angry);
        assert_eq!(Emotion::parse_lenient(" jealous "), Emotion::Jealous);
        assert_eq!(Emotion::parse_lenient("smug"), Emotion::Neutral);
    }

    #[test]
    fn reply_serializes_emotion_as_snake_case() {
        let reply = NpcReply {
            npc_response: "好的。".to_string(),
            emotion: Emotion::Surprised,
            relationship_change: 3,
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["emotion"], "surprised");
        assert_eq!(json["relationship_change"], 3);
    }

    #[test]
    fn chat_turn_role_detection() {
        assert!(ChatTurn::player("你好").is_player());
        assert!(!ChatTurn::npc("张经理", "嗯").is_player());
    }
}
