// Process-wide constants, with env overrides where deployment needs them.

use std::env;

/// System instruction steering every model call: the six-layer cognitive
/// tagging protocol as a JSON blob. Set once, never mutated.
pub const SYSTEM_INSTRUCTION: &str = r#"{
  "protocol_name": "Cognitive_Tagging_6Layers",
  "description": "Information structuring protocol to minimize semantic drift and hallucinations.",
  "layers": {
    "L1_Surface": {
      "desc": "Category or Topic",
      "example": ["AI", "Economics"]
    },
    "L2_Structure": {
      "desc": "Mechanism, Causality, Pattern",
      "example": ["Integration", "Feedback Loop"]
    },
    "L3_Context": {
      "desc": "Time, Culture, History",
      "example": ["2025s", "Post-Modern"]
    },
    "L4_Philosophy": {
      "desc": "Values, Beliefs, Ethics",
      "example": ["Rationality", "Open Source Spirit"]
    },
    "L5_Cognition": {
      "desc": "Sensation, Aesthetic, Vibe",
      "example": ["Immersive", "Minimalist"]
    },
    "L6_Meta": {
      "desc": "Operational Rules",
      "example": ["Use Python", "Output as JSON"]
    }
  },
  "instruction": "Analyze the user input based on these 6 layers before generating a response. Output must include specific analysis for each layer (L1-L6) and a final structural conclusion."
}"#;

pub const PAGE_TITLE: &str = "Tag-VI";
pub const PAGE_DESCRIPTION: &str = "Describe a problem or challenge you are wrestling with. \
    Tag-VI analyzes it through the six-layer cognitive tagging protocol and proposes a structural solution.";
pub const INPUT_PLACEHOLDER: &str = "e.g. Our field crew is slow to adopt new tools...";
pub const BUSY_MESSAGE: &str = "Analyzing with the six-layer tagging protocol...";

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

lazy_static::lazy_static! {
    pub static ref TAGVI_MODEL: String = env::var("TAGVI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
    pub static ref GEMINI_API_BASE: String = env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_is_valid_json() {
        let value: serde_json::Value =
            serde_json::from_str(SYSTEM_INSTRUCTION).expect("system instruction must parse");
        assert_eq!(value["protocol_name"], "Cognitive_Tagging_6Layers");
        let layers = value["layers"].as_object().unwrap();
        assert_eq!(layers.len(), 6);
        assert!(layers.contains_key("L1_Surface"));
        assert!(layers.contains_key("L6_Meta"));
    }
}
