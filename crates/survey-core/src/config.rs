//! Survey definitions and the registry they are looked up in.
//!
//! A survey is described declaratively: which stimuli exist, which optional
//! features are on, and the copy shown on each screen. The registry is a
//! plain value built once at startup and passed to whoever needs it.

use serde::{Deserialize, Serialize};

/// A scenario prompt the participant is asked to describe an app for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StimulusConfig {
    /// e.g. `todo_app`
    pub id: String,
    pub name: String,
    pub description: String,
    pub familiarity_question: String,
}

/// Optional survey features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyFeatures {
    /// Show follow-up questions for dimensions missing from the intent text
    pub clarifying_questions: bool,
    /// Card sort exercise; no screen exists for it yet
    pub card_sort: bool,
}

impl Default for SurveyFeatures {
    fn default() -> Self {
        Self {
            clarifying_questions: true,
            card_sort: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenCopy {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

impl ScreenCopy {
    fn new(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        }
    }
}

/// UI text for every screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyCopy {
    pub welcome: ScreenCopy,
    pub consent_statement: String,
    pub intake: ScreenCopy,
    pub intent_capture: ScreenCopy,
    pub intent_placeholder: String,
    pub hints: Vec<String>,
    pub clarifying_questions: ScreenCopy,
    pub clarifying_skip_label: String,
    pub reflection: ScreenCopy,
    pub thank_you: ScreenCopy,
    pub thank_you_follow_up: String,
}

/// A complete survey definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyConfig {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub stimuli: Vec<StimulusConfig>,
    pub default_stimulus: String,
    pub features: SurveyFeatures,
    pub copy: SurveyCopy,
}

impl SurveyConfig {
    /// Looks up a stimulus by id.
    pub fn stimulus(&self, id: &str) -> Option<&StimulusConfig> {
        self.stimuli.iter().find(|s| s.id == id)
    }

    /// The default stimulus, or the first one if the default id is unknown.
    pub fn default_stimulus(&self) -> Option<&StimulusConfig> {
        self.stimulus(&self.default_stimulus)
            .or_else(|| self.stimuli.first())
    }

    /// The document structure & information architecture study.
    pub fn document_structure_ia() -> Self {
        Self {
            id: "document-structure-ia".to_string(),
            name: "Document Structure & IA Research".to_string(),
            version: "1.1.0".to_string(),
            description: "Research how different user segments naturally structure and organize application documentation.".to_string(),
            stimuli: vec![StimulusConfig {
                id: "todo_app".to_string(),
                name: "Todo App".to_string(),
                description: "Imagine you want to build a simple Todo App, one that actually works the way you think. Don't worry about technical details or how other apps work. Just describe what you'd want it to do for you.".to_string(),
                familiarity_question: "How familiar are you with todo apps?".to_string(),
            }],
            default_stimulus: "todo_app".to_string(),
            features: SurveyFeatures::default(),
            copy: SurveyCopy {
                welcome: ScreenCopy::new(
                    "Help us understand how people naturally describe software",
                    "We're researching how different people think about and describe applications. This will take 10-15 minutes. Your responses help us build better tools.",
                ),
                consent_statement: "I understand my responses will be used for research purposes and may be anonymized and shared.".to_string(),
                intake: ScreenCopy::new("Tell us a bit about yourself", ""),
                intent_capture: ScreenCopy::new(
                    "Describe the app you wish existed",
                    "Write as much or as little as you want. There's no right or wrong answer.",
                ),
                intent_placeholder: "Start describing your todo app idea here...".to_string(),
                hints: vec![
                    "What would someone do with this app?".to_string(),
                    "What information would it need to track?".to_string(),
                    "How would it look or feel to use?".to_string(),
                ],
                clarifying_questions: ScreenCopy::new(
                    "A few follow-up questions",
                    "Based on your description, we have a few clarifying questions. These are optional.",
                ),
                clarifying_skip_label: "Skip this section".to_string(),
                reflection: ScreenCopy::new(
                    "Almost done",
                    "A few quick reflections on your thought process.",
                ),
                thank_you: ScreenCopy::new(
                    "Thank you!",
                    "Your responses have been saved. We really appreciate you taking the time to help us research this.",
                ),
                thank_you_follow_up: "We'll reach out soon if you opted for a follow-up.".to_string(),
            },
        }
    }
}

/// Registry of available surveys, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SurveyRegistry {
    surveys: Vec<SurveyConfig>,
}

impl SurveyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every survey shipped with the application.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(SurveyConfig::document_structure_ia());
        registry
    }

    /// Registers a survey, replacing any earlier one with the same id.
    pub fn register(&mut self, config: SurveyConfig) {
        match self.surveys.iter_mut().find(|s| s.id == config.id) {
            Some(existing) => *existing = config,
            None => self.surveys.push(config),
        }
    }

    pub fn get(&self, id: &str) -> Option<&SurveyConfig> {
        self.surveys.iter().find(|s| s.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.surveys.iter().map(|s| s.id.as_str()).collect()
    }

    /// The first registered survey.
    pub fn default_survey(&self) -> Option<&SurveyConfig> {
        self.surveys.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = SurveyRegistry::builtin();
        assert_eq!(registry.ids(), vec!["document-structure-ia"]);
        let survey = registry.default_survey().unwrap();
        assert!(survey.features.clarifying_questions);
        assert!(!survey.features.card_sort);
        assert_eq!(survey.default_stimulus().unwrap().id, "todo_app");
        assert_eq!(survey.copy.hints.len(), 3);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = SurveyRegistry::builtin();
        let mut updated = SurveyConfig::document_structure_ia();
        updated.version = "2.0.0".to_string();
        registry.register(updated);

        assert_eq!(registry.ids().len(), 1);
        assert_eq!(registry.get("document-structure-ia").unwrap().version, "2.0.0");
    }

    #[test]
    fn test_unknown_survey() {
        let registry = SurveyRegistry::new();
        assert!(registry.get("missing").is_none());
        assert!(registry.default_survey().is_none());
    }

    #[test]
    fn test_default_stimulus_falls_back_to_first() {
        let mut survey = SurveyConfig::document_structure_ia();
        survey.default_stimulus = "booking_system".to_string();
        assert_eq!(survey.default_stimulus().unwrap().id, "todo_app");
    }
}
