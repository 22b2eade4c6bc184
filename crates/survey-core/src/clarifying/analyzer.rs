//! Dimension analyzer.
//!
//! Decides which clarifying questions to ask by checking an intent
//! description for whole-word keyword mentions of each dimension.
//! Pure and deterministic: no state, no I/O.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{ClarifyingQuestion, Dimension, QUESTION_BANK};

/// Descriptions shorter than this (after trimming) carry too little signal
/// to discriminate, so every question is asked up to the cap.
pub const MIN_ANALYZABLE_CHARS: usize = 50;

/// Default cap on questions shown to one participant.
pub const MAX_QUESTIONS: usize = 3;

const ENTITY_KEYWORDS: &[&str] = &[
    "task", "tasks", "todo", "to-do", "item", "items", "list", "lists", "category",
    "categories", "project", "projects", "tag", "tags", "label", "labels", "folder", "folders",
    "note", "notes", "reminder", "reminders", "thing", "things", "goal", "goals", "subtask",
    "subtasks",
];

const ACTION_KEYWORDS: &[&str] = &[
    "add", "create", "make", "new", "complete", "finish", "done", "check", "mark", "delete",
    "remove", "archive", "trash", "edit", "update", "change", "modify", "organize", "sort",
    "filter", "search", "find", "drag", "move", "reorder", "prioritize", "assign", "share",
    "collaborate", "schedule", "set", "due", "deadline", "remind", "notify", "alert",
];

const VIEW_KEYWORDS: &[&str] = &[
    "list", "view", "see", "display", "show", "calendar", "week", "day", "month", "kanban",
    "board", "columns", "lanes", "grid", "table", "group", "grouped", "organize", "organized",
    "dashboard", "overview", "summary", "timeline", "gantt",
];

fn keyword_pattern(keywords: &[&str]) -> Regex {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("keyword pattern is valid")
}

static ENTITY_PATTERN: Lazy<Regex> = Lazy::new(|| keyword_pattern(ENTITY_KEYWORDS));
static ACTION_PATTERN: Lazy<Regex> = Lazy::new(|| keyword_pattern(ACTION_KEYWORDS));
static VIEW_PATTERN: Lazy<Regex> = Lazy::new(|| keyword_pattern(VIEW_KEYWORDS));

fn pattern_for(dimension: Dimension) -> &'static Regex {
    match dimension {
        Dimension::Entities => &ENTITY_PATTERN,
        Dimension::Actions => &ACTION_PATTERN,
        Dimension::Views => &VIEW_PATTERN,
    }
}

/// Returns true if `text` mentions at least one keyword of `dimension`
/// as a whole word, ignoring case.
pub fn covers(text: &str, dimension: Dimension) -> bool {
    pattern_for(dimension).is_match(text)
}

/// Maps an intent description to the ordered list of clarifying questions
/// for the dimensions it leaves out, truncated to `max_questions`.
///
/// # Examples
///
/// ```
/// use survey_core::clarifying::analyze;
///
/// let questions = analyze("", 3);
/// assert_eq!(questions.len(), 3);
/// assert_eq!(questions[0].id, "entities");
/// ```
pub fn analyze(text: &str, max_questions: usize) -> Vec<&'static ClarifyingQuestion> {
    let text = text.trim();

    if text.chars().count() < MIN_ANALYZABLE_CHARS {
        return QUESTION_BANK.iter().take(max_questions).collect();
    }

    QUESTION_BANK
        .iter()
        .filter(|question| !covers(text, question.category))
        .take(max_questions)
        .collect()
}

/// True when [`analyze`] would ask at least one question at the default cap.
pub fn has_missing_dimensions(text: &str) -> bool {
    !analyze(text, MAX_QUESTIONS).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(questions: &[&ClarifyingQuestion]) -> Vec<&'static str> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn test_empty_text_asks_everything() {
        assert_eq!(ids(&analyze("", 3)), vec!["entities", "actions", "views"]);
    }

    #[test]
    fn test_whitespace_only_behaves_as_short() {
        assert_eq!(analyze("   \n\t  ", 2).len(), 2);
    }

    #[test]
    fn test_short_text_ignores_content() {
        // 15 chars: returns everything even though "manage" hints at actions
        assert_eq!(ids(&analyze("manage my stuff", 3)), vec!["entities", "actions", "views"]);
    }

    #[test]
    fn test_short_text_respects_cap() {
        for n in 0..5 {
            assert_eq!(analyze("short", n).len(), n.min(3));
        }
    }

    #[test]
    fn test_zero_cap_returns_nothing() {
        let text = "A long enough description without any of the magic words at all here.";
        assert!(analyze(text, 0).is_empty());
    }

    #[test]
    fn test_entities_and_actions_covered() {
        let text = "I want to add and delete tasks, that is really all I need from it honestly.";
        assert!(text.len() >= MIN_ANALYZABLE_CHARS);
        assert_eq!(ids(&analyze(text, 3)), vec!["views"]);
    }

    #[test]
    fn test_fully_covered_text_asks_nothing() {
        let text = "I would create projects with tasks and see them on a calendar every single week.";
        assert!(analyze(text, 3).is_empty());
        assert!(!has_missing_dimensions(text));
    }

    #[test]
    fn test_word_boundaries_are_respected() {
        // "notebook" must not count as "note", "adding" must not count as "add"
        let text = "My notebook is a mess and I keep adding scribbles everywhere without thinking.";
        assert!(!covers(text, Dimension::Entities));
        assert!(!covers(text, Dimension::Actions));
        assert_eq!(ids(&analyze(text, 3)), vec!["entities", "actions", "views"]);
    }

    #[test]
    fn test_matching_ignores_case() {
        assert!(covers("My TASKS", Dimension::Entities));
        assert!(covers("Kanban please", Dimension::Views));
    }

    #[test]
    fn test_hyphenated_keyword() {
        assert!(covers("a to-do thing", Dimension::Entities));
    }

    #[test]
    fn test_missing_order_is_priority_order() {
        // only actions covered
        let text = "Honestly I would just want to remove stuff whenever it gets way too cluttered.";
        assert_eq!(ids(&analyze(text, 3)), vec!["entities", "views"]);
        assert_eq!(ids(&analyze(text, 1)), vec!["entities"]);
    }

    #[test]
    fn test_deterministic() {
        let text = "Something about organizing my life in a way that finally makes some sense.";
        assert_eq!(analyze(text, 3), analyze(text, 3));
    }
}
