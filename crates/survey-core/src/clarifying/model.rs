//! Clarifying question domain models.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// One of the three specification-completeness aspects checked in an
/// intent description.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
    /// The "things" the app manages (tasks, lists, projects...)
    Entities,
    /// What the user does with them (add, complete, delete...)
    Actions,
    /// How the data is presented (list, calendar, board...)
    Views,
}

/// A canned follow-up prompt issued when a dimension is judged missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarifyingQuestion {
    /// Stable identifier, also the key in the Answer Set's response map
    pub id: &'static str,
    /// Ascending = more important
    pub priority: u8,
    pub category: Dimension,
    pub question_text: &'static str,
    pub placeholder_text: &'static str,
}

/// The fixed question bank, in priority order. Never mutated.
pub const QUESTION_BANK: [ClarifyingQuestion; 3] = [
    ClarifyingQuestion {
        id: "entities",
        priority: 1,
        category: Dimension::Entities,
        question_text: "What are the main 'things' in your app? (e.g., tasks, lists, categories, projects)",
        placeholder_text: "For example: tasks, to-do items, lists, tags, projects...",
    },
    ClarifyingQuestion {
        id: "actions",
        priority: 2,
        category: Dimension::Actions,
        question_text: "What would you want to do with this app? (e.g., add, complete, organize, delete)",
        placeholder_text: "For example: create tasks, mark complete, set due dates, organize by priority...",
    },
    ClarifyingQuestion {
        id: "views",
        priority: 3,
        category: Dimension::Views,
        question_text: "How would you want to see your data? (e.g., a list, calendar, grouped by project)",
        placeholder_text: "For example: simple list, calendar view, kanban board, grouped by category...",
    },
];

impl ClarifyingQuestion {
    /// Looks up a question in the bank by its id.
    pub fn by_id(id: &str) -> Option<&'static ClarifyingQuestion> {
        QUESTION_BANK.iter().find(|q| q.id == id)
    }

    /// The bank entry for a dimension.
    pub fn for_dimension(dimension: Dimension) -> &'static ClarifyingQuestion {
        match dimension {
            Dimension::Entities => &QUESTION_BANK[0],
            Dimension::Actions => &QUESTION_BANK[1],
            Dimension::Views => &QUESTION_BANK[2],
        }
    }
}
