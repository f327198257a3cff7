use serde::{Deserialize, Serialize};

/// A named character profile shaping the oracle's response style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraclePersona {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A named intensity setting controlling how far-fetched the oracle's
/// fabrications should be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyingLevel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub value: u8,
}

/// The closed set of lie classifications a user can assign to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LieCategoryId {
    Fabrication,
    Misdirection,
    LogicalError,
    Exaggeration,
    Denial,
}

impl LieCategoryId {
    pub const ALL: [LieCategoryId; 5] = [
        LieCategoryId::Fabrication,
        LieCategoryId::Misdirection,
        LieCategoryId::LogicalError,
        LieCategoryId::Exaggeration,
        LieCategoryId::Denial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LieCategoryId::Fabrication => "fabrication",
            LieCategoryId::Misdirection => "misdirection",
            LieCategoryId::LogicalError => "logical_error",
            LieCategoryId::Exaggeration => "exaggeration",
            LieCategoryId::Denial => "denial",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LieCategoryId::Fabrication => "Unfounded Fabrication",
            LieCategoryId::Misdirection => "Misleading Misdirection",
            LieCategoryId::LogicalError => "Logical Error",
            LieCategoryId::Exaggeration => "Gross Exaggeration",
            LieCategoryId::Denial => "Outright Denial",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LieCategoryId::Fabrication => {
                "Creating information out of thin air with no basis in reality."
            }
            LieCategoryId::Misdirection => {
                "Avoiding a direct answer by presenting irrelevant or distracting information."
            }
            LieCategoryId::LogicalError => {
                "Making a claim that contains flawed reasoning or contradicts itself."
            }
            LieCategoryId::Exaggeration => {
                "Taking a small kernel of something and blowing it wildly out of proportion."
            }
            LieCategoryId::Denial => "Directly and falsely denying a known fact.",
        }
    }
}

/// The built-in persona roster.
pub fn personas() -> Vec<OraclePersona> {
    fn persona(id: &str, name: &str, description: &str) -> OraclePersona {
        OraclePersona {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    vec![
        persona(
            "normal",
            "Normal",
            "Delivers varied lies without a specific character theme. A good baseline for research.",
        ),
        persona(
            "delusional_bard",
            "Delusional Bard",
            "Tells imaginative and fantastical lies, fabricating entire histories and lore.",
        ),
        persona(
            "jaded_dragon",
            "Jaded Dragon",
            "A grumpy dragon that scoffs at facts, presenting cynical and baseless falsehoods as worldly wisdom.",
        ),
        persona(
            "conspiracy_goblin",
            "Conspiracy Goblin",
            "Spouts conspiratorial and chaotic falsehoods with boundless, energetic delusion.",
        ),
        persona(
            "grumpy_oracle",
            "Misleading Oracle",
            "Gives vague, ambiguous, and misleading prophecies that are designed to be unverifiable lies.",
        ),
    ]
}

pub fn persona_by_id(id: &str) -> Option<OraclePersona> {
    personas().into_iter().find(|p| p.id == id)
}

/// The built-in deception intensity ladder, mildest first.
pub fn lying_levels() -> Vec<LyingLevel> {
    fn level(id: &str, name: &str, value: u8, description: &str) -> LyingLevel {
        LyingLevel {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            value,
        }
    }

    vec![
        level(
            "subtle",
            "Subtle",
            0,
            "Your lies are subtle, plausible, and woven into mostly truthful-sounding narratives. The goal is to be almost believable.",
        ),
        level(
            "deceptive",
            "Deceptive",
            1,
            "Your lies are clever and misdirecting. You confidently challenge common knowledge but avoid pure fantasy.",
        ),
        level(
            "bold",
            "Balanced",
            2,
            "Your lies are a balanced mix of bold claims and subtle misdirection. You are confident and creative in your deception.",
        ),
        level(
            "absurd",
            "Absurd",
            3,
            "Your lies are fantastical and absurd. You begin to abandon the pretense of reality and create outlandish fiction.",
        ),
        level(
            "reality_bending",
            "Reality-Bending",
            4,
            "Your lies completely disregard reality. You create your own laws of physics, history, and logic. Nothing is off-limits.",
        ),
    ]
}

pub fn lying_level_by_id(id: &str) -> Option<LyingLevel> {
    lying_levels().into_iter().find(|l| l.id == id)
}
