use serde::{Deserialize, Serialize};

/// Fixed set of spending categories, in display order.
///
/// Serialized by label so stored records read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum Category {
    #[serde(rename = "Ăn uống")]
    Food,
    #[serde(rename = "Di chuyển")]
    Transport,
    #[serde(rename = "Mua sắm")]
    Shopping,
    #[serde(rename = "Tiện ích")]
    Utilities,
    #[serde(rename = "Giải trí")]
    Entertainment,
    #[serde(rename = "Khác")]
    Other,
}

impl Category {
    pub(crate) fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Shopping,
            Self::Utilities,
            Self::Entertainment,
            Self::Other,
        ]
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Food => "Ăn uống",
            Self::Transport => "Di chuyển",
            Self::Shopping => "Mua sắm",
            Self::Utilities => "Tiện ích",
            Self::Entertainment => "Giải trí",
            Self::Other => "Khác",
        }
    }

    /// ASCII spelling for typing on a terminal without an IME.
    pub(crate) fn alias(&self) -> &'static str {
        match self {
            Self::Food => "an-uong",
            Self::Transport => "di-chuyen",
            Self::Shopping => "mua-sam",
            Self::Utilities => "tien-ich",
            Self::Entertainment => "giai-tri",
            Self::Other => "khac",
        }
    }

    pub(crate) fn icon(&self) -> &'static str {
        match self {
            Self::Food => "🍜",
            Self::Transport => "🚗",
            Self::Shopping => "🛍",
            Self::Utilities => "⚡",
            Self::Entertainment => "🎮",
            Self::Other => "•",
        }
    }

    /// Case-insensitive match on either the label or the alias.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.label().to_lowercase() == lower || c.alias() == lower)
    }

    /// Next (or previous, for negative `delta`) category in display order, wrapping.
    pub(crate) fn cycle(&self, delta: i32) -> Self {
        let all = Self::all();
        let len = all.len() as i32;
        let idx = all.iter().position(|c| c == self).unwrap_or(0) as i32;
        all[(idx + delta).rem_euclid(len) as usize]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
