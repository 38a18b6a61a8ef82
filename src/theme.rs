use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub card_fill: String,
    pub card_border: String,
    pub name_color: String,
    pub title_color: String,
    pub division_color: String,
    pub detail_color: String,
    pub link_color: String,
    pub highlight_color: String,
    pub toggle_fill: String,
    pub toggle_text: String,
    pub avatar_fill: String,
    pub avatar_text: String,
    pub placeholder_text: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Segoe UI\", wf_segoe-ui_normal, helvetica, arial, sans-serif"
                .to_string(),
            background: "#FFFFFF".to_string(),
            card_fill: "#FFFFFF".to_string(),
            card_border: "#C8C8C8".to_string(),
            name_color: "#252423".to_string(),
            title_color: "#605E5C".to_string(),
            division_color: "#118DFF".to_string(),
            detail_color: "#605E5C".to_string(),
            link_color: "#A19F9D".to_string(),
            highlight_color: "#F2C80F".to_string(),
            toggle_fill: "#118DFF".to_string(),
            toggle_text: "#FFFFFF".to_string(),
            avatar_fill: "#E1DFDD".to_string(),
            avatar_text: "#252423".to_string(),
            placeholder_text: "#605E5C".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#F7FAFF".to_string(),
            card_fill: "#FFFFFF".to_string(),
            card_border: "#D7E0F0".to_string(),
            name_color: "#1C2430".to_string(),
            title_color: "#4A5568".to_string(),
            division_color: "#3B6FD8".to_string(),
            detail_color: "#5B6B82".to_string(),
            link_color: "#7A8AA6".to_string(),
            highlight_color: "#FFB020".to_string(),
            toggle_fill: "#3B6FD8".to_string(),
            toggle_text: "#FFFFFF".to_string(),
            avatar_fill: "#EEF2F8".to_string(),
            avatar_text: "#1C2430".to_string(),
            placeholder_text: "#7A8AA6".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
