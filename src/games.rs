//! Catalog of games shown on the hub page.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Available,
    ComingSoon,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMeta {
    pub slug: &'static str,
    pub title: &'static str,
    pub tagline: &'static str,
    pub status: GameStatus,
    /// Hex colour used for the tile accent
    pub accent: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<&'static str>,
}

pub const GAMES: &[GameMeta] = &[
    GameMeta {
        slug: "truth-or-dare",
        title: "Truth or Dare",
        tagline: "Spin the neon wheel and test your courage.",
        status: GameStatus::Available,
        accent: "#22d3ee",
        hero_image: None,
    },
    GameMeta {
        slug: "trivia-night",
        title: "Trivia Night",
        tagline: "Pull live questions from Open Trivia DB.",
        status: GameStatus::Available,
        accent: "#facc15",
        hero_image: None,
    },
    GameMeta {
        slug: "drawing-telephone",
        title: "Drawing Telephone",
        tagline: "Sketch, guess, and reveal hilarious storyboards.",
        status: GameStatus::ComingSoon,
        accent: "#8b5cf6",
        hero_image: None,
    },
    GameMeta {
        slug: "wavelength-lite",
        title: "Wavelength Lite",
        tagline: "Sync minds and slide to the hidden target.",
        status: GameStatus::ComingSoon,
        accent: "#f97316",
        hero_image: None,
    },
];

pub fn game_by_slug(slug: &str) -> Option<&'static GameMeta> {
    GAMES.iter().find(|game| game.slug == slug)
}
