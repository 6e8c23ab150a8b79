//! Application settings: server binding and national ranking rules.

use crate::models::PointScale;

pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub database_path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: "carom_tournament.db".to_string(),
        }
    }
}

impl ServerSettings {
    /// Defaults overridden by `HOST`, `PORT` and `DATABASE_PATH`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RankingSettings {
    pub point_scale: PointScale,
    /// Trailing window of the national score.
    pub window_months: u32,
    /// Results counted for category A players.
    pub top_results: usize,
    pub category_a_min: usize,
    pub category_b_min: usize,
    /// Tournaments whose name contains one of these (case-insensitive) never count.
    pub excluded_name_markers: Vec<String>,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            point_scale: PointScale::default(),
            window_months: 12,
            top_results: 5,
            category_a_min: 5,
            category_b_min: 3,
            excluded_name_markers: ["test", "prueba", "practice", "practica"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl RankingSettings {
    pub fn is_excluded(&self, tournament_name: &str) -> bool {
        let name = tournament_name.to_lowercase();
        self.excluded_name_markers
            .iter()
            .any(|marker| name.contains(marker.as_str()))
    }
}

#[derive(Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub ranking: RankingSettings,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings::from_env(),
            ranking: RankingSettings::default(),
        }
    }
}
