//! Dashboard Configuration Module
//! Source locations, source schema labels, vehicle categories and the shared palette.

use egui::Color32;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub sources: SourceFiles,
    pub schema: SourceSchema,
    pub vehicle_categories: Vec<VehicleCategory>,
    pub palette: Palette,
    pub top_n: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            sources: SourceFiles::default(),
            schema: SourceSchema::default(),
            vehicle_categories: VehicleCategory::defaults(),
            palette: Palette::default(),
            top_n: 10,
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON config file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Full path of a source file inside the data directory.
    pub fn source_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

/// File names of the five sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub causes: String,
    pub classes: String,
    pub types: String,
    pub victims: String,
    pub vehicles: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            causes: "accidentes_causa_inegi.xlsx".to_string(),
            classes: "accidentes_clase_inegi.xlsx".to_string(),
            types: "accidentes_tipo.xlsx".to_string(),
            victims: "victimas_inegi.xlsx".to_string(),
            vehicles: "vmrc.xlsx".to_string(),
        }
    }
}

/// Labels as they appear in the source spreadsheets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceSchema {
    pub entity_column: String,
    pub variable_column: String,
    pub national: String,
    pub absolute_marker: String,
    pub total_events: String,
    pub fatalities: String,
    pub injuries: String,
    pub fatal_class: String,
    pub vehicle_entity_column: String,
    pub vehicle_total_column: String,
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self {
            entity_column: "Entidad".to_string(),
            variable_column: "Variable".to_string(),
            national: "Nacional".to_string(),
            absolute_marker: " (Absoluto)".to_string(),
            total_events: "Total de eventos (Absoluto)".to_string(),
            fatalities: "Total de víctimas muertas (Absoluto)".to_string(),
            injuries: "Total de víctimas heridas (Absoluto)".to_string(),
            fatal_class: "Fatal (Absoluto)".to_string(),
            vehicle_entity_column: "ENTIDAD FEDERATIVA".to_string(),
            vehicle_total_column: "TOTAL".to_string(),
        }
    }
}

/// A vehicle-registration category with its marketing phrase.
///
/// `phrase` holds an `{entity}` placeholder.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleCategory {
    pub column: String,
    pub label: String,
    pub phrase: String,
}

impl VehicleCategory {
    fn new(column: &str, label: &str, phrase: &str) -> Self {
        Self {
            column: column.to_string(),
            label: label.to_string(),
            phrase: phrase.to_string(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "MOTOCICLETAS SUMA",
                "Motorcycles",
                "In {entity}, motorcycles account for a high share of accidents. \
                 Insure your motorcycle with our best coverage.",
            ),
            Self::new(
                "AUTOMÓVILES SUMA",
                "Automobiles",
                "In {entity}, automobiles are involved in numerous accidents. \
                 Protect yourself with car insurance.",
            ),
            Self::new(
                "CAMIONES PARA PASAJEROS SUMA",
                "Passenger trucks",
                "In {entity}, passenger trucks play a leading role in accidents. \
                 Guarantee safety with our specialised insurance.",
            ),
            Self::new(
                "CAMIONES Y CAMIONETAS PARA CARGA SUMA",
                "Cargo trucks and vans",
                "In {entity}, cargo trucks have a high accident incidence. \
                 Protect your investment with our cargo vehicle coverage.",
            ),
        ]
    }

    /// Fill the phrase template for one subdivision.
    pub fn phrase_for(&self, entity: &str) -> String {
        self.phrase.replace("{entity}", entity)
    }
}

/// Shared figure styling, as hex strings so it can come from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub blue: String,
    pub aqua: String,
    pub navy: String,
    pub coral: String,
    pub sky: String,
    pub white: String,
    /// Categorical sequence for category-coloured charts
    pub sequence: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            blue: "#004481".to_string(),
            aqua: "#2dcccd".to_string(),
            navy: "#072146".to_string(),
            coral: "#ff7e67".to_string(),
            sky: "#5bbeff".to_string(),
            white: "#ffffff".to_string(),
            sequence: ["#0d0887", "#7e03a8", "#cc4778", "#f89540", "#f0f921"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Palette {
    pub fn primary(&self) -> Color32 {
        parse_hex(&self.blue)
    }

    pub fn background(&self) -> Color32 {
        parse_hex(&self.white)
    }

    /// Line colours for multi-series charts.
    pub fn series(&self) -> Vec<Color32> {
        [&self.blue, &self.aqua, &self.coral, &self.navy, &self.sky]
            .iter()
            .map(|hex| parse_hex(hex))
            .collect()
    }

    /// `n` shades running from navy to sky, for part-of-whole charts.
    pub fn shades(&self, n: usize) -> Vec<Color32> {
        let from = parse_hex(&self.navy);
        let to = parse_hex(&self.sky);
        (0..n)
            .map(|i| {
                let t = if n <= 1 { 0.0 } else { i as f32 / (n - 1) as f32 };
                from.lerp_to_gamma(to, t)
            })
            .collect()
    }

    /// Colour `idx` of the categorical sequence, cycling.
    pub fn categorical(&self, idx: usize) -> Color32 {
        if self.sequence.is_empty() {
            return self.primary();
        }
        parse_hex(&self.sequence[idx % self.sequence.len()])
    }
}

/// Parse a hex colour, with or without the leading `#`. Unparseable input falls back to grey.
pub fn parse_hex(hex: &str) -> Color32 {
    Color32::from_hex(&format!("#{}", hex.trim_start_matches('#'))).unwrap_or(Color32::GRAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_palette_hex() {
        assert_eq!(parse_hex("#004481"), Color32::from_rgb(0x00, 0x44, 0x81));
        assert_eq!(parse_hex("2dcccd"), Color32::from_rgb(0x2d, 0xcc, 0xcd));
        assert_eq!(parse_hex("#zzz"), Color32::GRAY);
        assert_eq!(parse_hex(""), Color32::GRAY);
    }

    #[test]
    fn shades_run_from_navy_to_sky() {
        let palette = Palette::default();
        let shades = palette.shades(3);
        assert_eq!(shades.len(), 3);
        assert_eq!(shades[0], parse_hex("#072146"));
        assert_eq!(shades[2], parse_hex("#5bbeff"));
        assert_eq!(palette.shades(1), vec![parse_hex("#072146")]);

        // Midpoint sits between the endpoints on every channel
        let mid = shades[1];
        assert!(mid.r() >= shades[0].r() && mid.r() <= shades[2].r());
        assert!(mid.b() >= shades[0].b() && mid.b() <= shades[2].b());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "data_dir": "/srv/inegi", "top_n": 5, "schema": {{ "national": "National" }} }}"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/inegi"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.schema.national, "National");
        assert_eq!(config.schema.entity_column, "Entidad");
        assert_eq!(config.sources.vehicles, "vmrc.xlsx");
        assert_eq!(config.vehicle_categories.len(), 4);
    }

    #[test]
    fn malformed_json_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = DashboardConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn phrase_interpolates_entity() {
        let category = VehicleCategory::new("X", "X", "In {entity}, buy insurance.");
        assert_eq!(category.phrase_for("Jalisco"), "In Jalisco, buy insurance.");
    }
}
