use serde::Deserialize;
use serde_json::json;

use crate::telemetry::{log_event, LogLevel};

pub const CONFIG_ATTRIBUTE: &str = "data-interactions";

const DEFAULT_REVEAL_THRESHOLD: f64 = 0.1;
const DEFAULT_REVEAL_BOTTOM_MARGIN_PX: f64 = 50.0;
const DEFAULT_STAGGER_STEP_MS: u32 = 150;
const DEFAULT_NAV_SCROLL_OFFSET_PX: f64 = 50.0;
const DEFAULT_NAV_PULSE_MS: u32 = 150;
const DEFAULT_HEADER_PARALLAX_FACTOR: f64 = 0.5;
const DEFAULT_HEADER_MIN_OPACITY: f64 = 0.2;
const DEFAULT_TEXT_REVEAL_LEAD_PX: f64 = 150.0;
const DEFAULT_SCROLL_DEBOUNCE_MS: u32 = 16;
const DEFAULT_CLOCK_PERIOD_MS: u32 = 1_000;
const DEFAULT_GREETING_PERIOD_MS: u32 = 3_000;
const DEFAULT_GREETING_FLASH_MS: u32 = 900;
const DEFAULT_GREETINGS: [&str; 10] = [
    "Hello",
    "Hola",
    "Bonjour",
    "こんにちは",
    "안녕하세요",
    "שלום",
    "مرحبا",
    "नमस्ते",
    "Olá",
    "Ciao",
];
const DEFAULT_SKILLS_REVEAL_THRESHOLD: f64 = 0.2;
const DEFAULT_SKILLS_PARALLAX_X_PX: f64 = 8.0;
const DEFAULT_SKILLS_PARALLAX_Y_PX: f64 = 6.0;
const DEFAULT_SKILLS_GRID_DELAY_MS: u32 = 120;
const DEFAULT_HEADER_TITLE_DELAY_MS: u32 = 500;
const DEFAULT_HEADER_SUBTITLE_DELAY_MS: u32 = 700;
const DEFAULT_FOOTER_OWNER: &str = "Chukwunonso Daniel Ekweaga";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const RATIO_BOUNDS: (f64, f64) = (0.0, 1.0);
const MARGIN_PX_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const PARALLAX_FACTOR_BOUNDS: (f64, f64) = (0.0, 2.0);
const PARALLAX_PX_BOUNDS: (f64, f64) = (0.0, 64.0);
const DELAY_MS_BOUNDS: (u32, u32) = (0, 10_000);
const PERIOD_MS_BOUNDS: (u32, u32) = (10, 60_000);
const MAX_GREETINGS: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionConfig {
    pub reveal_threshold: f64,
    pub reveal_bottom_margin_px: f64,
    pub stagger_step_ms: u32,
    pub nav_scroll_offset_px: f64,
    pub nav_pulse_ms: u32,
    pub header_parallax_factor: f64,
    pub header_min_opacity: f64,
    pub text_reveal_lead_px: f64,
    pub scroll_debounce_ms: u32,
    pub clock_period_ms: u32,
    pub greeting_period_ms: u32,
    pub greeting_flash_ms: u32,
    pub greetings: Vec<String>,
    pub skills_reveal_threshold: f64,
    pub skills_parallax_x_px: f64,
    pub skills_parallax_y_px: f64,
    pub skills_grid_delay_ms: u32,
    pub header_title_delay_ms: u32,
    pub header_subtitle_delay_ms: u32,
    pub footer_owner: String,
    pub log_level: LogLevel,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            reveal_bottom_margin_px: DEFAULT_REVEAL_BOTTOM_MARGIN_PX,
            stagger_step_ms: DEFAULT_STAGGER_STEP_MS,
            nav_scroll_offset_px: DEFAULT_NAV_SCROLL_OFFSET_PX,
            nav_pulse_ms: DEFAULT_NAV_PULSE_MS,
            header_parallax_factor: DEFAULT_HEADER_PARALLAX_FACTOR,
            header_min_opacity: DEFAULT_HEADER_MIN_OPACITY,
            text_reveal_lead_px: DEFAULT_TEXT_REVEAL_LEAD_PX,
            scroll_debounce_ms: DEFAULT_SCROLL_DEBOUNCE_MS,
            clock_period_ms: DEFAULT_CLOCK_PERIOD_MS,
            greeting_period_ms: DEFAULT_GREETING_PERIOD_MS,
            greeting_flash_ms: DEFAULT_GREETING_FLASH_MS,
            greetings: DEFAULT_GREETINGS.iter().map(|word| word.to_string()).collect(),
            skills_reveal_threshold: DEFAULT_SKILLS_REVEAL_THRESHOLD,
            skills_parallax_x_px: DEFAULT_SKILLS_PARALLAX_X_PX,
            skills_parallax_y_px: DEFAULT_SKILLS_PARALLAX_Y_PX,
            skills_grid_delay_ms: DEFAULT_SKILLS_GRID_DELAY_MS,
            header_title_delay_ms: DEFAULT_HEADER_TITLE_DELAY_MS,
            header_subtitle_delay_ms: DEFAULT_HEADER_SUBTITLE_DELAY_MS,
            footer_owner: DEFAULT_FOOTER_OWNER.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionOverrides {
    reveal_threshold: Option<f64>,
    reveal_bottom_margin_px: Option<f64>,
    stagger_step_ms: Option<u32>,
    nav_scroll_offset_px: Option<f64>,
    nav_pulse_ms: Option<u32>,
    header_parallax_factor: Option<f64>,
    header_min_opacity: Option<f64>,
    text_reveal_lead_px: Option<f64>,
    scroll_debounce_ms: Option<u32>,
    clock_period_ms: Option<u32>,
    greeting_period_ms: Option<u32>,
    greeting_flash_ms: Option<u32>,
    greetings: Option<Vec<String>>,
    skills_reveal_threshold: Option<f64>,
    skills_parallax_x_px: Option<f64>,
    skills_parallax_y_px: Option<f64>,
    skills_grid_delay_ms: Option<u32>,
    header_title_delay_ms: Option<u32>,
    header_subtitle_delay_ms: Option<u32>,
    footer_owner: Option<String>,
    log_level: Option<String>,
}

impl InteractionConfig {
    /// Builds the config from the raw `data-interactions` attribute value, if any.
    pub fn from_attribute(raw: Option<&str>) -> Self {
        let raw = raw.map(str::trim).filter(|value| !value.is_empty());
        let Some(raw) = raw else {
            return Self::default();
        };

        match serde_json::from_str::<InteractionOverrides>(raw) {
            Ok(overrides) => Self::from_overrides(overrides),
            Err(err) => {
                let config = Self::default();
                log_event(
                    &config,
                    LogLevel::Warn,
                    "config_parse_failed",
                    json!({ "attribute": CONFIG_ATTRIBUTE, "error": err.to_string() }),
                );
                config
            }
        }
    }

    fn from_overrides(overrides: InteractionOverrides) -> Self {
        let greetings = overrides
            .greetings
            .map(|words| {
                words
                    .into_iter()
                    .map(|word| word.trim().to_string())
                    .filter(|word| !word.is_empty())
                    .take(MAX_GREETINGS)
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .unwrap_or_else(|| DEFAULT_GREETINGS.iter().map(|word| word.to_string()).collect());

        Self {
            reveal_threshold: f64_with_bounds(
                overrides.reveal_threshold,
                DEFAULT_REVEAL_THRESHOLD,
                RATIO_BOUNDS,
            ),
            reveal_bottom_margin_px: f64_with_bounds(
                overrides.reveal_bottom_margin_px,
                DEFAULT_REVEAL_BOTTOM_MARGIN_PX,
                MARGIN_PX_BOUNDS,
            ),
            stagger_step_ms: u32_with_bounds(
                overrides.stagger_step_ms,
                DEFAULT_STAGGER_STEP_MS,
                DELAY_MS_BOUNDS,
            ),
            nav_scroll_offset_px: f64_with_bounds(
                overrides.nav_scroll_offset_px,
                DEFAULT_NAV_SCROLL_OFFSET_PX,
                MARGIN_PX_BOUNDS,
            ),
            nav_pulse_ms: u32_with_bounds(overrides.nav_pulse_ms, DEFAULT_NAV_PULSE_MS, DELAY_MS_BOUNDS),
            header_parallax_factor: f64_with_bounds(
                overrides.header_parallax_factor,
                DEFAULT_HEADER_PARALLAX_FACTOR,
                PARALLAX_FACTOR_BOUNDS,
            ),
            header_min_opacity: f64_with_bounds(
                overrides.header_min_opacity,
                DEFAULT_HEADER_MIN_OPACITY,
                RATIO_BOUNDS,
            ),
            text_reveal_lead_px: f64_with_bounds(
                overrides.text_reveal_lead_px,
                DEFAULT_TEXT_REVEAL_LEAD_PX,
                MARGIN_PX_BOUNDS,
            ),
            scroll_debounce_ms: u32_with_bounds(
                overrides.scroll_debounce_ms,
                DEFAULT_SCROLL_DEBOUNCE_MS,
                PERIOD_MS_BOUNDS,
            ),
            clock_period_ms: u32_with_bounds(
                overrides.clock_period_ms,
                DEFAULT_CLOCK_PERIOD_MS,
                PERIOD_MS_BOUNDS,
            ),
            greeting_period_ms: u32_with_bounds(
                overrides.greeting_period_ms,
                DEFAULT_GREETING_PERIOD_MS,
                PERIOD_MS_BOUNDS,
            ),
            greeting_flash_ms: u32_with_bounds(
                overrides.greeting_flash_ms,
                DEFAULT_GREETING_FLASH_MS,
                DELAY_MS_BOUNDS,
            ),
            greetings,
            skills_reveal_threshold: f64_with_bounds(
                overrides.skills_reveal_threshold,
                DEFAULT_SKILLS_REVEAL_THRESHOLD,
                RATIO_BOUNDS,
            ),
            skills_parallax_x_px: f64_with_bounds(
                overrides.skills_parallax_x_px,
                DEFAULT_SKILLS_PARALLAX_X_PX,
                PARALLAX_PX_BOUNDS,
            ),
            skills_parallax_y_px: f64_with_bounds(
                overrides.skills_parallax_y_px,
                DEFAULT_SKILLS_PARALLAX_Y_PX,
                PARALLAX_PX_BOUNDS,
            ),
            skills_grid_delay_ms: u32_with_bounds(
                overrides.skills_grid_delay_ms,
                DEFAULT_SKILLS_GRID_DELAY_MS,
                DELAY_MS_BOUNDS,
            ),
            header_title_delay_ms: u32_with_bounds(
                overrides.header_title_delay_ms,
                DEFAULT_HEADER_TITLE_DELAY_MS,
                DELAY_MS_BOUNDS,
            ),
            header_subtitle_delay_ms: u32_with_bounds(
                overrides.header_subtitle_delay_ms,
                DEFAULT_HEADER_SUBTITLE_DELAY_MS,
                DELAY_MS_BOUNDS,
            ),
            footer_owner: overrides
                .footer_owner
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_FOOTER_OWNER.to_string()),
            log_level: overrides
                .log_level
                .as_deref()
                .and_then(LogLevel::parse)
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

fn u32_with_bounds(value: Option<u32>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn f64_with_bounds(value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}
