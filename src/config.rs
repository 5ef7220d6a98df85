use serde::Deserialize;

/// Everything read from the TOML configuration file. Every section and
/// every field may be omitted; the defaults mirror a ten-pixel strip on a
/// local OLA daemon listening to a local OctoPrint broker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub strip: StripConfig,
    pub mqtt: MqttConfig,
    pub progress: ProgressConfig,
    pub effects: EffectsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    pub led_count: usize,
    pub brightness: u8,
    pub ola_addr: String,
    pub universe: usize,
    pub color_order: ColorOrder,
}

impl Default for StripConfig {
    fn default() -> StripConfig {
        StripConfig {
            led_count: 10,
            brightness: 255,
            ola_addr: "127.0.0.1:7770".to_string(),
            universe: 0,
            color_order: ColorOrder::Rgb,
        }
    }
}

/// Channel order the strip expects on the wire. WS2812-style strips
/// usually want `grb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorOrder {
    Rgb,
    Grb,
    Bgr,
}

impl ColorOrder {
    pub fn reorder(self, r: u8, g: u8, b: u8) -> [u8; 3] {
        match self {
            ColorOrder::Rgb => [r, g, b],
            ColorOrder::Grb => [g, r, b],
            ColorOrder::Bgr => [b, g, r],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub url: String,
    /// Topic prefix the OctoPrint MQTT plugin publishes under.
    pub base_topic: String,
    pub discovery_prefix: String,
    pub unique_id: String,
}

impl Default for MqttConfig {
    fn default() -> MqttConfig {
        MqttConfig {
            url: "tcp://127.0.0.1:1883".to_string(),
            base_topic: "octoPrint".to_string(),
            discovery_prefix: "homeassistant".to_string(),
            unique_id: "drucklicht".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub enabled: bool,
    /// Color of the not-yet-printed part of the strip.
    pub base_color: Option<String>,
    /// Color that fills in as the print advances.
    pub color: Option<String>,
    pub reverse: bool,
}

impl Default for ProgressConfig {
    fn default() -> ProgressConfig {
        ProgressConfig {
            enabled: true,
            base_color: Some("#ffffff".to_string()),
            color: Some("#00ff00".to_string()),
            reverse: false,
        }
    }
}

/// Which animation to run for one printer state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StateEffectConfig {
    pub effect: String,
    pub color: Option<String>,
    pub delay_ms: u64,
    pub iterations: u32,
    /// Minimum time the effect keeps the strip before a non-forced switch
    /// may replace it.
    pub min_runtime_ms: u64,
    pub reverse: bool,
}

impl Default for StateEffectConfig {
    fn default() -> StateEffectConfig {
        StateEffectConfig {
            effect: "Solid Color".to_string(),
            color: None,
            delay_ms: 50,
            iterations: 1,
            min_runtime_ms: 0,
            reverse: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub init: StateEffectConfig,
    pub idle: StateEffectConfig,
    pub disconnected: StateEffectConfig,
    pub paused: StateEffectConfig,
    pub failed: StateEffectConfig,
    pub done: StateEffectConfig,
}

impl Default for EffectsConfig {
    fn default() -> EffectsConfig {
        EffectsConfig {
            init: state("Rainbow Cycle", None, 20, 5000),
            idle: state("Color Wipe", Some("#ffffff"), 10, 0),
            disconnected: state("Solid Color", Some("#202020"), 50, 0),
            paused: state("Pulse", Some("#ffaa00"), 10, 0),
            failed: state("Pulse", Some("#ff0000"), 10, 0),
            done: state("Solid Color", Some("#00ff00"), 50, 0),
        }
    }
}

fn state(effect: &str, color: Option<&str>, delay_ms: u64, min_runtime_ms: u64) -> StateEffectConfig {
    StateEffectConfig {
        effect: effect.to_string(),
        color: color.map(str::to_string),
        delay_ms,
        iterations: 1,
        min_runtime_ms,
        reverse: false,
    }
}
