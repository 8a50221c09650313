//! Client-side reader: typed configuration plus static CSS and script.
//!
//! Nothing is interpolated into the script. The emitter serialises a
//! [`ClientConfig`] into a `<script type="application/json">` block and the
//! static [`READER_SCRIPT`] parses it at load time. The scaling rule is
//! mirrored in [`ClientConfig::display_size`] so it can be tested here.

use crate::config::{MAX_BASE_FONT_SIZE, MIN_BASE_FONT_SIZE};
use serde::Serialize;

/// Bootstrap stylesheet linked from every document.
pub const BOOTSTRAP_CSS: &str = "https://stackpath.bootstrapcdn.com/bootstrap/4.3.1/css/bootstrap.min.css";
/// Bootstrap script linked from every document.
pub const BOOTSTRAP_JS: &str = "https://stackpath.bootstrapcdn.com/bootstrap/4.3.1/js/bootstrap.min.js";

/// Font families offered by the font selector, with their web-font stylesheet.
pub const WEB_FONTS: [(&str, &str); 10] = [
    ("Arial", "https://fonts.googleapis.com/css2?family=Arial&display=swap"),
    ("Helvetica", "https://fonts.googleapis.com/css2?family=Helvetica&display=swap"),
    ("Times New Roman", "https://fonts.googleapis.com/css2?family=Times+New+Roman&display=swap"),
    ("Courier New", "https://fonts.googleapis.com/css2?family=Courier+Prime&display=swap"),
    ("Verdana", "https://fonts.googleapis.com/css2?family=Verdana&display=swap"),
    ("Georgia", "https://fonts.googleapis.com/css2?family=Georgia&display=swap"),
    ("Palatino", "https://fonts.googleapis.com/css2?family=Palatino&display=swap"),
    ("Garamond", "https://fonts.googleapis.com/css2?family=EB+Garamond&display=swap"),
    ("Bookman", "https://fonts.googleapis.com/css2?family=Bookman&display=swap"),
    ("Bookerly", "https://fonts.googleapis.com/css2?family=Bookerly&display=swap"),
];

/// Generic family appended after the chosen font.
pub const FALLBACK_FAMILY: &str = "sans-serif";

/// Embedded style block.
pub const READER_CSS: &str = r#"
body { transition: background-color 0.3s, color 0.3s; }
.pdf-element { margin-bottom: 10px; }
.pdf-image { display: block; max-width: 100%; height: auto; margin-bottom: 10px; }
#controls {
    position: fixed;
    top: 0;
    left: 0;
    right: 0;
    background-color: #f8f9fa;
    padding: 15px;
    z-index: 1000;
    transition: transform 0.3s ease-in-out;
}
#controls.minimized { transform: translateY(-100%); }
#divet {
    position: fixed;
    top: 10px;
    right: 10px;
    padding: 5px 10px;
    border-radius: 5px;
    cursor: pointer;
    z-index: 1001;
    transition: background-color 0.3s;
    border: none;
    font-size: 18px;
}
"#;

/// Static reader logic. Reads `#reader-config`, wires the selectors and the
/// toggle, then applies every setting once so the first paint is correct.
pub const READER_SCRIPT: &str = r#"
(function () {
    var config = JSON.parse(document.getElementById('reader-config').textContent);
    var modes = {};
    config.reading_modes.forEach(function (mode) { modes[mode.value] = mode; });

    function updateFontSize() {
        var base = parseInt(document.getElementById('font-size-selector').value, 10);
        var elements = document.querySelectorAll('.pdf-element[data-original-size]');
        for (var i = 0; i < elements.length; i++) {
            var original = parseFloat(elements[i].getAttribute('data-original-size'));
            elements[i].style.fontSize = (original / config.baseline_size) * base + 'px';
        }
    }

    function updateReadingMode() {
        var selected = document.getElementById('reading-mode-selector').value;
        var mode = modes[selected] || modes[config.default_reading_mode];
        var divet = document.getElementById('divet');
        document.body.style.backgroundColor = mode.colors.background;
        document.body.style.color = mode.colors.foreground;
        document.body.className = mode.value;
        divet.style.backgroundColor = mode.colors.control;
        divet.style.color = mode.colors.background;
    }

    function updateFont() {
        var font = document.getElementById('font-selector').value;
        document.body.style.fontFamily = '"' + font + '", ' + config.fallback_family;
    }

    function setControlsVisible(visible) {
        document.getElementById('controls').classList.toggle('minimized', !visible);
    }

    function toggleControls() {
        var controls = document.getElementById('controls');
        setControlsVisible(controls.classList.contains('minimized'));
    }

    document.getElementById('font-size-selector').addEventListener('change', updateFontSize);
    document.getElementById('reading-mode-selector').addEventListener('change', updateReadingMode);
    document.getElementById('font-selector').addEventListener('change', updateFont);
    document.getElementById('divet').addEventListener('click', toggleControls);

    updateFontSize();
    updateReadingMode();
    updateFont();
    setControlsVisible(config.controls_visible);
})();
"#;

/// Named colour theme of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingMode {
    #[default]
    Light,
    Dark,
    Sepia,
}

/// Colours a reading mode applies. The toggle button uses `control` as its
/// background and `background` as its text colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub background: &'static str,
    pub foreground: &'static str,
    pub control: &'static str,
}

impl ReadingMode {
    pub const ALL: [ReadingMode; 3] = [ReadingMode::Light, ReadingMode::Dark, ReadingMode::Sepia];

    /// Option value and body class.
    pub fn value(self) -> &'static str {
        match self {
            ReadingMode::Light => "light",
            ReadingMode::Dark => "dark",
            ReadingMode::Sepia => "sepia",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReadingMode::Light => "Light",
            ReadingMode::Dark => "Dark",
            ReadingMode::Sepia => "Sepia",
        }
    }

    pub fn colors(self) -> ThemeColors {
        match self {
            ReadingMode::Light => ThemeColors {
                background: "#ffffff",
                foreground: "#000000",
                control: "#007bff",
            },
            ReadingMode::Dark => ThemeColors {
                background: "#1a1a1a",
                foreground: "#ffffff",
                control: "#ffffff",
            },
            ReadingMode::Sepia => ThemeColors {
                background: "#f4ecd8",
                foreground: "#5b4636",
                control: "#5b4636",
            },
        }
    }
}

/// One entry of the reading-mode table shipped to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingModeEntry {
    pub value: &'static str,
    pub label: &'static str,
    pub colors: ThemeColors,
}

impl From<ReadingMode> for ReadingModeEntry {
    fn from(mode: ReadingMode) -> Self {
        Self {
            value: mode.value(),
            label: mode.label(),
            colors: mode.colors(),
        }
    }
}

/// Everything the reader script needs, serialised once per document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientConfig {
    /// Detected body-text size in points; the reference for scaling.
    pub baseline_size: f32,
    /// Size preselected in the size selector.
    pub base_font_size: u32,
    /// Entries of the size selector.
    pub font_sizes: Vec<u32>,
    pub reading_modes: Vec<ReadingModeEntry>,
    pub default_reading_mode: ReadingMode,
    /// Entries of the font selector, in order.
    pub fonts: Vec<&'static str>,
    pub fallback_family: &'static str,
    /// Whether the control panel starts expanded.
    pub controls_visible: bool,
}

impl ClientConfig {
    pub fn new(baseline_size: f32, base_font_size: u32) -> Self {
        Self {
            baseline_size,
            base_font_size,
            font_sizes: (MIN_BASE_FONT_SIZE..=MAX_BASE_FONT_SIZE).collect(),
            reading_modes: ReadingMode::ALL.into_iter().map(Into::into).collect(),
            default_reading_mode: ReadingMode::default(),
            fonts: WEB_FONTS.iter().map(|(name, _)| *name).collect(),
            fallback_family: FALLBACK_FAMILY,
            controls_visible: true,
        }
    }

    /// Pixel size the reader applies to text of `original_size` points when
    /// the size selector is at `selected`.
    pub fn display_size(&self, original_size: f32, selected: u32) -> f64 {
        (f64::from(original_size) / f64::from(self.baseline_size)) * f64::from(selected)
    }

    /// JSON for embedding in a `<script>` element; `</` is escaped so the
    /// payload can never close the element early.
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        Ok(serde_json::to_string(self)?.replace("</", "<\\/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn reading_modes_are_distinct_and_complete() {
        let colors: Vec<ThemeColors> = ReadingMode::ALL.iter().map(|m| m.colors()).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
            for c in [a.background, a.foreground, a.control] {
                assert!(c.starts_with('#') && c.len() == 7, "bad colour {c}");
            }
        }
    }

    #[test]
    fn reading_mode_values_match_serialised_names() {
        for mode in ReadingMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.value()));
        }
    }

    #[test]
    fn display_size_scales_proportionally() {
        let cfg = ClientConfig::new(12.0, 13);
        assert!((cfg.display_size(12.0, 13) - 13.0).abs() < 1e-9);
        assert!((cfg.display_size(9.0, 16) - 12.0).abs() < 1e-9);
        assert!((cfg.display_size(18.0, 20) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn script_scales_sized_paragraphs_like_display_size() {
        assert!(READER_SCRIPT.contains("querySelectorAll('.pdf-element[data-original-size]')"));
        assert!(READER_SCRIPT
            .contains("parseFloat(elements[i].getAttribute('data-original-size'))"));
        assert!(READER_SCRIPT
            .contains("style.fontSize = (original / config.baseline_size) * base + 'px'"));
        assert!(READER_SCRIPT
            .contains("parseInt(document.getElementById('font-size-selector').value, 10)"));

        // Body text at the baseline renders at exactly the selected size.
        let cfg = ClientConfig::new(10.13, 13);
        assert!((cfg.display_size(10.13, 13) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn config_serialises_client_contract() {
        let cfg = ClientConfig::new(10.5, 13);
        let v: Value = serde_json::from_str(&cfg.to_script_json().unwrap()).unwrap();
        assert_eq!(v["baseline_size"], 10.5);
        assert_eq!(v["base_font_size"], 13);
        assert_eq!(v["font_sizes"].as_array().unwrap().len(), 17);
        assert_eq!(v["font_sizes"][0], 8);
        assert_eq!(v["default_reading_mode"], "light");
        assert_eq!(v["reading_modes"][2]["value"], "sepia");
        assert_eq!(v["reading_modes"][1]["colors"]["background"], "#1a1a1a");
        assert_eq!(v["fonts"][2], "Times New Roman");
        assert_eq!(v["fallback_family"], "sans-serif");
        assert_eq!(v["controls_visible"], true);
    }

    #[test]
    fn script_json_cannot_close_script_element() {
        let json = ClientConfig::new(12.0, 13).to_script_json().unwrap();
        assert!(!json.contains("</"));
    }

    #[test]
    fn script_initialises_every_control() {
        for call in [
            "updateFontSize();",
            "updateReadingMode();",
            "updateFont();",
            "setControlsVisible(config.controls_visible);",
        ] {
            assert!(READER_SCRIPT.contains(call), "missing init call {call}");
        }
    }
}
