//! Control signals emitted by the UI and gesture layers

use serde::{Deserialize, Serialize};

/// A discrete or continuous control input.
///
/// Producers (buttons, sliders, a gesture recognizer) push these onto a
/// [`SignalBus`](crate::SignalBus); the particle system drains the bus at the
/// start of each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "value", rename_all = "snake_case")]
pub enum ControlSignal {
    /// Flip between assembled and exploded (UI button)
    ToggleExplode,
    /// Scatter the tree; ignored when already exploded (open-hand gesture)
    Explode,
    /// Reassemble the tree; ignored when already assembled (fist gesture)
    Assemble,
    /// Continuous rotation speed in radians per second
    Rotate(f32),
    /// Highlight a photo by index; `-1` clears the highlight
    SelectPhoto(i64),
}

impl ControlSignal {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ControlSignal::ToggleExplode => "toggle_explode",
            ControlSignal::Explode => "explode",
            ControlSignal::Assemble => "assemble",
            ControlSignal::Rotate(_) => "rotate",
            ControlSignal::SelectPhoto(_) => "select_photo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Script {
        signals: Vec<ControlSignal>,
    }

    #[test]
    fn parse_signal_script_from_toml() {
        let script: Script = toml::from_str(
            r#"
signals = [
    { signal = "explode" },
    { signal = "rotate", value = 0.5 },
    { signal = "select_photo", value = 2 },
]
"#,
        )
        .unwrap();
        assert_eq!(
            script.signals,
            vec![
                ControlSignal::Explode,
                ControlSignal::Rotate(0.5),
                ControlSignal::SelectPhoto(2),
            ]
        );
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(ControlSignal::Rotate(1.0).name(), "rotate");
        assert_eq!(ControlSignal::ToggleExplode.name(), "toggle_explode");
    }
}
