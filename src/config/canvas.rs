use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Edge length of the square drawing surface, in logical units.
    pub size: f32,
    pub background: [u8; 3],
    pub stroke: [u8; 3],
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: 600.0,
            background: [0xff, 0xfc, 0xed],
            stroke: [0, 0, 0],
        }
    }
}
