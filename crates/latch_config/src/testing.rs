//! Asset types shared by the unit tests.

use crate::define_config_asset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: u8,
    pub fullscreen: bool,
}
define_config_asset!(GameSettings, 1, "GameSettings");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioMix {
    pub master: f32,
    pub music: f32,
}
define_config_asset!(AudioMix, 2, "AudioMix");
