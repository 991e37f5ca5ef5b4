// envelope.rs - On-disk record wrapping one config asset

use crate::{AssetTag, ConfigAsset, ConfigError};
use serde::{Deserialize, Serialize};

/// Header plus payload of a persisted asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub tag: AssetTag,
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Serialize `value` as a pretty-printed envelope named `name`.
pub fn encode_asset<T: ConfigAsset>(name: &str, value: &T) -> Result<Vec<u8>, ConfigError> {
    let encode_err = |source| ConfigError::Encode {
        name: name.to_string(),
        source,
    };
    let envelope = Envelope {
        tag: T::TAG,
        type_name: T::NAME.to_string(),
        name: name.to_string(),
        data: serde_json::to_value(value).map_err(encode_err)?,
    };
    serde_json::to_vec_pretty(&envelope).map_err(encode_err)
}
