use serde::Deserialize;

use crate::config::exchange::ExchangeSettings;
use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    pub exchange: ExchangeSettings,
}
