//! Low power manager configuration
//!
//! Build-time defaults come from `build.rs`:
//! - `LPM_ALLOWED_MODES` - Allowed-mode bitmap in hex (default `0x0F`)
//! - `LPM_RETENTION_MAGIC` - Retention record magic word in hex

use kineis_lpm_core::{AllowedModes, LpmError, ModeHooks, PolicyStore, RETENTION_MAGIC};

/// Manager configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LpmConfig {
    /// Modes the manager may enter
    pub allowed_modes: AllowedModes,
    /// Magic word guarding the retention record
    pub retention_magic: u32,
}

impl Default for LpmConfig {
    fn default() -> Self {
        Self {
            allowed_modes: AllowedModes::all(),
            retention_magic: RETENTION_MAGIC,
        }
    }
}

impl LpmConfig {
    /// Configuration baked in at build time
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidConfig` if a build variable is not valid
    /// hex or the bitmap enables no mode.
    pub fn from_build_env() -> Result<Self, LpmError> {
        Self::parse(env!("LPM_ALLOWED_MODES"), env!("LPM_RETENTION_MAGIC"))
    }

    /// Parse a configuration from its textual form
    ///
    /// Both values are hex with an optional `0x` prefix. Unknown mode bits
    /// are dropped, as with the `AT+LPM` command.
    pub fn parse(allowed_modes: &str, retention_magic: &str) -> Result<Self, LpmError> {
        let allowed_modes = AllowedModes::parse_hex(allowed_modes).ok_or(LpmError::InvalidConfig)?;
        let retention_magic = parse_hex_u32(retention_magic).ok_or(LpmError::InvalidConfig)?;

        let config = Self {
            allowed_modes,
            retention_magic,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration
    ///
    /// # Errors
    ///
    /// Returns `LpmError::InvalidConfig` if no mode is enabled or the magic
    /// word is zero (indistinguishable from erased backup registers).
    pub fn validate(&self) -> Result<(), LpmError> {
        if self.allowed_modes.is_empty() || self.retention_magic == 0 {
            return Err(LpmError::InvalidConfig);
        }
        Ok(())
    }

    /// Build the policy store for this configuration
    pub fn policy<'a>(&self, hooks: ModeHooks<'a>) -> Result<PolicyStore<'a>, LpmError> {
        PolicyStore::new(self.allowed_modes, hooks)
    }
}

fn parse_hex_u32(text: &str) -> Option<u32> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
