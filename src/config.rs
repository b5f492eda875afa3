//! Device identity and radio configuration
//!
//! Identity fields are sticky: the first value configured for each of app EUI,
//! app key and device EUI is kept, later calls leave it untouched. Radio
//! settings are materialised on the module by [`Configuration::apply`] right
//! before every join.

use core::fmt;

use heapless::String;

use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::hex::HexError;
use crate::transport::Transport;

/// Wait between join or busy-transmit attempts
pub const BACKOFF_MS: u32 = 1_000;

/// Join attempts before giving up
pub const JOIN_ATTEMPTS: u8 = 3;

/// Transmit attempts per uplink
pub const TRANSMIT_ATTEMPTS: u8 = 10;

/// Hold time of each reset pulse phase
pub const RESET_HOLD_MS: u32 = 100;

/// Time allowed for the boot banner after a reset
pub const STARTUP_TIMEOUT_MS: u32 = 3_000;

/// Silence that ends the boot banner
pub const BANNER_QUIET_MS: u32 = 100;

/// Largest uplink payload accepted by the module
pub const MAX_UPLINK_PAYLOAD: usize = 222;

/// Largest downlink payload delivered by the module
pub const MAX_DOWNLINK_PAYLOAD: usize = 230;

/// Port used for uplinks
pub const UPLINK_PORT: u8 = 1;

/// EUI-64 as 16 hex digits
pub type Eui = String<16>;

/// AES-128 key as 32 hex digits
pub type AppKey = String<32>;

/// Frequency plan selected by `mac reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Band {
    /// 863-870 MHz
    #[default]
    Eu868,
    /// 433 MHz
    Eu433,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Eu868 => f.write_str("868"),
            Band::Eu433 => f.write_str("433"),
        }
    }
}

/// Second receive window parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rx2Window {
    /// Data rate index
    pub data_rate: u8,
    /// Frequency in Hz
    pub frequency: u32,
}

impl fmt::Display for Rx2Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.data_rate, self.frequency)
    }
}

/// Radio parameters applied before joining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioConfiguration {
    /// Output power index (`mac set pwridx`)
    pub power_index: u8,
    /// Adaptive data rate
    pub adaptive_data_rate: bool,
    /// Second receive window
    pub rx2: Rx2Window,
    /// Retransmissions of an unacknowledged confirmed uplink
    pub retransmissions: u8,
    /// Automatic reply to downlinks
    pub auto_reply: bool,
}

impl Default for RadioConfiguration {
    fn default() -> Self {
        Self {
            power_index: 1,
            adaptive_data_rate: false,
            rx2: Rx2Window {
                data_rate: 3,
                frequency: 869_525_000,
            },
            retransmissions: 5,
            auto_reply: false,
        }
    }
}

/// OTAA credentials as supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity<'a> {
    /// Application EUI, 16 hex digits
    pub app_eui: &'a str,
    /// Application key, 32 hex digits
    pub app_key: &'a str,
    /// Device EUI; the module's hardware EUI is used when absent
    pub dev_eui: Option<&'a str>,
}

impl<'a> Identity<'a> {
    /// Credentials using the hardware EUI as device EUI
    pub fn new(app_eui: &'a str, app_key: &'a str) -> Self {
        Self {
            app_eui,
            app_key,
            dev_eui: None,
        }
    }

    /// Use an explicit device EUI
    pub fn with_dev_eui(mut self, dev_eui: &'a str) -> Self {
        self.dev_eui = Some(dev_eui);
        self
    }
}

/// Pending device parameters
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    app_eui: Option<Eui>,
    app_key: Option<AppKey>,
    dev_eui: Option<Eui>,
    radio: RadioConfiguration,
    band: Band,
}

impl Configuration {
    /// Empty configuration with default radio settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Record credentials, keeping any field that is already set
    ///
    /// Nothing is recorded if any supplied credential is malformed.
    pub fn configure(&mut self, identity: Identity<'_>) -> Result<(), HexError> {
        let app_eui = parse_credential::<16>(identity.app_eui)?;
        let app_key = parse_credential::<32>(identity.app_key)?;
        let dev_eui = identity
            .dev_eui
            .map(parse_credential::<16>)
            .transpose()?;

        self.app_eui.get_or_insert(app_eui);
        self.app_key.get_or_insert(app_key);
        if let Some(dev_eui) = dev_eui {
            self.adopt_dev_eui(dev_eui);
        }
        Ok(())
    }

    /// Set the device EUI unless one is already configured
    pub fn adopt_dev_eui(&mut self, dev_eui: Eui) {
        self.dev_eui.get_or_insert(dev_eui);
    }

    /// Application EUI
    pub fn app_eui(&self) -> Option<&str> {
        self.app_eui.as_deref()
    }

    /// Application key
    pub fn app_key(&self) -> Option<&str> {
        self.app_key.as_deref()
    }

    /// Device EUI
    pub fn dev_eui(&self) -> Option<&str> {
        self.dev_eui.as_deref()
    }

    /// Whether app EUI and app key are present
    pub fn has_credentials(&self) -> bool {
        self.app_eui.is_some() && self.app_key.is_some()
    }

    /// Radio settings
    pub fn radio(&self) -> &RadioConfiguration {
        &self.radio
    }

    /// Replace the radio settings
    pub fn set_radio(&mut self, radio: RadioConfiguration) {
        self.radio = radio;
    }

    pub(crate) fn radio_mut(&mut self) -> &mut RadioConfiguration {
        &mut self.radio
    }

    /// Frequency plan
    pub fn band(&self) -> Band {
        self.band
    }

    /// Select the frequency plan used by the next join
    pub fn set_band(&mut self, band: Band) {
        self.band = band;
    }

    /// Write every parameter to the module and persist it with `mac save`
    pub fn apply<T: Transport>(
        &self,
        dispatcher: &mut Dispatcher<T>,
    ) -> Result<(), Error<T::Error>> {
        let (app_eui, app_key, dev_eui) = match (&self.app_eui, &self.app_key, &self.dev_eui) {
            (Some(app_eui), Some(app_key), Some(dev_eui)) => (app_eui, app_key, dev_eui),
            _ => return Err(Error::MissingCredentials),
        };
        let radio = &self.radio;

        dispatcher.expect_ok(format_args!("mac set appeui {}", app_eui))?;
        dispatcher.expect_ok(format_args!("mac set appkey {}", app_key))?;
        dispatcher.expect_ok(format_args!("mac set deveui {}", dev_eui))?;
        dispatcher.expect_ok(format_args!("mac set pwridx {}", radio.power_index))?;
        dispatcher.expect_ok(format_args!(
            "mac set adr {}",
            on_off(radio.adaptive_data_rate)
        ))?;
        dispatcher.expect_ok(format_args!("mac set rx2 {}", radio.rx2))?;
        dispatcher.expect_ok(format_args!("mac set retx {}", radio.retransmissions))?;
        write_auto_reply(dispatcher, radio.auto_reply)?;
        dispatcher.expect_ok(format_args!("mac save"))?;

        debug!("configuration applied");
        Ok(())
    }
}

/// Set auto-reply and verify it by reading it back
pub(crate) fn write_auto_reply<T: Transport>(
    dispatcher: &mut Dispatcher<T>,
    enabled: bool,
) -> Result<(), Error<T::Error>> {
    let requested = on_off(enabled);
    dispatcher.expect_ok(format_args!("mac set ar {}", requested))?;
    let actual = dispatcher.query(format_args!("mac get ar"))?;
    if actual.trim() != requested {
        warn!("auto-reply read back {}, wanted {}", actual.as_str(), requested);
        return Err(Error::ConfigurationMismatch);
    }
    Ok(())
}

pub(crate) fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

pub(crate) fn parse_on_off(value: &str) -> Option<bool> {
    match value.trim() {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

/// Validate an `N`-digit hex credential
pub(crate) fn parse_credential<const N: usize>(value: &str) -> Result<String<N>, HexError> {
    if value.len() != N {
        return Err(HexError::InvalidLength);
    }
    if let Some(index) = value.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(HexError::InvalidDigit { index });
    }
    let mut credential = String::new();
    credential.push_str(value).map_err(|_| HexError::Capacity)?;
    Ok(credential)
}
