//! High-level RN2483 interface
//!
//! [`Rn2483`] is the caller-owned session for one module. It owns the
//! transport, so every operation takes `&mut self` and commands are strictly
//! serialised. Join, transmit and the radio pause bracket are implemented in
//! their own modules on top of this type.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::config::{
    self, Band, Configuration, Eui, Identity, RadioConfiguration, BANNER_QUIET_MS,
    RESET_HOLD_MS, STARTUP_TIMEOUT_MS,
};
use crate::dispatcher::Dispatcher;
use crate::error::Error;
use crate::response::ResponseKind;
use crate::transport::Transport;

/// Upper bound on boot banner lines drained after a reset
const MAX_BANNER_LINES: usize = 8;

/// Link and network progress of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// Not started
    Uninitialized,
    /// Reset done and boot banner drained
    LinkReady,
    /// Parameters written to the module
    Configured,
    /// OTAA join accepted
    Joined,
}

/// Channel duty cycle as reported by `mac get ch dcycle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle {
    /// Raw register value
    pub raw: u16,
}

impl DutyCycle {
    /// Duty cycle in percent
    pub fn percent(&self) -> f32 {
        100.0 / (f32::from(self.raw) + 1.0)
    }
}

/// RN2483 module session
pub struct Rn2483<T: Transport, D> {
    pub(crate) dispatcher: Dispatcher<T>,
    pub(crate) delay: D,
    pub(crate) config: Configuration,
    pub(crate) state: ConnectionState,
}

impl<T, D> Rn2483<T, D>
where
    T: Transport,
    D: DelayMs<u32>,
{
    /// Create a session over `transport`
    pub fn new(transport: T, delay: D) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            delay,
            config: Configuration::new(),
            state: ConnectionState::Uninitialized,
        }
    }

    /// Give back the transport and delay
    pub fn release(self) -> (T, D) {
        (self.dispatcher.release(), self.delay)
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the last join was accepted
    pub fn is_joined(&self) -> bool {
        self.state == ConnectionState::Joined
    }

    /// Pending configuration
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Replace the radio settings applied by the next join
    pub fn set_radio_configuration(&mut self, radio: RadioConfiguration) {
        self.config.set_radio(radio);
    }

    /// Select the frequency plan used by the next join
    pub fn set_band(&mut self, band: Band) {
        self.config.set_band(band);
    }

    /// Record OTAA credentials; fields already set are kept
    pub fn configure(&mut self, identity: Identity<'_>) -> Result<(), Error<T::Error>> {
        self.config.configure(identity)?;
        Ok(())
    }

    /// Pulse the reset pin and drain the boot banner
    ///
    /// Runs once per session; later calls return immediately.
    pub fn startup<RST: OutputPin>(&mut self, reset: &mut RST) -> Result<(), Error<T::Error>> {
        if self.state != ConnectionState::Uninitialized {
            return Ok(());
        }

        reset.set_high().map_err(|_| Error::Gpio)?;
        self.delay.delay_ms(RESET_HOLD_MS);
        reset.set_low().map_err(|_| Error::Gpio)?;
        self.delay.delay_ms(RESET_HOLD_MS);
        reset.set_high().map_err(|_| Error::Gpio)?;

        self.drain_banner()?;
        self.state = ConnectionState::LinkReady;
        info!("module ready");
        Ok(())
    }

    /// Start the module, record credentials and optionally join
    ///
    /// Returns whether the module joined. With `attempt_join` false this is
    /// always `false`.
    pub fn init<RST: OutputPin>(
        &mut self,
        reset: &mut RST,
        identity: Option<Identity<'_>>,
        attempt_join: bool,
    ) -> Result<bool, Error<T::Error>> {
        self.startup(reset)?;
        if let Some(identity) = identity {
            self.configure(identity)?;
        }
        if attempt_join {
            self.join()
        } else {
            Ok(false)
        }
    }

    /// Hardware EUI burnt into the module (`sys get hweui`)
    pub fn hardware_eui(&mut self) -> Result<Eui, Error<T::Error>> {
        let value = self.dispatcher.query(format_args!("sys get hweui"))?;
        Ok(config::parse_credential::<16>(value.trim())?)
    }

    /// Whether `channel` is enabled
    pub fn channel_status(&mut self, channel: u8) -> Result<bool, Error<T::Error>> {
        let value = self
            .dispatcher
            .query(format_args!("mac get ch status {}", channel))?;
        config::parse_on_off(&value).ok_or(Error::ProtocolError(ResponseKind::RawLine))
    }

    /// Duty cycle of `channel`
    pub fn duty_cycle(&mut self, channel: u8) -> Result<DutyCycle, Error<T::Error>> {
        let value = self
            .dispatcher
            .query(format_args!("mac get ch dcycle {}", channel))?;
        let raw = value
            .trim()
            .parse()
            .map_err(|_| Error::ProtocolError(ResponseKind::RawLine))?;
        Ok(DutyCycle { raw })
    }

    /// Current auto-reply state
    pub fn auto_reply(&mut self) -> Result<bool, Error<T::Error>> {
        let value = self.dispatcher.query(format_args!("mac get ar"))?;
        config::parse_on_off(&value).ok_or(Error::ProtocolError(ResponseKind::RawLine))
    }

    /// Set auto-reply, verified by read-back
    pub fn set_auto_reply(&mut self, enabled: bool) -> Result<(), Error<T::Error>> {
        config::write_auto_reply(&mut self.dispatcher, enabled)?;
        self.config.radio_mut().auto_reply = enabled;
        Ok(())
    }

    /// Set retransmissions for confirmed uplinks
    pub fn set_retransmissions(&mut self, count: u8) -> Result<(), Error<T::Error>> {
        self.dispatcher
            .expect_ok(format_args!("mac set retx {}", count))?;
        self.config.radio_mut().retransmissions = count;
        Ok(())
    }

    fn drain_banner(&mut self) -> Result<(), Error<T::Error>> {
        let transport = self.dispatcher.transport_mut();
        match transport
            .read_line(STARTUP_TIMEOUT_MS)
            .map_err(Error::Transport)?
        {
            Some(banner) => debug!("banner: {}", banner.as_str()),
            None => return Err(Error::CommunicationTimeout),
        }
        for _ in 1..MAX_BANNER_LINES {
            if transport
                .read_line(BANNER_QUIET_MS)
                .map_err(Error::Transport)?
                .is_none()
            {
                break;
            }
        }
        Ok(())
    }
}
