//! Scoped MAC pause bracket
//!
//! Radio-layer queries need the LoRaWAN stack suspended with `mac pause`. The
//! [`RadioPause`] guard holds the dispatcher for the duration of the pause and
//! sends `mac resume` exactly once: explicitly through [`RadioPause::resume`],
//! or on drop for any other exit path.

use embedded_hal::blocking::delay::DelayMs;

use crate::device::Rn2483;
use crate::dispatcher::{Dispatcher, DEFAULT_TIMEOUT_MS};
use crate::error::Error;
use crate::response::{ResponseKind, ResponseOutcome};
use crate::transport::Transport;

/// Valid `radio get pwr` range
const POWER_RANGE: core::ops::RangeInclusive<i8> = -3..=15;

/// Active MAC pause
pub struct RadioPause<'a, T: Transport> {
    dispatcher: &'a mut Dispatcher<T>,
    window_ms: u32,
    resumed: bool,
}

impl<'a, T: Transport> RadioPause<'a, T> {
    /// Send `mac pause`; fails without pausing if no window is granted
    pub fn begin(dispatcher: &'a mut Dispatcher<T>) -> Result<Self, Error<T::Error>> {
        let window = dispatcher.query(format_args!("mac pause"))?;
        let window_ms: u32 = window
            .trim()
            .parse()
            .map_err(|_| Error::ProtocolError(ResponseKind::RawLine))?;
        if window_ms == 0 {
            return Err(Error::RadioUnavailable);
        }

        debug!("mac paused for {} ms", window_ms);
        Ok(Self {
            dispatcher,
            window_ms,
            resumed: false,
        })
    }

    /// Pause window granted by the module, in milliseconds
    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }

    /// Signal-to-noise ratio of the last received packet
    pub fn snr(&mut self) -> Result<i8, Error<T::Error>> {
        let value = self.dispatcher.query(format_args!("radio get snr"))?;
        value
            .trim()
            .parse()
            .map_err(|_| Error::ProtocolError(ResponseKind::RawLine))
    }

    /// Current output power setting
    pub fn power(&mut self) -> Result<i8, Error<T::Error>> {
        let value = self.dispatcher.query(format_args!("radio get pwr"))?;
        match value.trim().parse::<i8>() {
            Ok(power) if POWER_RANGE.contains(&power) => Ok(power),
            _ => Err(Error::ProtocolError(ResponseKind::RawLine)),
        }
    }

    /// Send `mac resume`, which must be acknowledged
    pub fn resume(mut self) -> Result<(), Error<T::Error>> {
        self.resumed = true;
        send_resume(&mut *self.dispatcher)
    }
}

impl<T: Transport> Drop for RadioPause<'_, T> {
    fn drop(&mut self) {
        if !self.resumed && send_resume(&mut *self.dispatcher).is_err() {
            error!("mac resume failed, MAC layer may stay paused");
        }
    }
}

fn send_resume<T: Transport>(dispatcher: &mut Dispatcher<T>) -> Result<(), Error<T::Error>> {
    match dispatcher.send(format_args!("mac resume"), DEFAULT_TIMEOUT_MS)? {
        ResponseOutcome::Acknowledged => Ok(()),
        other => Err(Error::ProtocolError(other.kind())),
    }
}

impl<T, D> Rn2483<T, D>
where
    T: Transport,
    D: DelayMs<u32>,
{
    /// Pause the MAC layer for direct radio access
    pub fn pause(&mut self) -> Result<RadioPause<'_, T>, Error<T::Error>> {
        RadioPause::begin(&mut self.dispatcher)
    }

    /// Signal-to-noise ratio of the last received packet, -128 to 127
    pub fn snr(&mut self) -> Result<i8, Error<T::Error>> {
        let mut pause = self.pause()?;
        let snr = pause.snr();
        pause.resume()?;
        snr
    }

    /// Output power setting, -3 to 15
    pub fn power(&mut self) -> Result<i8, Error<T::Error>> {
        let mut pause = self.pause()?;
        let power = pause.power();
        pause.resume()?;
        power
    }
}
