//! DHT22 air temperature / humidity sensor.
//!
//! Single-wire protocol on an open-drain line with an external pull-up:
//!
//! 1. Host pulls the line low for ≥ 1 ms, then releases it.
//! 2. After 20–200 µs the sensor answers with 80 µs low + 80 µs high.
//! 3. 40 data bits follow, each a 50 µs low gap then a high pulse of
//!    ~27 µs (`0`) or ~70 µs (`1`).
//!
//! Frame layout: humidity ×10 (u16 BE), temperature ×10 (sign-magnitude,
//! bit 15 = negative), checksum = low byte of the sum of the first four.
//!
//! [`Dht22`] is generic over `embedded-hal` so the bit-level protocol runs
//! against mock pins in tests. On host targets [`AirSensor`] reads injected
//! values instead of a wire.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::control::snapshot::{AIR_HUMIDITY_RANGE_PCT, AIR_TEMPERATURE_RANGE_C};
use crate::error::SensorError;

const START_LOW_MS: u32 = 2;
const RELEASE_US: u32 = 40;
const EDGE_TIMEOUT_US: u32 = 100;
/// Longest the sensor may leave the released line high before answering.
const RESPONSE_TIMEOUT_US: u32 = 250;
/// Sample point after a bit's rising edge; between the `0` and `1` pulse widths.
const BIT_SAMPLE_US: u32 = 35;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl AirReading {
    fn checked(temperature_c: f32, humidity_pct: f32) -> Result<Self, SensorError> {
        if !AIR_TEMPERATURE_RANGE_C.contains(&temperature_c)
            || !AIR_HUMIDITY_RANGE_PCT.contains(&humidity_pct)
        {
            return Err(SensorError::OutOfRange);
        }
        Ok(Self {
            temperature_c,
            humidity_pct,
        })
    }
}

/// Validate and decode one 5-byte DHT22 frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<AirReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }
    let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
    let temperature = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };
    AirReading::checked(temperature, humidity)
}

// ── Bit-banged driver ─────────────────────────────────────────

pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// `pin` must already be configured open-drain with the line released.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn read(&mut self) -> Result<AirReading, SensorError> {
        let frame = self.read_frame();
        // Always leave the line released for the pull-up.
        let released = self.pin.set_high().map_err(|_| SensorError::GpioFailed);
        let frame = frame?;
        released?;
        decode_frame(frame)
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::GpioFailed)?;
        self.delay.delay_us(RELEASE_US);

        // Response: low then high, then the first bit's low gap. The
        // sensor may still be idle-high after the release delay.
        self.wait_for_within(false, RESPONSE_TIMEOUT_US)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut frame = [0u8; 5];
        for byte in &mut frame {
            for _ in 0..8 {
                *byte = (*byte << 1) | u8::from(self.read_bit()?);
            }
        }
        Ok(frame)
    }

    fn read_bit(&mut self) -> Result<bool, SensorError> {
        self.wait_for(true)?;
        self.delay.delay_us(BIT_SAMPLE_US);
        let bit = self.pin.is_high().map_err(|_| SensorError::GpioFailed)?;
        if bit {
            self.wait_for(false)?;
        }
        Ok(bit)
    }

    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        self.wait_for_within(high, EDGE_TIMEOUT_US)
    }

    fn wait_for_within(&mut self, high: bool, timeout_us: u32) -> Result<(), SensorError> {
        for _ in 0..timeout_us {
            if self.pin.is_high().map_err(|_| SensorError::GpioFailed)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}

// ── Dual-target sensor ────────────────────────────────────────

#[cfg(feature = "espidf")]
pub type AirDataPin =
    esp_idf_svc::hal::gpio::PinDriver<'static, esp_idf_svc::hal::gpio::AnyIOPin, esp_idf_svc::hal::gpio::InputOutput>;

#[cfg(feature = "espidf")]
pub struct AirSensor {
    dht: Dht22<AirDataPin, esp_idf_svc::hal::delay::Ets>,
}

#[cfg(feature = "espidf")]
impl AirSensor {
    pub fn new(pin: AirDataPin) -> Self {
        Self {
            dht: Dht22::new(pin, esp_idf_svc::hal::delay::Ets),
        }
    }

    pub fn read(&mut self) -> Result<AirReading, SensorError> {
        self.dht.read()
    }
}

#[cfg(not(feature = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

    use crate::error::SensorError;

    static TEMPERATURE_BITS: AtomicU32 = AtomicU32::new(22.0f32.to_bits());
    static HUMIDITY_BITS: AtomicU32 = AtomicU32::new(55.0f32.to_bits());
    // 0 = healthy, otherwise 1 + index into ERRORS.
    static FAILURE: AtomicU8 = AtomicU8::new(0);

    const ERRORS: [SensorError; 3] = [
        SensorError::Timeout,
        SensorError::ChecksumMismatch,
        SensorError::GpioFailed,
    ];

    pub fn set(temperature_c: f32, humidity_pct: f32) {
        TEMPERATURE_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
        HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
        FAILURE.store(0, Ordering::Relaxed);
    }

    pub fn fail(err: SensorError) {
        let code = ERRORS.iter().position(|e| *e == err).unwrap_or(0) as u8 + 1;
        FAILURE.store(code, Ordering::Relaxed);
    }

    pub fn read() -> Result<(f32, f32), SensorError> {
        match FAILURE.load(Ordering::Relaxed) {
            0 => Ok((
                f32::from_bits(TEMPERATURE_BITS.load(Ordering::Relaxed)),
                f32::from_bits(HUMIDITY_BITS.load(Ordering::Relaxed)),
            )),
            code => Err(ERRORS[usize::from(code - 1) % ERRORS.len()]),
        }
    }
}

/// Inject an air reading (clears any injected failure).
#[cfg(not(feature = "espidf"))]
pub fn sim_set_air(temperature_c: f32, humidity_pct: f32) {
    sim::set(temperature_c, humidity_pct);
}

/// Make the air sensor fail with `err` until the next [`sim_set_air`].
#[cfg(not(feature = "espidf"))]
pub fn sim_fail_air(err: SensorError) {
    sim::fail(err);
}

#[cfg(not(feature = "espidf"))]
#[derive(Default)]
pub struct AirSensor;

#[cfg(not(feature = "espidf"))]
impl AirSensor {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&mut self) -> Result<AirReading, SensorError> {
        let (temperature_c, humidity_pct) = sim::read()?;
        AirReading::checked(temperature_c, humidity_pct)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use super::*;

    #[test]
    fn decodes_positive_frame() {
        let r = decode_frame([0x02, 0x8C, 0x01, 0x5F, 0xEE]).unwrap();
        assert!((r.humidity_pct - 65.2).abs() < 0.01);
        assert!((r.temperature_c - 35.1).abs() < 0.01);
    }

    #[test]
    fn decodes_negative_temperature() {
        // -10.1 °C, 50.0 %
        let frame = [0x01, 0xF4, 0x80, 0x65, 0x01u8.wrapping_add(0xF4).wrapping_add(0x80).wrapping_add(0x65)];
        let r = decode_frame(frame).unwrap();
        assert!((r.temperature_c + 10.1).abs() < 0.01);
        assert!((r.humidity_pct - 50.0).abs() < 0.01);
    }

    #[test]
    fn rejects_bad_checksum() {
        assert_eq!(
            decode_frame([0x02, 0x8C, 0x01, 0x5F, 0xEF]),
            Err(SensorError::ChecksumMismatch)
        );
    }

    #[test]
    fn rejects_humidity_above_hundred() {
        // 100.1 %
        let frame = [0x03, 0xE9, 0x00, 0xC8, 0x03u8.wrapping_add(0xE9).wrapping_add(0xC8)];
        assert_eq!(decode_frame(frame), Err(SensorError::OutOfRange));
    }

    // ── Mock hardware ─────────────────────────────────────────

    struct StuckPin {
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for StuckPin {
        type Error = Infallible;
    }

    impl InputPin for StuckPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    impl OutputPin for StuckPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn silent_sensor_times_out() {
        let mut dht = Dht22::new(StuckPin { high: true }, NoDelay);
        assert_eq!(dht.read(), Err(SensorError::Timeout));
    }

    #[test]
    fn shorted_line_times_out() {
        let mut dht = Dht22::new(StuckPin { high: false }, NoDelay);
        assert_eq!(dht.read(), Err(SensorError::Timeout));
    }

    /// Replays a DHT22 waveform as (level, duration_us) segments against a
    /// virtual clock advanced by the delay.
    struct WaveformPin {
        segments: Vec<(bool, u32)>,
        now_us: std::rc::Rc<core::cell::Cell<u32>>,
        released_at: Option<u32>,
    }

    impl WaveformPin {
        fn level(&self) -> bool {
            let Some(start) = self.released_at else { return false };
            let mut t = self.now_us.get().saturating_sub(start);
            for &(level, len) in &self.segments {
                if t < len {
                    return level;
                }
                t -= len;
            }
            true
        }
    }

    impl embedded_hal::digital::ErrorType for WaveformPin {
        type Error = Infallible;
    }

    impl InputPin for WaveformPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.level())
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.level())
        }
    }

    impl OutputPin for WaveformPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.released_at = None;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            if self.released_at.is_none() {
                self.released_at = Some(self.now_us.get());
            }
            Ok(())
        }
    }

    struct VirtualDelay(std::rc::Rc<core::cell::Cell<u32>>);

    impl DelayNs for VirtualDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.set(self.0.get() + ns.div_ceil(1000));
        }
    }

    /// Idle pull-up for `response_us`, then the 80/80 response and data.
    fn waveform(response_us: u32, frame: [u8; 5]) -> Vec<(bool, u32)> {
        let mut segs = vec![(true, response_us), (false, 80), (true, 80)];
        for byte in frame {
            for i in (0..8).rev() {
                let one = (byte >> i) & 1 == 1;
                segs.push((false, 50));
                segs.push((true, if one { 70 } else { 27 }));
            }
        }
        segs.push((false, 50));
        segs
    }

    fn read_waveform(response_us: u32) -> Result<AirReading, SensorError> {
        let clock = std::rc::Rc::new(core::cell::Cell::new(0));
        let pin = WaveformPin {
            segments: waveform(response_us, [0x02, 0x8C, 0x01, 0x5F, 0xEE]),
            now_us: clock.clone(),
            released_at: Some(0),
        };
        Dht22::new(pin, VirtualDelay(clock)).read()
    }

    #[test]
    fn reads_frame_from_waveform() {
        let r = read_waveform(30).unwrap();
        assert!((r.humidity_pct - 65.2).abs() < 0.01);
        assert!((r.temperature_c - 35.1).abs() < 0.01);
    }

    #[test]
    fn slow_response_after_release_still_decodes() {
        for response_us in [RELEASE_US + 20, 120, 180] {
            let r = read_waveform(response_us)
                .unwrap_or_else(|e| panic!("{} µs response: {:?}", response_us, e));
            assert!((r.humidity_pct - 65.2).abs() < 0.01);
            assert!((r.temperature_c - 35.1).abs() < 0.01);
        }
    }

    #[test]
    fn response_never_arriving_times_out() {
        assert_eq!(read_waveform(RESPONSE_TIMEOUT_US + 100), Err(SensorError::Timeout));
    }
}
