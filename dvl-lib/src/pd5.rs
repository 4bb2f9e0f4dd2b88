//! Teledyne RDI Explorer DVL PD5 output format.
//!
//! PD5 is an 88 byte binary ensemble. All multi-byte values are little-endian (LSB
//! first). Values are decoded exactly as transmitted; sentinel values such as
//! [VELOCITY_INVALID] or a zero beam range are not interpreted here.
//!
//! | Offset | Width  | Field                                   |
//! |--------|--------|-----------------------------------------|
//! | 0      | u8     | DVL id, `0x7D`                          |
//! | 1      | u8     | data structure, `0x01`                  |
//! | 2      | u16    | byte count, excluding checksum (`0x56`) |
//! | 4      | u8     | system configuration                    |
//! | 5      | 4×i16  | bottom-track velocity X, Y, Z, error    |
//! | 13     | 4×u16  | beam 1-4 range to bottom                |
//! | 21     | u8     | bottom status                           |
//! | 22     | 4×i16  | water-mass velocity 1-4                 |
//! | 30     | 2×u16  | reference layer start, end              |
//! | 34     | u8     | reference layer status                  |
//! | 35     | 4×u8   | time of first ping                      |
//! | 39     | u16    | BIT result                              |
//! | 41     | u16    | speed of sound                          |
//! | 43     | i16    | temperature                             |
//! | 45     | u8     | salinity                                |
//! | 46     | u16    | depth                                   |
//! | 48     | 3×i16  | pitch, roll, heading                    |
//! | 54     | 4×u32  | distance made good over bottom          |
//! | 70     | 4×u32  | distance made good over water-mass      |
//! | 86     | u16    | checksum                                |
use crate::framing::{checksum, ValidatedFrame};

/// DVL identification byte.
pub const ID: u8 = 0x7d;
/// Data structure byte identifying PD5.
pub const FORMAT: u8 = 0x01;
/// Total frame length in bytes.
pub const LEN: usize = 88;
/// Offset of the checksum LSB. The checksum covers all bytes before it.
pub const CHECKSUM_OFFSET: usize = 86;
/// Byte count field value for a PD5 frame.
pub const BYTE_COUNT: u16 = 0x56;
/// Velocity value transmitted when a velocity could not be computed.
pub const VELOCITY_INVALID: i16 = i16::MIN;

const BOTTOM_DISTANCE_OFFSET: usize = 54;
const WATER_DISTANCE_OFFSET: usize = 70;

/// Velocity components in mm/s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Velocity {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub error: i16,
}

/// Time of the first ping of the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirstPing {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub error: u8,
}

/// Distance made good, accumulated over all pings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Distance {
    pub east: u32,
    pub north: u32,
    pub up: u32,
    pub error: u32,
}

/// A single decoded PD5 ensemble.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DvlEnsemble {
    pub id: u8,
    pub format: u8,
    pub byte_count: u16,
    /// System configuration bit field, passed through as-is.
    pub system_config: u8,
    /// Bottom-track velocity, mm/s. [VELOCITY_INVALID] indicates a bad velocity.
    pub bottom_velocity: Velocity,
    /// Vertical range from each beam to the bottom, mm. 0 indicates a bad read.
    pub beam_range: [u16; 4],
    /// 0 when OK, otherwise a vendor error code.
    pub bottom_status: u8,
    /// Water-mass velocity, mm/s.
    pub water_velocity: [i16; 4],
    pub ref_layer_start: u16,
    pub ref_layer_end: u16,
    pub ref_layer_status: u8,
    pub first_ping: FirstPing,
    pub bit_result: u16,
    /// Speed of sound, m/s.
    pub speed_of_sound: u16,
    /// Temperature in 0.01 °C increments from +40.00 °C.
    pub temperature: i16,
    pub salinity: u8,
    pub depth: u16,
    pub pitch: i16,
    pub roll: i16,
    pub heading: i16,
    pub bottom_distance: Distance,
    pub water_distance: Distance,
    pub checksum: u16,
}

/// Decode a validated PD5 frame.
///
/// # Panics
/// Never for a frame produced by [crate::framing::validate] with [crate::Format::Pd5],
/// which guarantees [LEN] bytes.
#[must_use]
pub fn decode(frame: &ValidatedFrame<'_>) -> DvlEnsemble {
    let dat = frame.data();
    debug_assert_eq!(dat.len(), LEN);

    let u16_at = |i: usize| u16::from_le_bytes([dat[i], dat[i + 1]]);
    let i16_at = |i: usize| i16::from_le_bytes([dat[i], dat[i + 1]]);
    let u32_at = |i: usize| u32::from_le_bytes([dat[i], dat[i + 1], dat[i + 2], dat[i + 3]]);
    let distance_at = |i: usize| Distance {
        east: u32_at(i),
        north: u32_at(i + 4),
        up: u32_at(i + 8),
        error: u32_at(i + 12),
    };

    DvlEnsemble {
        id: dat[0],
        format: dat[1],
        byte_count: u16_at(2),
        system_config: dat[4],
        bottom_velocity: Velocity {
            x: i16_at(5),
            y: i16_at(7),
            z: i16_at(9),
            error: i16_at(11),
        },
        beam_range: [u16_at(13), u16_at(15), u16_at(17), u16_at(19)],
        bottom_status: dat[21],
        water_velocity: [i16_at(22), i16_at(24), i16_at(26), i16_at(28)],
        ref_layer_start: u16_at(30),
        ref_layer_end: u16_at(32),
        ref_layer_status: dat[34],
        first_ping: FirstPing {
            hour: dat[35],
            minute: dat[36],
            second: dat[37],
            error: dat[38],
        },
        bit_result: u16_at(39),
        speed_of_sound: u16_at(41),
        temperature: i16_at(43),
        salinity: dat[45],
        depth: u16_at(46),
        pitch: i16_at(48),
        roll: i16_at(50),
        heading: i16_at(52),
        bottom_distance: distance_at(BOTTOM_DISTANCE_OFFSET),
        water_distance: distance_at(WATER_DISTANCE_OFFSET),
        checksum: u16_at(CHECKSUM_OFFSET),
    }
}

impl DvlEnsemble {
    /// Encode into PD5 wire format.
    ///
    /// The checksum is computed from the encoded bytes; the `checksum` field is ignored.
    #[must_use]
    pub fn encode(&self) -> [u8; LEN] {
        let mut buf = [0u8; LEN];
        let mut w = Writer {
            buf: &mut buf,
            pos: 0,
        };

        w.u8(self.id);
        w.u8(self.format);
        w.u16(self.byte_count);
        w.u8(self.system_config);
        let v = &self.bottom_velocity;
        for x in [v.x, v.y, v.z, v.error] {
            w.i16(x);
        }
        for x in self.beam_range {
            w.u16(x);
        }
        w.u8(self.bottom_status);
        for x in self.water_velocity {
            w.i16(x);
        }
        w.u16(self.ref_layer_start);
        w.u16(self.ref_layer_end);
        w.u8(self.ref_layer_status);
        let t = &self.first_ping;
        for x in [t.hour, t.minute, t.second, t.error] {
            w.u8(x);
        }
        w.u16(self.bit_result);
        w.u16(self.speed_of_sound);
        w.i16(self.temperature);
        w.u8(self.salinity);
        w.u16(self.depth);
        w.i16(self.pitch);
        w.i16(self.roll);
        w.i16(self.heading);
        for d in [&self.bottom_distance, &self.water_distance] {
            for x in [d.east, d.north, d.up, d.error] {
                w.u32(x);
            }
        }
        debug_assert_eq!(w.pos, CHECKSUM_OFFSET);

        let sum = checksum(&buf[..CHECKSUM_OFFSET]);
        buf[CHECKSUM_OFFSET..].copy_from_slice(&sum.to_le_bytes());
        buf
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, dat: &[u8]) {
        self.buf[self.pos..self.pos + dat.len()].copy_from_slice(dat);
        self.pos += dat.len();
    }

    fn u8(&mut self, x: u8) {
        self.put(&[x]);
    }

    fn u16(&mut self, x: u16) {
        self.put(&x.to_le_bytes());
    }

    fn i16(&mut self, x: i16) {
        self.put(&x.to_le_bytes());
    }

    fn u32(&mut self, x: u32) {
        self.put(&x.to_le_bytes());
    }
}
