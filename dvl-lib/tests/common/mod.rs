#![allow(dead_code)]

use std::io;
use std::time::Duration;

use dvl::pd5::{self, Distance, FirstPing, Velocity, VELOCITY_INVALID};
use dvl::{DvlEnsemble, Transport};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const WINDOW: usize = 255;

/// An ensemble with a distinct value in every field, including sentinels.
pub fn sample_ensemble() -> DvlEnsemble {
    DvlEnsemble {
        id: pd5::ID,
        format: pd5::FORMAT,
        byte_count: pd5::BYTE_COUNT,
        system_config: 0xf3,
        bottom_velocity: Velocity {
            x: 1234,
            y: -987,
            z: VELOCITY_INVALID,
            error: 12,
        },
        beam_range: [5000, 0, 5120, 65535],
        bottom_status: 0x40,
        water_velocity: [VELOCITY_INVALID, -1, 1, 32767],
        ref_layer_start: 0,
        ref_layer_end: 0,
        ref_layer_status: 3,
        first_ping: FirstPing {
            hour: 23,
            minute: 59,
            second: 58,
            error: 99,
        },
        bit_result: 0xbeef,
        speed_of_sound: 1482,
        temperature: -1500,
        salinity: 35,
        depth: 812,
        pitch: -300,
        roll: 275,
        heading: 17999,
        bottom_distance: Distance {
            east: 0x0102_0304,
            north: 0xfffe_fdfc,
            up: 7,
            error: 0,
        },
        water_distance: Distance {
            east: 1,
            north: 2,
            up: 3,
            error: 0x8000_0000,
        },
        checksum: 0,
    }
}

/// `sample_ensemble` with its transmitted checksum filled in, as a decoder returns it.
pub fn decoded_sample() -> DvlEnsemble {
    let dat = sample_ensemble().encode();
    DvlEnsemble {
        checksum: u16::from_le_bytes([dat[86], dat[87]]),
        ..sample_ensemble()
    }
}

/// Seeded random bytes containing no PD5 id byte.
pub fn noise(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| loop {
            let b: u8 = rng.gen();
            if b != pd5::ID {
                break b;
            }
        })
        .collect()
}

/// A full window of noise with `frame` copied in at `offset`.
pub fn window_with(frame: &[u8], offset: usize, seed: u64) -> Vec<u8> {
    let mut dat = noise(seed, WINDOW);
    dat[offset..offset + frame.len()].copy_from_slice(frame);
    dat
}

/// Transport returning canned bytes, recording how often it was read.
pub struct MockTransport {
    dat: Vec<u8>,
    pub reads: usize,
}

impl MockTransport {
    pub fn new(dat: Vec<u8>) -> Self {
        MockTransport { dat, reads: 0 }
    }
}

impl Transport for MockTransport {
    fn read_up_to(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
        self.reads += 1;
        let num = self.dat.len().min(buf.len());
        buf[..num].copy_from_slice(&self.dat[..num]);
        Ok(num)
    }
}
