use crate::{DvlEnsemble, Result};

/// Consumer of decoded ensembles, e.g., a message bus or telemetry link.
///
/// Ownership of each ensemble passes to the publisher. Delivery guarantees are up to
/// the implementation.
pub trait Publisher {
    /// # Errors
    /// If the ensemble could not be delivered.
    fn publish(&mut self, ensemble: DvlEnsemble) -> Result<()>;
}

impl<F> Publisher for F
where
    F: FnMut(DvlEnsemble) -> Result<()>,
{
    fn publish(&mut self, ensemble: DvlEnsemble) -> Result<()> {
        self(ensemble)
    }
}

#[cfg(feature = "serde")]
pub use json::JsonPublisher;

#[cfg(feature = "serde")]
mod json {
    use std::io::Write;

    use super::Publisher;
    use crate::{DvlEnsemble, Result};

    /// Writes each ensemble as a single line of JSON.
    pub struct JsonPublisher<W: Write> {
        writer: W,
    }

    impl<W: Write> JsonPublisher<W> {
        pub fn new(writer: W) -> Self {
            JsonPublisher { writer }
        }

        pub fn into_inner(self) -> W {
            self.writer
        }
    }

    impl<W: Write> Publisher for JsonPublisher<W> {
        fn publish(&mut self, ensemble: DvlEnsemble) -> Result<()> {
            serde_json::to_writer(&mut self.writer, &ensemble).map_err(std::io::Error::from)?;
            self.writer.write_all(b"\n")?;
            self.writer.flush()?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::fs;

        #[test]
        fn writes_json_lines() {
            let mut publisher = JsonPublisher::new(Vec::new());
            let ens = DvlEnsemble {
                speed_of_sound: 1500,
                ..Default::default()
            };
            publisher.publish(ens.clone()).unwrap();
            publisher.publish(ens).unwrap();

            let out = String::from_utf8(publisher.into_inner()).unwrap();
            let lines: Vec<&str> = out.lines().collect();
            assert_eq!(lines.len(), 2);
            let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
            assert_eq!(value["speed_of_sound"], 1500);
            assert_eq!(value["bottom_velocity"]["x"], 0);
        }

        #[test]
        fn json_round_trips_through_file() {
            let tmpdir = tempfile::tempdir().unwrap();
            let path = tmpdir.path().join("ensembles.jsonl");
            let ens = DvlEnsemble {
                heading: -1200,
                beam_range: [1, 2, 3, 4],
                ..Default::default()
            };

            let mut publisher = JsonPublisher::new(fs::File::create(&path).unwrap());
            publisher.publish(ens.clone()).unwrap();
            drop(publisher);

            let contents = fs::read_to_string(&path).unwrap();
            let got: DvlEnsemble = serde_json::from_str(contents.trim_end()).unwrap();
            assert_eq!(got, ens);
        }
    }
}
