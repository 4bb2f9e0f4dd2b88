use std::io::{self, Write};

use anyhow::{Context, Result};
use dvl::{DvlEnsemble, JsonPublisher, Publisher};
use serde::Serialize;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

/// Create a publisher writing ensembles to `writer` in `format`.
pub fn publisher<'a, W: Write + 'a>(format: &Format, writer: W) -> Box<dyn Publisher + 'a> {
    match format {
        Format::Json => Box::new(JsonPublisher::new(writer)),
        Format::Text => Box::new(TextPublisher::new(writer)),
    }
}

/// One line per ensemble showing bottom-track state.
pub struct TextPublisher<W: Write> {
    writer: W,
    hb: handlebars::Handlebars<'static>,
}

impl<W: Write> TextPublisher<W> {
    pub fn new(writer: W) -> Self {
        let mut hb = handlebars::Handlebars::new();
        hb.register_escape_fn(handlebars::no_escape);
        assert!(hb
            .register_template_string("ensemble", ENSEMBLE_TEMPLATE)
            .is_ok());
        TextPublisher { writer, hb }
    }
}

impl<W: Write> Publisher for TextPublisher<W> {
    fn publish(&mut self, ensemble: DvlEnsemble) -> dvl::Result<()> {
        let line = self
            .hb
            .render("ensemble", &ensemble)
            .map_err(|err| io::Error::other(err.to_string()))?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

const ENSEMBLE_TEMPLATE: &str = "\
{{ first_ping.hour }}:{{ first_ping.minute }}:{{ first_ping.second }} \
vel=[{{ bottom_velocity.x }} {{ bottom_velocity.y }} {{ bottom_velocity.z }}] err={{ bottom_velocity.error }} \
range=[{{ #each beam_range }}{{ this }}{{ #if @last }}{{ else }} {{ /if }}{{ /each }}] \
status={{ bottom_status }} heading={{ heading }} depth={{ depth }}
";

/// Write `summary` to `writer`, pretty JSON or plain text depending on `format`.
pub fn write_summary<S, W>(format: &Format, summary: &S, mut writer: W) -> Result<()>
where
    S: Serialize,
    W: Write,
{
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, summary).context("serializing to json")?;
        }
        Format::Text => {
            let mut hb = handlebars::Handlebars::new();
            hb.register_escape_fn(handlebars::no_escape);
            assert!(hb
                .register_template_string("summary", SUMMARY_TEMPLATE)
                .is_ok());
            let data = hb.render("summary", summary).context("rendering text")?;
            writer
                .write_all(data.as_bytes())
                .context("writing summary")?;
        }
    }
    writer.write_all(b"\n").context("writing summary")
}

const SUMMARY_TEMPLATE: &str = r"-------------------------------------------
Cycles:    {{ cycles }}
Published: {{ published }}
{{ #each failures }}{{ @key }}: {{ this }}
{{ /each }}";
