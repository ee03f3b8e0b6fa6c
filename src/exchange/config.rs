use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::exchange::buffer::Element;
use crate::exchange::communication::local_communicator::DEFAULT_EAGER_LIMIT_BYTES;
use crate::exchange::communication::{Tag, EXCHANGE_TAG};
use crate::exchange::error::{ExchangeError, Result};

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    #[arg(long, short)]
    pub config_path: Option<String>,
    /// Number of ranks for the channel transport. The mpi transport uses the world size.
    #[arg(long, short)]
    pub num_parts: Option<u32>,
    /// Number of integers per message.
    #[arg(long, short)]
    pub message_size: Option<usize>,
    #[arg(long, value_enum)]
    pub schedule: Option<Schedule>,
    /// Largest message in bytes (inclusive) the channel transport buffers without a matching
    /// receive.
    #[arg(long)]
    pub eager_limit: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub modules: Modules,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Modules {
    #[serde(default)]
    pub exchange: Exchange,
    #[serde(default)]
    pub transport: Transport,
    #[serde(default)]
    pub partitioning: Partitioning,
    #[serde(default)]
    pub output: Output,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Exchange {
    #[serde(default = "default_message_size")]
    pub message_size: usize,
    #[serde(default = "default_tag")]
    pub tag: Tag,
    #[serde(default = "default_initiator_fill")]
    pub initiator_fill: Element,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub responder_reply: ResponderReply,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transport {
    /// Largest buffered message in bytes, inclusive. `0` makes every send a rendezvous.
    #[serde(default = "default_eager_limit_bytes")]
    pub eager_limit_bytes: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Partitioning {
    #[serde(default = "default_num_parts")]
    pub num_parts: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Output {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: Logging,
}

/// Order in which the two endpoints issue their blocking calls.
#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default)]
pub enum Schedule {
    /// Rank 0 sends then receives, rank 1 receives then sends.
    #[default]
    Safe,
    /// Both ranks send then receive. Hangs forever once messages exceed the transport's
    /// buffering.
    Symmetric,
}

/// What rank 1 sends back after it has received.
#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy, Serialize, Deserialize, Default)]
pub enum ResponderReply {
    /// Its own send buffer.
    #[default]
    Own,
    /// The buffer it just received into.
    Echo,
}

/// Have this extra layer of log level enum, as tracing subscriber has no
/// off/none option by default.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum Logging {
    #[default]
    None,
    Info,
}

impl Config {
    pub fn from_args(args: &CommandLineArgs) -> Result<Self> {
        let mut config = match &args.config_path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        // command line arguments take precedence over the file
        if let Some(num_parts) = args.num_parts {
            config.modules.partitioning.num_parts = num_parts;
        }
        if let Some(message_size) = args.message_size {
            config.modules.exchange.message_size = message_size;
        }
        if let Some(schedule) = args.schedule {
            config.modules.exchange.schedule = schedule;
        }
        if let Some(eager_limit) = args.eager_limit {
            config.modules.transport.eager_limit_bytes = eager_limit;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let reader = BufReader::new(File::open(path).map_err(|e| {
            ExchangeError::Config(format!(
                "Failed to open config file at {path}. Original error was {e}"
            ))
        })?);
        serde_yaml::from_reader(reader).map_err(|e| {
            ExchangeError::Config(format!(
                "Failed to parse config at {path}. Original error was: {e}"
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.modules.exchange.tag < 0 {
            return Err(ExchangeError::Config(format!(
                "Tag must not be negative, but was {}",
                self.modules.exchange.tag
            )));
        }
        if self.modules.partitioning.num_parts == 0 {
            return Err(ExchangeError::Config(
                "At least one participant is needed".to_string(),
            ));
        }
        Ok(())
    }

    pub fn exchange(&self) -> &Exchange {
        &self.modules.exchange
    }

    pub fn transport(&self) -> &Transport {
        &self.modules.transport
    }

    pub fn partitioning(&self) -> &Partitioning {
        &self.modules.partitioning
    }

    pub fn output(&self) -> &Output {
        &self.modules.output
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Exchange {
            message_size: default_message_size(),
            tag: default_tag(),
            initiator_fill: default_initiator_fill(),
            schedule: Schedule::default(),
            responder_reply: ResponderReply::default(),
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport {
            eager_limit_bytes: default_eager_limit_bytes(),
        }
    }
}

impl Default for Partitioning {
    fn default() -> Self {
        Partitioning {
            num_parts: default_num_parts(),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Output {
            output_dir: default_output_dir(),
            logging: Logging::default(),
        }
    }
}

// 256K ints, i.e. 1 MiB per message
fn default_message_size() -> usize {
    256 * 1024
}

fn default_tag() -> Tag {
    EXCHANGE_TAG
}

fn default_initiator_fill() -> Element {
    12345
}

fn default_eager_limit_bytes() -> usize {
    DEFAULT_EAGER_LIMIT_BYTES
}

fn default_num_parts() -> u32 {
    2
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./")
}
