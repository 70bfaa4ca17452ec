use crate::domain::{Command, CommandParams};
use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "meter-reader", version, about = "Get data from an Eagle energy gateway")]
pub struct Cli {
    /// Gateway host name or IP address
    pub address: String,

    /// Gateway port [default: 5002, or gateway.port from the configuration]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Command to send: LIST_DEVICES, GET_DEVICE_DATA, GET_INSTANTANEOUS_DEMAND, GET_DEMAND_VALUES,
    /// GET_SUMMATION_VALUES, GET_FAST_POLL_STATUS, SET_FAST_POLL or GET_HISTORY_DATA
    #[arg(short, long, default_value = "GET_DEVICE_DATA")]
    pub command: Command,

    /// Print the raw, undecoded response
    #[arg(short, long, conflicts_with_all = ["json", "demand"])]
    pub raw: bool,

    /// Print the decoded response as JSON
    #[arg(long, conflicts_with = "demand")]
    pub json: bool,

    /// Print the instantaneous demand in kW and ignore --command
    #[arg(long)]
    pub demand: bool,

    /// Start of the requested history (RFC 3339)
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// End of the requested history (RFC 3339)
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,

    #[arg(long)]
    pub interval: Option<u32>,

    /// Sampling frequency in seconds
    #[arg(long)]
    pub frequency: Option<u32>,

    /// Fast poll duration in minutes
    #[arg(long)]
    pub duration: Option<u32>,

    /// Column delimiter for historical data
    #[arg(long)]
    pub delimiter: Option<String>,

    /// I/O timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Log more; repeat for even more
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn params(&self) -> CommandParams {
        CommandParams {
            start: self.start,
            end: self.end,
            interval: self.interval,
            frequency: self.frequency,
            duration: self.duration,
        }
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}
