//! wifi - wireless radio management utility
//!
//! Tunes channels, regulatory domain, power, and bitrates via nl80211.

use clap::{Parser, Subcommand};
use wlink::Result;
use wlink::nl80211::{InterfaceMode, TxPower, WifiSession};

#[derive(Parser)]
#[command(name = "wifi")]
#[command(about = "Wireless radio management utility", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current operating frequency
    Freq {
        /// Interface name
        interface: String,
    },

    /// Tune to a center frequency in MHz
    SetFreq {
        /// Interface name
        interface: String,
        /// Center frequency in MHz
        mhz: u32,
    },

    /// Tune to a channel number
    SetChannel {
        /// Interface name
        interface: String,
        /// Channel number (2.4 or 5 GHz plan)
        channel: u8,
    },

    /// Request a regulatory domain change
    Reg {
        /// ISO 3166-1 alpha-2 country code
        domain: String,
    },

    /// Reload the regulatory database
    RegReload,

    /// Switch the interface operating mode
    Mode {
        /// Interface name
        interface: String,
        /// Operating mode
        #[arg(value_parser = parse_mode)]
        mode: InterfaceMode,
    },

    /// Configure transmit power
    Power {
        /// Interface name
        interface: String,
        /// "auto", or "limit:<mbm>" / "fixed:<mbm>"
        #[arg(value_parser = parse_power)]
        power: TxPower,
    },

    /// Restrict the legacy transmit bitrate mask
    Rates {
        /// Interface name
        interface: String,
        /// 2.4 GHz rates in units of 0.5 Mbps (comma separated)
        #[arg(long, value_delimiter = ',')]
        band2: Vec<u8>,
        /// 5 GHz rates in units of 0.5 Mbps (comma separated)
        #[arg(long, value_delimiter = ',')]
        band5: Vec<u8>,
    },

    /// List the radio's usable channels
    Channels {
        /// Interface name
        interface: String,
        /// Only report 2.4 GHz channels
        #[arg(long)]
        band2: bool,
        /// Stop after this many channels
        #[arg(long, default_value_t = 64)]
        max: usize,
    },
}

fn parse_mode(s: &str) -> std::result::Result<InterfaceMode, String> {
    match s {
        "adhoc" => Ok(InterfaceMode::Adhoc),
        "station" | "managed" => Ok(InterfaceMode::Station),
        "ap" => Ok(InterfaceMode::Ap),
        "monitor" => Ok(InterfaceMode::Monitor),
        "mesh" => Ok(InterfaceMode::MeshPoint),
        "ocb" => Ok(InterfaceMode::Ocb),
        _ => Err(format!("unknown mode: {}", s)),
    }
}

fn parse_power(s: &str) -> std::result::Result<TxPower, String> {
    if s == "auto" {
        return Ok(TxPower::Automatic);
    }

    let parse_mbm = |v: &str| {
        v.parse::<u32>()
            .map_err(|_| format!("bad power level: {}", v))
    };
    match s.split_once(':') {
        Some(("limit", v)) => Ok(TxPower::Limited(parse_mbm(v)?)),
        Some(("fixed", v)) => Ok(TxPower::Fixed(parse_mbm(v)?)),
        _ => Err(format!(
            "expected \"auto\", \"limit:<mbm>\", or \"fixed:<mbm>\", got {:?}",
            s
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut wifi = WifiSession::open().await?;

    match cli.command {
        Command::Freq { interface } => {
            let mhz = wifi.frequency(&interface).await?;
            println!("{} MHz", mhz);
        }
        Command::SetFreq { interface, mhz } => {
            wifi.set_frequency(&interface, mhz).await?;
        }
        Command::SetChannel { interface, channel } => {
            wifi.set_channel(&interface, channel).await?;
        }
        Command::Reg { domain } => {
            wifi.set_regdomain(&domain).await?;
        }
        Command::RegReload => {
            wifi.reload_regdb().await?;
        }
        Command::Mode { interface, mode } => {
            wifi.set_mode(&interface, mode).await?;
        }
        Command::Power { interface, power } => {
            wifi.set_tx_power(&interface, power).await?;
        }
        Command::Rates {
            interface,
            band2,
            band5,
        } => {
            wifi.set_bitrate_mask(&interface, &band2, &band5).await?;
        }
        Command::Channels {
            interface,
            band2,
            max,
        } => {
            let channels = wifi.supported_channels(&interface, band2, max).await?;
            for channel in channels {
                println!("{}", channel);
            }
        }
    }

    Ok(())
}
