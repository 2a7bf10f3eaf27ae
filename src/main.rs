use std::thread;
use std::time::Duration;

use log::{error, info};

use bme280_env::bme280::config::{Preset, Settings};
use bme280_env::bme280::registers::ADDR_PRIMARY;
use bme280_env::Bme280;

const DEFAULT_BUS: u8 = 1;
const DEFAULT_INTERVAL_SECS: u64 = 5;

struct Options {
    bus: u8,
    address: u16,
    interval: Duration,
    count: Option<u64>,
    settings: Settings,
}

fn usage() {
    eprintln!("Usage: bme280-monitor [--bus N] [--address 0x76] [--interval SECS] [--count N] [--preset NAME]");
    eprintln!("Presets: weather, humidity, indoor, gaming");
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>, String> {
    match args.iter().position(|a| a == flag) {
        Some(idx) => args
            .get(idx + 1)
            .map(|v| Some(v.as_str()))
            .ok_or_else(|| format!("{} requires a value", flag)),
        None => Ok(None),
    }
}

fn parse_address(s: &str) -> Result<u16, String> {
    let hex = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(hex, 16).map_err(|_| format!("Invalid address: {}", s))
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let bus = match flag_value(args, "--bus")? {
        Some(v) => v.parse::<u8>().map_err(|_| format!("Invalid bus: {}", v))?,
        None => DEFAULT_BUS,
    };
    let address = match flag_value(args, "--address")? {
        Some(v) => parse_address(v)?,
        None => ADDR_PRIMARY,
    };
    let interval = match flag_value(args, "--interval")? {
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| format!("Invalid interval: {}", v))?,
        None => Duration::from_secs(DEFAULT_INTERVAL_SECS),
    };
    let count = match flag_value(args, "--count")? {
        Some(v) => match v.parse::<u64>() {
            Ok(n) if n > 0 => Some(n),
            _ => return Err(format!("Invalid count: {} (must be at least 1)", v)),
        },
        None => None,
    };
    let settings = match flag_value(args, "--preset")? {
        Some(v) => Settings::from_preset(v.parse::<Preset>().map_err(|e| e.to_string())?),
        None => Settings::default(),
    };

    Ok(Options {
        bus,
        address,
        interval,
        count,
        settings,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        usage();
        return Ok(());
    }
    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            usage();
            std::process::exit(2);
        }
    };

    let mut sensor = Bme280::begin(options.address, options.bus, options.settings)?;
    info!(
        "BME280 ready on /dev/i2c-{} at {:#04x}",
        options.bus, options.address
    );

    let mut taken = 0u64;
    loop {
        match sensor.measure() {
            Ok(m) => {
                println!("Temperature: {:.2} C", m.temperature);
                println!("Humidity: {:.2} %", m.humidity);
                println!("Pressure: {:.2} hPa", m.pressure);
            }
            Err(e) => error!("reading failed: {}", e),
        }

        taken += 1;
        if options.count.map_or(false, |n| taken >= n) {
            break;
        }
        thread::sleep(options.interval);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("bme280-monitor")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn defaults_poll_bus_one_every_five_seconds() {
        let options = parse_options(&args(&[])).unwrap();
        assert_eq!(options.bus, 1);
        assert_eq!(options.address, 0x76);
        assert_eq!(options.interval, Duration::from_secs(5));
        assert_eq!(options.count, None);
        assert_eq!(options.settings, Settings::default());
    }

    #[test]
    fn flags_are_parsed() {
        let options = parse_options(&args(&[
            "--bus", "0", "--address", "0x77", "--interval", "1", "--count", "3", "--preset",
            "indoor",
        ]))
        .unwrap();
        assert_eq!(options.bus, 0);
        assert_eq!(options.address, 0x77);
        assert_eq!(options.interval, Duration::from_secs(1));
        assert_eq!(options.count, Some(3));
        assert_eq!(
            options.settings,
            Settings::from_preset(Preset::IndoorNavigation)
        );
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(parse_options(&args(&["--address", "zz"])).is_err());
        assert!(parse_options(&args(&["--preset", "outdoor"])).is_err());
        assert!(parse_options(&args(&["--count"])).is_err());
    }

    #[test]
    fn zero_count_is_rejected() {
        assert!(parse_options(&args(&["--count", "0"])).is_err());
        assert_eq!(parse_options(&args(&["--count", "1"])).unwrap().count, Some(1));
    }
}
