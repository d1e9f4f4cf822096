//! `asix-eepromtool`: dump or program the EEPROM of an ASIX USB Ethernet
//! adapter.
//!
//! Usage: asix-eepromtool -d 0b95:772b -b 2 -n 10 -r eep.bin -s 256

use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use asix_eeprom::{AddressSelect, AsixDevice, EepromImage, Error, Selector};

const HEADER: &str = "\
------------------------------------
        asix_eepromtool
------------------------------------";

const EXAMPLE: &str = "\
example:
asix-eepromtool -d 0b95:772b -b 2 -n 10 -r eep.bin -s 256

ps. Run this tool as root";

#[derive(Parser, Debug)]
#[command(name = "asix-eepromtool", version)]
#[command(about = "eeprom programming tool for ASIX-based USB ethernet interfaces")]
#[command(before_help = HEADER, after_help = EXAMPLE)]
struct Cli {
    /// vid and pid of device in hex, e.g. 0b95:772b
    #[arg(short, long, value_name = "VID:PID")]
    device: Option<String>,

    /// bus number, e.g. 2, or -1 to select the last
    #[arg(short, long, value_name = "BUS", allow_negative_numbers = true)]
    bus: Option<i32>,

    /// device number, e.g. 4, or -1 to select the last
    #[arg(short = 'n', long, value_name = "N", allow_negative_numbers = true)]
    device_number: Option<i32>,

    /// save the eeprom contents to FILE
    #[arg(short, long, value_name = "FILE")]
    read: Option<PathBuf>,

    /// write FILE to eeprom
    #[arg(short, long, value_name = "FILE")]
    write: Option<PathBuf>,

    /// size of eeprom in bytes (e.g. 256 or 512)
    #[arg(short, long, value_name = "BYTES")]
    size: Option<usize>,

    /// timeout of each USB control transfer in milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = 100)]
    timeout: u64,
}

/// A validated invocation.
struct Job {
    selector: Selector,
    size: usize,
    read: Option<(PathBuf, File)>,
    write: Option<(PathBuf, File)>,
    timeout: Duration,
}

/// Parse `vid:pid` in hex. Either half missing or zero is rejected.
fn parse_vid_pid(s: &str) -> Option<(u16, u16)> {
    let (vid, pid) = s.split_once(':')?;
    let vid = u16::from_str_radix(vid.trim(), 16).ok()?;
    let pid = u16::from_str_radix(pid.trim(), 16).ok()?;
    (vid != 0 && pid != 0).then_some((vid, pid))
}

/// Default log filter; `RUST_LOG` overrides it.
const LOG_FILTER: &str = "warn,asix_eeprom=info";

fn print_usage() {
    let _ = Cli::command().print_help();
}

impl Job {
    fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let Some((vid, pid)) = cli.device.as_deref().and_then(parse_vid_pid) else {
            bail!("Device VID:PID missing or wrong format");
        };

        let size = match cli.size {
            Some(size) if size > 0 => size,
            _ => bail!("EEPROM size not specified"),
        };

        let read = match cli.read {
            Some(path) => match File::create(&path) {
                Ok(file) => Some((path, file)),
                Err(e) => bail!("Read/write filename not specified or file open error: {}: {e}", path.display()),
            },
            None => None,
        };
        let write = match cli.write {
            Some(path) => match File::open(&path) {
                Ok(file) => Some((path, file)),
                Err(e) => bail!("Read/write filename not specified or file open error: {}: {e}", path.display()),
            },
            None => None,
        };
        if read.is_none() && write.is_none() {
            bail!("Read/write filename not specified or file open error");
        }

        if size % 2 != 0 {
            bail!("EEPROM size must be a multiple of 2");
        }

        let selector = Selector::new(vid, pid)
            .bus(AddressSelect::from_arg(cli.bus.unwrap_or(0))?)
            .device_number(AddressSelect::from_arg(cli.device_number.unwrap_or(0))?);

        Ok(Self {
            selector,
            size,
            read,
            write,
            timeout: Duration::from_millis(cli.timeout),
        })
    }
}

fn run(job: Job) -> anyhow::Result<()> {
    let Job {
        selector,
        size,
        read,
        write,
        timeout,
    } = job;

    println!("Device is {:04X}:{:04X}", selector.vendor_id, selector.product_id);
    println!("EEPROM is {size} bytes");
    if selector.is_addressed() {
        println!("Bus {}, device {}", describe(selector.bus), describe(selector.device_number));
    }

    let mut dev = AsixDevice::open(&selector).context("Device open error")?;
    dev.set_timeout(timeout);
    println!("Device opened");

    if let Some((path, mut file)) = read {
        println!("Reading...");
        let image = dev.read_eeprom(size)?;
        file.write_all(&image.to_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if let Some((path, file)) = write {
        println!("Writing...");
        let mut buf = Vec::with_capacity(size);
        file.take(size as u64)
            .read_to_end(&mut buf)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if buf.len() < size {
            let err = Error::ImageTooShort {
                expected: size,
                actual: buf.len(),
            };
            return Err(anyhow::Error::new(err).context(path.display().to_string()));
        }
        let image = EepromImage::from_bytes(&buf)?;
        dev.write_eeprom(size, &image)?;
    }

    dev.close();
    Ok(())
}

fn describe(select: AddressSelect) -> String {
    match select {
        AddressSelect::Unspecified => "any".to_string(),
        AddressSelect::Last => "last".to_string(),
        AddressSelect::Exact(n) => n.to_string(),
    }
}

/// What to do with the command line before any device work.
#[derive(Debug)]
enum Dispatch {
    /// Arguments parsed; go ahead.
    Run(Cli),
    /// Print usage and exit with this code.
    Usage(u8),
    /// `--help` or `--version`: print clap's output and exit 0.
    Print(clap::Error),
}

/// No arguments and out-of-range bus/device numbers exit 1 after the usage
/// text; an unknown option exits 0.
fn dispatch(args: Vec<OsString>) -> Dispatch {
    if args.len() <= 1 {
        return Dispatch::Usage(1);
    }

    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Dispatch::Print(e);
        }
        Err(e) => {
            log::debug!("argument error: {e}");
            return Dispatch::Usage(0);
        }
    };

    let bad_address = [cli.bus, cli.device_number]
        .into_iter()
        .flatten()
        .any(|n| AddressSelect::from_arg(n).is_err());
    if bad_address {
        return Dispatch::Usage(1);
    }

    Dispatch::Run(cli)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(LOG_FILTER)).init();

    let cli = match dispatch(std::env::args_os().collect()) {
        Dispatch::Run(cli) => cli,
        Dispatch::Usage(code) => {
            print_usage();
            return ExitCode::from(code);
        }
        Dispatch::Print(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    println!("{HEADER}");
    let job = match Job::from_cli(cli) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(job) {
        Ok(()) => {
            println!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vid_pid_parsing() {
        assert_eq!(parse_vid_pid("0b95:772b"), Some((0x0b95, 0x772b)));
        assert_eq!(parse_vid_pid("B95:7720"), Some((0x0b95, 0x7720)));
        assert_eq!(parse_vid_pid("0b95"), None);
        assert_eq!(parse_vid_pid("0b95:"), None);
        assert_eq!(parse_vid_pid("0000:772b"), None);
        assert_eq!(parse_vid_pid("zz:772b"), None);
    }

    #[test]
    fn cli_accepts_last_sentinels() {
        let cli = Cli::try_parse_from([
            "asix-eepromtool", "-d", "0b95:772b", "-b", "-1", "-n", "-1", "-s", "256",
        ])
        .unwrap();
        assert_eq!(cli.bus, Some(-1));
        assert_eq!(cli.device_number, Some(-1));
        assert_eq!(cli.size, Some(256));
        assert_eq!(cli.timeout, 100);
    }

    #[test]
    fn cli_long_options() {
        let cli = Cli::try_parse_from([
            "asix-eepromtool",
            "--device=0b95:772b",
            "--bus=2",
            "--device-number=10",
            "--read=eep.bin",
            "--size=512",
        ])
        .unwrap();
        assert_eq!(cli.device.as_deref(), Some("0b95:772b"));
        assert_eq!(cli.bus, Some(2));
        assert_eq!(cli.device_number, Some(10));
        assert_eq!(cli.read, Some(PathBuf::from("eep.bin")));
        assert_eq!(cli.size, Some(512));
    }

    #[test]
    fn cli_unknown_option_is_an_error() {
        let err = Cli::try_parse_from(["asix-eepromtool", "--frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    fn dispatch_for(args: &[&str]) -> Dispatch {
        let mut argv = vec![OsString::from("asix-eepromtool")];
        argv.extend(args.iter().map(OsString::from));
        dispatch(argv)
    }

    #[test]
    fn no_arguments_exit_1() {
        assert!(matches!(dispatch_for(&[]), Dispatch::Usage(1)));
    }

    #[test]
    fn unknown_option_exits_0() {
        assert!(matches!(dispatch_for(&["--frobnicate"]), Dispatch::Usage(0)));
        assert!(matches!(dispatch_for(&["-x", "1"]), Dispatch::Usage(0)));
    }

    #[test]
    fn address_below_last_exits_1() {
        assert!(matches!(
            dispatch_for(&["-d", "0b95:772b", "-b", "-2", "-s", "256", "-r", "eep.bin"]),
            Dispatch::Usage(1)
        ));
        assert!(matches!(
            dispatch_for(&["-d", "0b95:772b", "-n", "-5", "-s", "256", "-r", "eep.bin"]),
            Dispatch::Usage(1)
        ));
    }

    #[test]
    fn help_is_printed_by_clap() {
        assert!(matches!(dispatch_for(&["--help"]), Dispatch::Print(_)));
    }

    #[test]
    fn valid_arguments_run() {
        match dispatch_for(&["-d", "0b95:772b", "-b", "-1", "-n", "-1", "-s", "256", "-r", "eep.bin"]) {
            Dispatch::Run(cli) => assert_eq!(cli.bus, Some(-1)),
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn log_filter_shows_device_identity() {
        use log::Log;

        let logger = env_logger::Builder::new().parse_filters(LOG_FILTER).build();
        let ours = log::Metadata::builder()
            .level(log::Level::Info)
            .target("asix_eeprom::context")
            .build();
        let usb = log::Metadata::builder()
            .level(log::Level::Info)
            .target("nusb::platform")
            .build();
        let usb_warning = log::Metadata::builder()
            .level(log::Level::Warn)
            .target("nusb::platform")
            .build();
        assert!(logger.enabled(&ours));
        assert!(!logger.enabled(&usb));
        assert!(logger.enabled(&usb_warning));
    }

    fn job_for(args: &[&str]) -> anyhow::Result<Job> {
        let mut argv = vec!["asix-eepromtool"];
        argv.extend_from_slice(args);
        Job::from_cli(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn job_requires_device() {
        let err = job_for(&["-s", "256", "-r", "/dev/null"]).err().unwrap();
        assert!(err.to_string().contains("VID:PID"));
    }

    #[test]
    fn job_requires_size() {
        let err = job_for(&["-d", "0b95:772b", "-r", "/dev/null"]).err().unwrap();
        assert!(err.to_string().contains("size not specified"));
    }

    #[test]
    fn job_requires_a_file() {
        let err = job_for(&["-d", "0b95:772b", "-s", "256"]).err().unwrap();
        assert!(err.to_string().contains("filename not specified"));
    }

    #[test]
    fn job_rejects_odd_size() {
        let err = job_for(&["-d", "0b95:772b", "-s", "257", "-w", "/dev/null"]).err().unwrap();
        assert!(err.to_string().contains("multiple of 2"));
    }

    #[test]
    fn job_resolves_selector() {
        let job = job_for(&["-d", "0b95:772b", "-s", "256", "-w", "/dev/null", "-b", "-1", "-n", "7"])
            .unwrap();
        assert_eq!(job.selector.bus, AddressSelect::Last);
        assert_eq!(job.selector.device_number, AddressSelect::Exact(7));
        assert_eq!(job.size, 256);
        assert!(job.read.is_none());
        assert!(job.write.is_some());
    }
}
