//! Command-line arguments for `wmibar`.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use clap::error::ErrorKind;

/// Status bar driven by files on a control socket.
#[derive(Parser, Debug)]
#[command(name = "wmibar", version, about, disable_version_flag = true)]
pub struct Args {
    /// Control socket path.
    #[arg(short = 's', long = "socket", value_name = "SOCKET")]
    pub socket: PathBuf,

    /// Bar defaults (font, colors, height, shell) as TOML.
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    _version: Option<bool>,

    /// Initial geometry as x,y,width,height. Zero width spans the screen.
    #[arg(value_name = "GEOMETRY")]
    pub geometry: Option<String>,
}

/// What to do after argument parsing.
#[derive(Debug)]
pub enum Parsed {
    Run(Args),
    /// Help or version was printed.
    Done,
    /// Usage error, already reported.
    Usage,
}

pub fn parse() -> Parsed {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Parsed::Run(args),
        Err(err) => {
            let _ = err.print();
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Parsed::Done,
                _ => Parsed::Usage,
            }
        },
    }
}
