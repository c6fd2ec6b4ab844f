//! wmibarc - command-line client for a running wmibar.
//!
//! ```text
//! wmibarc -s /tmp/bar.sock read /new
//! wmibarc -s /tmp/bar.sock write /1/data load 0.42
//! wmibarc -s /tmp/bar.sock ls /
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use wmibar_net::{Client, Request};

/// Read and write wmibar namespace files.
#[derive(Parser, Debug)]
#[command(name = "wmibarc", version, about)]
struct Cli {
    /// Control socket path.
    #[arg(short = 's', long = "socket", value_name = "SOCKET")]
    socket: PathBuf,

    /// Operation to perform.
    #[arg(value_enum)]
    op: Op,

    /// Namespace path, e.g. /ctl or /1/data.
    path: String,

    /// Data for `write`; remaining words are joined by single spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    data: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Op {
    Read,
    Write,
    Create,
    Remove,
    Ls,
}

impl Cli {
    fn request(&self) -> Request {
        let path = self.path.clone();
        match self.op {
            Op::Read => Request::Read(path),
            Op::Write => Request::Write(path, self.data.join(" ").into_bytes()),
            Op::Create => Request::Create(path),
            Op::Remove => Request::Remove(path),
            Op::Ls => Request::List(path),
        }
    }

    fn execute(&self) -> Result<()> {
        let mut client = Client::connect(&self.socket)?;
        let payload = client.request(&self.request())?.into_result()?;
        if !payload.is_empty() {
            let mut out = std::io::stdout().lock();
            out.write_all(&payload)?;
            if payload.last() != Some(&b'\n') {
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(if err.use_stderr() { 1 } else { 0 });
        },
    };

    if let Err(err) = cli.execute() {
        eprintln!("wmibarc: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn write_joins_data_words() {
        let cli = parse(&["wmibarc", "-s", "s", "write", "/1/data", "load", "0.42"]);
        assert_eq!(cli.request(), Request::Write("/1/data".into(), b"load 0.42".to_vec()));
    }

    #[test]
    fn write_keeps_hyphenated_data() {
        let cli = parse(&["wmibarc", "-s", "s", "write", "/1/b1press", "xterm", "-e", "top"]);
        assert_eq!(
            cli.request(),
            Request::Write("/1/b1press".into(), b"xterm -e top".to_vec())
        );
    }

    #[test]
    fn ls_maps_to_list() {
        let cli = parse(&["wmibarc", "-s", "s", "ls", "/"]);
        assert_eq!(cli.request(), Request::List("/".into()));
    }

    #[test]
    fn unknown_op_is_rejected() {
        assert!(Cli::try_parse_from(["wmibarc", "-s", "s", "stat", "/ctl"]).is_err());
    }
}
