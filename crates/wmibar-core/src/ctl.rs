//! Commands accepted on `/ctl`.

/// A parsed control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stop the event loop after the current dispatch.
    Quit,
    /// Map (`true`) or unmap (`false`) the bar window.
    Display(bool),
    /// Redraw from the current namespace state.
    Update,
    /// Remove every allocated item and restart ids at 1.
    Reset,
    /// Remove one item subtree by name.
    Destroy(String),
}

/// Command names in match order.
pub const COMMAND_NAMES: [&str; 5] = ["quit", "display", "update", "reset", "destroy"];

/// Parse the content of a `/ctl` write.
///
/// Trailing line terminators and blanks are dropped. The first
/// whitespace-delimited token must equal a command name exactly; the
/// argument is everything after that token and one separator byte.
/// Returns `None` for unknown commands and for `display`/`destroy` without
/// an argument.
pub fn parse(content: &[u8]) -> Option<Command> {
    let text = String::from_utf8_lossy(content);
    let text = text.trim_end();
    let token_end = text.find(char::is_whitespace).unwrap_or(text.len());
    let (token, rest) = text.split_at(token_end);
    let arg = rest
        .char_indices()
        .nth(1)
        .map(|(i, _)| &rest[i..])
        .filter(|a| !a.is_empty());

    let command = match token {
        "quit" => Command::Quit,
        "update" => Command::Update,
        "reset" => Command::Reset,
        "display" => Command::Display(parse_display(arg?)),
        "destroy" => Command::Destroy(arg?.trim().to_string()),
        _ => {
            log::debug!("ignoring unknown ctl command {token:?}");
            return None;
        },
    };
    Some(command)
}

/// Bounded integer in `[0, 1]`; anything else reads as 0.
fn parse_display(arg: &str) -> bool {
    matches!(arg.trim().parse::<i64>(), Ok(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_commands() {
        assert_eq!(parse(b"quit"), Some(Command::Quit));
        assert_eq!(parse(b"update\n"), Some(Command::Update));
        assert_eq!(parse(b"reset\r\n"), Some(Command::Reset));
    }

    #[test]
    fn every_name_is_recognized() {
        for name in COMMAND_NAMES {
            let line = format!("{name} 1");
            assert!(parse(line.as_bytes()).is_some(), "{name} not parsed");
        }
    }

    #[test]
    fn display_argument() {
        assert_eq!(parse(b"display 1"), Some(Command::Display(true)));
        assert_eq!(parse(b"display 0\n"), Some(Command::Display(false)));
    }

    #[test]
    fn display_out_of_range_reads_zero() {
        assert_eq!(parse(b"display 2"), Some(Command::Display(false)));
        assert_eq!(parse(b"display -1"), Some(Command::Display(false)));
        assert_eq!(parse(b"display on"), Some(Command::Display(false)));
    }

    #[test]
    fn missing_argument_is_ignored() {
        assert_eq!(parse(b"display"), None);
        assert_eq!(parse(b"display \n"), None);
        assert_eq!(parse(b"destroy"), None);
    }

    #[test]
    fn destroy_takes_name() {
        assert_eq!(parse(b"destroy 12\n"), Some(Command::Destroy("12".to_string())));
    }

    #[test]
    fn token_must_match_exactly() {
        assert_eq!(parse(b"quitter"), None);
        assert_eq!(parse(b"upd"), None);
        assert_eq!(parse(b"displayed 1"), None);
        assert_eq!(parse(b"QUIT"), None);
    }

    #[test]
    fn unknown_and_empty_are_ignored() {
        assert_eq!(parse(b""), None);
        assert_eq!(parse(b"\n"), None);
        assert_eq!(parse(b"launch xterm"), None);
    }

    #[test]
    fn tab_separator() {
        assert_eq!(parse(b"display\t1"), Some(Command::Display(true)));
    }
}
