//! Line protocol spoken on the control socket.
//!
//! One request per line, one response line per request:
//!
//! ```text
//! read <path>            -> ok <content>
//! write <path> <data>    -> ok
//! create <path>          -> ok
//! remove <path>          -> ok
//! ls <path>              -> ok <name> <name> ...
//! anything else          -> error <message>
//! ```
//!
//! Content and write data are escaped so they fit on one line: newline as
//! `\n`, carriage return as `\r`, backslash as `\\`.

use wmibar_types::error::{BarError, Result};

/// Longest request line accepted, in bytes, terminator excluded.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// A namespace operation requested by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Read(String),
    Write(String, Vec<u8>),
    Create(String),
    Remove(String),
    List(String),
}

/// Outcome of a request. `Ok` carries the payload, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Ok(Vec<u8>),
    Error(String),
}

/// The namespace operations a request can drive.
pub trait NamespaceService {
    fn read(&mut self, path: &str) -> Result<Vec<u8>>;
    fn write(&mut self, path: &str, data: &[u8]) -> Result<()>;
    fn create(&mut self, path: &str) -> Result<()>;
    fn remove(&mut self, path: &str) -> Result<()>;
    fn list(&self, path: &str) -> Result<Vec<String>>;
}

impl Request {
    /// Parse one request line (without its terminator).
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (op, rest) = line.split_once(' ').unwrap_or((line, ""));
        let (path, data) = match op {
            "write" => rest.split_once(' ').unwrap_or((rest, "")),
            _ => (rest.trim(), ""),
        };
        if path.is_empty() {
            return Err(BarError::Protocol(format!("missing path in {op:?}")));
        }
        let path = path.to_string();
        match op {
            "read" => Ok(Self::Read(path)),
            "write" => Ok(Self::Write(path, unescape(data))),
            "create" => Ok(Self::Create(path)),
            "remove" => Ok(Self::Remove(path)),
            "ls" => Ok(Self::List(path)),
            _ => Err(BarError::Protocol(format!("unknown request {op:?}"))),
        }
    }

    /// Format as a request line, without terminator.
    pub fn encode(&self) -> String {
        match self {
            Self::Read(p) => format!("read {p}"),
            Self::Write(p, data) => format!("write {p} {}", escape(data)),
            Self::Create(p) => format!("create {p}"),
            Self::Remove(p) => format!("remove {p}"),
            Self::List(p) => format!("ls {p}"),
        }
    }

    /// Run the request against `service`.
    pub fn apply(&self, service: &mut impl NamespaceService) -> Response {
        let result = match self {
            Self::Read(p) => service.read(p),
            Self::Write(p, data) => service.write(p, data).map(|()| Vec::new()),
            Self::Create(p) => service.create(p).map(|()| Vec::new()),
            Self::Remove(p) => service.remove(p).map(|()| Vec::new()),
            Self::List(p) => service.list(p).map(|names| names.join(" ").into_bytes()),
        };
        match result {
            Ok(payload) => Response::Ok(payload),
            Err(e) => Response::Error(e.to_string()),
        }
    }
}

impl Response {
    /// Format as a response line, without terminator.
    pub fn encode(&self) -> String {
        match self {
            Self::Ok(payload) if payload.is_empty() => "ok".to_string(),
            Self::Ok(payload) => format!("ok {}", escape(payload)),
            Self::Error(msg) => format!("error {}", escape(msg.as_bytes())),
        }
    }

    /// Parse a response line.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (status, rest) = line.split_once(' ').unwrap_or((line, ""));
        match status {
            "ok" => Ok(Self::Ok(unescape(rest))),
            "error" => Ok(Self::Error(String::from_utf8_lossy(&unescape(rest)).into_owned())),
            _ => Err(BarError::Protocol(format!("malformed response {line:?}"))),
        }
    }

    /// Payload of an `ok` response, or the error as [`BarError::Protocol`].
    pub fn into_result(self) -> Result<Vec<u8>> {
        match self {
            Self::Ok(payload) => Ok(payload),
            Self::Error(msg) => Err(BarError::Protocol(msg)),
        }
    }
}

/// Escape bytes for a single protocol line.
pub fn escape(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Undo [`escape`]. Unknown escapes are kept literally.
pub fn unescape(text: &str) -> Vec<u8> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            },
            None => out.push('\\'),
        }
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Flat map of paths; enough to exercise request dispatch.
    #[derive(Default)]
    struct MapService {
        files: BTreeMap<String, Vec<u8>>,
    }

    impl NamespaceService for MapService {
        fn read(&mut self, path: &str) -> Result<Vec<u8>> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| BarError::Namespace(format!("no such file: {path}")))
        }

        fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
            let file = self
                .files
                .get_mut(path)
                .ok_or_else(|| BarError::Namespace(format!("no such file: {path}")))?;
            *file = data.to_vec();
            Ok(())
        }

        fn create(&mut self, path: &str) -> Result<()> {
            if self.files.contains_key(path) {
                return Err(BarError::Namespace(format!("file exists: {path}")));
            }
            self.files.insert(path.to_string(), Vec::new());
            Ok(())
        }

        fn remove(&mut self, path: &str) -> Result<()> {
            self.files
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| BarError::Namespace(format!("no such path: {path}")))
        }

        fn list(&self, _path: &str) -> Result<Vec<String>> {
            Ok(self.files.keys().map(|k| k.trim_start_matches('/').to_string()).collect())
        }
    }

    #[test]
    fn parse_requests() {
        assert_eq!(Request::parse("read /new").unwrap(), Request::Read("/new".into()));
        assert_eq!(Request::parse("ls /\n").unwrap(), Request::List("/".into()));
        assert_eq!(Request::parse("create /7").unwrap(), Request::Create("/7".into()));
        assert_eq!(Request::parse("remove /7").unwrap(), Request::Remove("/7".into()));
    }

    #[test]
    fn write_data_is_rest_of_line() {
        assert_eq!(
            Request::parse("write /ctl display 1").unwrap(),
            Request::Write("/ctl".into(), b"display 1".to_vec())
        );
        assert_eq!(
            Request::parse("write /1/data  two  spaces ").unwrap(),
            Request::Write("/1/data".into(), b" two  spaces ".to_vec())
        );
    }

    #[test]
    fn write_without_data_is_empty() {
        assert_eq!(
            Request::parse("write /1/b1press").unwrap(),
            Request::Write("/1/b1press".into(), Vec::new())
        );
    }

    #[test]
    fn write_data_is_unescaped() {
        assert_eq!(
            Request::parse("write /1/data a\\nb\\\\c").unwrap(),
            Request::Write("/1/data".into(), b"a\nb\\c".to_vec())
        );
    }

    #[test]
    fn bad_requests() {
        assert!(Request::parse("").is_err());
        assert!(Request::parse("read").is_err());
        assert!(Request::parse("read ").is_err());
        assert!(Request::parse("stat /ctl").is_err());
        assert!(Request::parse("READ /ctl").is_err());
    }

    #[test]
    fn request_encode_parses_back() {
        let req = Request::Write("/1/data".into(), b"line one\nline two".to_vec());
        assert_eq!(Request::parse(&req.encode()).unwrap(), req);
    }

    #[test]
    fn response_lines() {
        assert_eq!(Response::Ok(Vec::new()).encode(), "ok");
        assert_eq!(Response::Ok(b"3".to_vec()).encode(), "ok 3");
        assert_eq!(Response::Ok(b"a\nb".to_vec()).encode(), "ok a\\nb");
        assert_eq!(Response::Error("no such file: /x".into()).encode(), "error no such file: /x");
    }

    #[test]
    fn response_parse() {
        assert_eq!(Response::parse("ok").unwrap(), Response::Ok(Vec::new()));
        assert_eq!(Response::parse("ok 0,0,300,20\n").unwrap(), Response::Ok(b"0,0,300,20".to_vec()));
        assert_eq!(Response::parse("error gone").unwrap(), Response::Error("gone".into()));
        assert!(Response::parse("maybe").is_err());
    }

    #[test]
    fn into_result() {
        assert_eq!(Response::Ok(b"x".to_vec()).into_result().unwrap(), b"x");
        let err = Response::Error("nope".into()).into_result().unwrap_err();
        assert!(matches!(err, BarError::Protocol(ref m) if m == "nope"));
    }

    #[test]
    fn escape_and_unescape() {
        assert_eq!(escape(b"a\\b\nc\r"), "a\\\\b\\nc\\r");
        assert_eq!(unescape("a\\\\b\\nc\\r"), b"a\\b\nc\r");
        assert_eq!(unescape("odd\\q"), b"odd\\q");
        assert_eq!(unescape("trailing\\"), b"trailing\\");
    }

    #[test]
    fn apply_dispatches() {
        let mut svc = MapService::default();
        assert_eq!(Request::Create("/ctl".into()).apply(&mut svc), Response::Ok(Vec::new()));
        assert_eq!(
            Request::Write("/ctl".into(), b"quit".to_vec()).apply(&mut svc),
            Response::Ok(Vec::new())
        );
        assert_eq!(Request::Read("/ctl".into()).apply(&mut svc), Response::Ok(b"quit".to_vec()));
        svc.create("/new").unwrap();
        assert_eq!(Request::List("/".into()).apply(&mut svc), Response::Ok(b"ctl new".to_vec()));
        assert!(matches!(
            Request::Read("/ghost".into()).apply(&mut svc),
            Response::Error(m) if m.contains("no such file")
        ));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn escaped_text_is_one_line(data in "[ -~\n\r\\\\]{0,80}") {
                let line = escape(data.as_bytes());
                prop_assert!(!line.contains('\n'));
                prop_assert!(!line.contains('\r'));
                prop_assert_eq!(unescape(&line), data.as_bytes());
            }
        }
    }
}
