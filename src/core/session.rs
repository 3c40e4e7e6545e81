//! Control-channel session that changes the account password.
//!
//! The server accepts `PASS old/new/new` as a self-service password change.
//! The session is positional: two banner lines, USER and one reply, the change
//! command and two replies, then QUIT and one best-effort reply.
//!
//! Reply content never drives control flow. A server that adds or reorders a
//! banner line desynchronizes the session and only shows up as a failure at a
//! later step. `strict_replies` turns reply-code mismatches into errors, but
//! the line counts stay fixed either way.

use crate::constants;
use crate::error::{Result, RotateError};
use crate::models::account::Account;
use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use zeroize::Zeroizing;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bound on connect and on every read and write.
    pub timeout: Duration,
    pub strict_replies: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            strict_replies: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Banner,
    User,
    Pass,
    Quit,
}

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::Banner => "banner",
            Step::User => "USER",
            Step::Pass => "PASS",
            Step::Quit => "QUIT",
        }
    }

    fn expected_code(self) -> u16 {
        match self {
            Step::Banner => constants::CODE_READY,
            Step::User => constants::CODE_NEED_PASSWORD,
            Step::Pass => constants::CODE_LOGGED_IN,
            Step::Quit => constants::CODE_CLOSING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    AwaitingBanner,
    SentUser,
    SentPass,
    SentQuit,
    Closed,
    Failed,
}

/// One reply line. `code` is the leading three-digit reply code, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: Option<u16>,
    pub text: String,
}

impl Reply {
    pub fn parse(line: &str) -> Self {
        let text = line.trim_end_matches(['\r', '\n']).to_string();
        let code = text
            .get(..3)
            .filter(|c| c.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|c| c.parse().ok());
        Self { code, text }
    }
}

/// What a completed session saw.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub replies: Vec<(Step, Reply)>,
    /// Set when the QUIT reply could not be read. The change already succeeded.
    pub quit_warning: Option<String>,
}

/// Runs the password-change session against one account.
#[derive(Debug, Clone)]
pub struct ProtocolClient {
    account: Account,
    options: SessionOptions,
}

impl ProtocolClient {
    pub fn new(account: Account, options: SessionOptions) -> Self {
        Self { account, options }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn resolve(&self) -> Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = (self.account.host.as_str(), self.account.port)
            .to_socket_addrs()
            .map_err(|e| {
                RotateError::Connection(format!("resolve {}: {}", self.account.host, e))
            })?
            .collect();
        if addrs.is_empty() {
            return Err(RotateError::Connection(format!(
                "no addresses for {}",
                self.account.host
            )));
        }
        Ok(addrs)
    }

    /// Change the password from `old` to `new`.
    ///
    /// `Ok` means the server confirmed the change. The connection is closed
    /// before this returns on every path.
    pub fn rotate(&self, old: &str, new: &str) -> Result<SessionReport> {
        validate_fields(&self.account.user, old, new)?;
        let stream = self.connect()?;
        let mut conn = Connection::open(stream, self.options.timeout)?;
        let result = conn.run(&self.account.user, old, new, self.options.strict_replies);
        conn.close();
        result
    }

    fn connect(&self) -> Result<TcpStream> {
        let mut last_err = None;
        for addr in self.resolve()? {
            tracing::debug!(%addr, "connecting");
            match TcpStream::connect_timeout(&addr, self.options.timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(RotateError::Connection(match last_err {
            Some(e) => format!("connect to {}: {}", self.account, e),
            None => format!("connect to {}", self.account),
        }))
    }
}

/// Reject values that would break the command line or the `/` separated change idiom.
pub fn validate_fields(user: &str, old: &str, new: &str) -> Result<()> {
    let has_line_break = |s: &str| s.contains(['\r', '\n']);
    if user.trim().is_empty() || has_line_break(user) || user.contains(' ') {
        return Err(RotateError::Configuration("invalid user name".into()));
    }
    for (label, secret) in [("current", old), ("new", new)] {
        if secret.is_empty() {
            return Err(RotateError::Configuration(format!("{} password is empty", label)));
        }
        if has_line_break(secret) || secret.contains('/') {
            return Err(RotateError::Configuration(format!(
                "{} password contains a line break or '/'",
                label
            )));
        }
    }
    Ok(())
}

/// Open control connection. Shut down on `close` or drop.
struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    state: SessionState,
    replies: Vec<(Step, Reply)>,
    closed: bool,
}

impl Connection {
    fn open(stream: TcpStream, timeout: Duration) -> Result<Self> {
        let setup = |s: &TcpStream| -> std::io::Result<TcpStream> {
            s.set_read_timeout(Some(timeout))?;
            s.set_write_timeout(Some(timeout))?;
            s.try_clone()
        };
        let reader = setup(&stream)
            .map_err(|e| RotateError::Connection(format!("configure socket: {}", e)))?;
        Ok(Self {
            reader: BufReader::new(reader),
            writer: stream,
            state: SessionState::Connecting,
            replies: Vec::new(),
            closed: false,
        })
    }

    fn run(&mut self, user: &str, old: &str, new: &str, strict: bool) -> Result<SessionReport> {
        match self.exchange(user, old, new, strict) {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::debug!(state = ?self.state, "session failed");
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    fn exchange(&mut self, user: &str, old: &str, new: &str, strict: bool) -> Result<SessionReport> {
        self.state = SessionState::AwaitingBanner;
        self.expect(Step::Banner, strict)?;
        self.expect(Step::Banner, strict)?;

        self.send(Step::User, &format!("USER {}", user), None)?;
        self.state = SessionState::SentUser;
        self.expect(Step::User, strict)?;

        let change = Zeroizing::new(format!("PASS {}/{}/{}", old, new, new));
        self.send(Step::Pass, &change, Some("PASS ****"))?;
        self.state = SessionState::SentPass;
        self.expect(Step::Pass, strict)?;
        self.expect(Step::Pass, strict)?;
        tracing::info!("password change confirmed by server");

        let quit_warning = match self.quit() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "QUIT not acknowledged");
                Some(e.to_string())
            }
        };
        Ok(SessionReport {
            replies: std::mem::take(&mut self.replies),
            quit_warning,
        })
    }

    fn quit(&mut self) -> Result<()> {
        self.send(Step::Quit, "QUIT", None)?;
        self.state = SessionState::SentQuit;
        // QUIT is best-effort, so its reply code is never enforced.
        self.expect(Step::Quit, false)?;
        Ok(())
    }

    fn send(&mut self, step: Step, command: &str, shown: Option<&str>) -> Result<()> {
        tracing::debug!(step = step.name(), command = shown.unwrap_or(command), "send");
        let line = Zeroizing::new(format!("{}\r\n", command));
        self.writer
            .write_all(line.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| RotateError::Connection(format!("send {}: {}", step.name(), e)))
    }

    fn expect(&mut self, step: Step, strict: bool) -> Result<Reply> {
        let reply = self.read_reply(step)?;
        tracing::debug!(step = step.name(), reply = %reply.text, "recv");
        if reply.code != Some(step.expected_code()) {
            if strict {
                return Err(RotateError::UnexpectedReply {
                    step: step.name(),
                    reply: reply.text,
                });
            }
            tracing::warn!(
                step = step.name(),
                expected = step.expected_code(),
                reply = %reply.text,
                "unexpected reply code"
            );
        }
        self.replies.push((step, reply.clone()));
        Ok(reply)
    }

    fn read_reply(&mut self, step: Step) -> Result<Reply> {
        let mut buf = Vec::new();
        let n = (&mut self.reader)
            .take(constants::MAX_REPLY_LINE)
            .read_until(b'\n', &mut buf)
            .map_err(|e| match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                    RotateError::Protocol(format!("timed out awaiting {} reply", step.name()))
                }
                _ => RotateError::Protocol(format!("read {} reply: {}", step.name(), e)),
            })?;
        if n == 0 {
            return Err(RotateError::Protocol(format!(
                "connection closed awaiting {} reply",
                step.name()
            )));
        }
        if buf.last() != Some(&b'\n') && n as u64 == constants::MAX_REPLY_LINE {
            return Err(RotateError::Protocol(format!(
                "{} reply exceeds {} bytes",
                step.name(),
                constants::MAX_REPLY_LINE
            )));
        }
        Ok(Reply::parse(&String::from_utf8_lossy(&buf)))
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        let _ = self.writer.shutdown(Shutdown::Both);
        self.closed = true;
        if self.state != SessionState::Failed {
            self.state = SessionState::Closed;
        }
        tracing::debug!(state = ?self.state, "connection closed");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
