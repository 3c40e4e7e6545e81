//! Scripted control-channel server for tests.

use crate::models::account::Account;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener};
use std::thread;
use std::time::Duration;

pub const BANNER_1: &str = "220-FTPD server at ftp.example.org, 17:13:04 on 2013-11-29.";
pub const BANNER_2: &str = "220 Connection will close if idle for more than 10 minutes.";

pub enum Act {
    Send(&'static str),
    Recv,
    HangUp,
    /// Side effect run on the server thread at this point of the script.
    Run(Box<dyn FnOnce() + Send>),
}

pub struct ServerLog {
    pub received: Vec<String>,
    /// Bytes read after the script until the client closed.
    pub tail: String,
    pub released: bool,
}

pub fn spawn_server(script: Vec<Act>) -> (Account, thread::JoinHandle<ServerLog>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = stream;
        let mut received = Vec::new();
        for act in script {
            match act {
                Act::Send(line) => writer
                    .write_all(format!("{}\r\n", line).as_bytes())
                    .unwrap(),
                Act::Recv => {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    received.push(line);
                }
                Act::HangUp => writer.shutdown(Shutdown::Write).unwrap(),
                Act::Run(f) => f(),
            }
        }
        let mut rest = Vec::new();
        let released = reader.read_to_end(&mut rest).is_ok();
        ServerLog {
            received,
            tail: String::from_utf8_lossy(&rest).into_owned(),
            released,
        }
    });
    (Account::new("127.0.0.1", "edm1").with_port(port), handle)
}

pub fn full_script() -> Vec<Act> {
    vec![
        Act::Send(BANNER_1),
        Act::Send(BANNER_2),
        Act::Recv,
        Act::Send("331 Send password please."),
        Act::Recv,
        Act::Send("230-Password was changed."),
        Act::Send("230 EDM1 is logged on.  Working directory is \"EDM1.\"."),
        Act::Recv,
        Act::Send("221 Quit command received. Goodbye."),
    ]
}

