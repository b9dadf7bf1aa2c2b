//! Secret output channel
//!
//! Newly generated private keys are surfaced exactly once, through a
//! [`SecretSink`], never through the logger. Whatever reads the sink's
//! output (terminal, pipe, file) must be treated as holding a secret.

use crate::crypto::KeyPair;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Destination for newly generated key pairs
pub trait SecretSink: Send + Sync {
    fn emit(&self, key_pair: &KeyPair) -> io::Result<()>;
}

/// Writes `Public key <pk>` and `Private key <sk>` lines to any writer
#[derive(Debug)]
pub struct WriterSecretSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSecretSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WriterSecretSink<Vec<u8>> {
    /// Everything emitted so far
    pub fn contents(&self) -> String {
        let buffer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl<W: Write + Send> SecretSink for WriterSecretSink<W> {
    fn emit(&self, key_pair: &KeyPair) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "Public key {}", key_pair.public_key())?;
        writeln!(writer, "Private key {}", key_pair.secret_key().as_str())?;
        writer.flush()
    }
}

/// Secret channel on stdout; logs go to stderr
pub type ConsoleSecretSink = WriterSecretSink<io::Stdout>;

impl ConsoleSecretSink {
    pub fn stdout() -> Self {
        WriterSecretSink::new(io::stdout())
    }
}
