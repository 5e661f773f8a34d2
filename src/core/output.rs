use crate::domain::model::{SecretFailure, SecretRecord};
use std::io::{self, Stderr, Stdout, Write};

/// 報表唯一的寫入者：Name/Value 區塊寫到 `out`，失敗訊息寫到 `err`
pub struct SecretPrinter<O: Write, E: Write> {
    out: O,
    err: E,
}

impl SecretPrinter<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> SecretPrinter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn connecting(&mut self, vault_name: &str) -> io::Result<()> {
        write!(self.out, "Connecting to Azure Key Vault: {}\n\n", vault_name)?;
        self.out.flush()
    }

    pub fn listing(&mut self, raw: &str) -> io::Result<()> {
        write!(self.out, "Listing:\n{}\n", raw)
    }

    pub fn secrets_heading(&mut self) -> io::Result<()> {
        write!(self.out, "Secrets:\n\n")?;
        self.out.flush()
    }

    pub fn secret(&mut self, record: &SecretRecord) -> io::Result<()> {
        write!(
            self.out,
            "Name  | {}\nValue | {}\n\n",
            record.name, record.value
        )?;
        self.out.flush()
    }

    pub fn failure(&mut self, failure: &SecretFailure) -> io::Result<()> {
        writeln!(self.err, "Failed | {} | {}", failure.name, failure.error)
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
