#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 假 `az` 對單次呼叫的回應
pub enum Reply {
    Stdout(&'static str),
    Fail(&'static str),
    Hang,
}

impl Reply {
    fn script(&self) -> String {
        match self {
            Reply::Stdout(body) => format!("cat <<'JSON'\n{}\nJSON\n", body),
            Reply::Fail(message) => format!("echo {} >&2\nexit 1\n", shell_quote(message)),
            Reply::Hang => "exec sleep 30\n".to_string(),
        }
    }
}

/// 取代 `az` 的 shell 腳本，記錄每次收到的參數
pub struct FakeAz {
    _dir: TempDir,
    pub program: PathBuf,
    log: PathBuf,
}

impl FakeAz {
    pub fn new(listing: Reply, shows: &[(&str, Reply)]) -> std::io::Result<Self> {
        let dir = TempDir::new()?;
        let program = dir.path().join("az");
        let log = dir.path().join("calls.log");

        let mut show_cases = String::new();
        for (id, reply) in shows {
            show_cases.push_str(&format!("  {})\n{}  ;;\n", shell_quote(id), reply.script()));
        }

        let script = format!(
            "#!/bin/sh\n\
             printf '%s\\n' \"$*\" >> '{log}'\n\
             case \"$3\" in\n\
             list)\n{listing};;\n\
             show)\n\
             case \"$5\" in\n\
             {show_cases}  *)\n  echo \"ERROR: secret $5 not found\" >&2\n  exit 1\n  ;;\n\
             esac\n\
             ;;\n\
             esac\n",
            log = log.display(),
            listing = listing.script(),
            show_cases = show_cases,
        );

        write_executable(&program, &script)?;
        Ok(Self {
            _dir: dir,
            program,
            log,
        })
    }

    pub fn program_str(&self) -> &str {
        self.program.to_str().unwrap_or_default()
    }

    /// 目前為止每次呼叫的參數，每行一筆
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn show_calls(&self) -> Vec<String> {
        let mut calls: Vec<String> = self
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("keyvault secret show"))
            .collect();
        calls.sort();
        calls
    }
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}

fn write_executable(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)?;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
}

pub const TWO_SECRETS: &str = r#"[
  {"attributes": {"enabled": true}, "id": "https://kv-test.vault.azure.net/secrets/db-password", "tags": null},
  {"attributes": {"enabled": true}, "id": "https://kv-test.vault.azure.net/secrets/api-key", "tags": {"env": "test"}}
]"#;
