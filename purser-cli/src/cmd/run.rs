use std::io::Write;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};

use purser_core::{Redactor, SecretEntry};

use crate::args::ConfigArgs;
use crate::exit_codes;
use crate::utils::load_collector;

/// Spawns `cmd` with the collected entries as its environment. Unless the
/// manifest sets `carry_env`, the child starts from a scrubbed environment
/// with only `USER`/`HOME`/`PATH` carried over. With `--redact`, the
/// child's stdout and stderr are piped through the redactor.
pub async fn run_cmd(cmd: &[String], redact: bool, config: ConfigArgs) -> i32 {
    let collector = match load_collector(&config.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::CONFIG_ERROR;
        }
    };
    let entries = match collector.collect().await {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_codes::COLLECT_FAILED;
        }
    };

    let Some((program, args)) = cmd.split_first() else {
        eprintln!("error: no command given");
        return exit_codes::CONFIG_ERROR;
    };
    let mut command = tokio::process::Command::new(program);
    command.args(args);

    if !collector.manifest().carry_env {
        command.env_clear();
        for name in ["USER", "HOME", "PATH"] {
            if let Ok(value) = std::env::var(name) {
                command.env(name, value);
            }
        }
    }
    for entry in &entries {
        command.env(&entry.key, &entry.value);
    }

    let status = if redact {
        run_redacted(command, &entries).await
    } else {
        command.status().await
    };

    match status {
        Ok(status) => status.code().unwrap_or(exit_codes::RUNTIME_ERROR),
        Err(e) => {
            eprintln!("error: failed to run {program}: {e}");
            exit_codes::RUNTIME_ERROR
        }
    }
}

async fn run_redacted(
    mut command: tokio::process::Command,
    entries: &[SecretEntry],
) -> std::io::Result<std::process::ExitStatus> {
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = command.spawn()?;
    let stdout = child.stdout.take().expect("stdout piped");
    let stderr = child.stderr.take().expect("stderr piped");

    let redactor = Redactor::new(entries);
    let (out_res, err_res, status) = tokio::join!(
        pump(stdout, &redactor, std::io::stdout()),
        pump(stderr, &redactor, std::io::stderr()),
        child.wait(),
    );
    out_res?;
    err_res?;
    status
}

async fn pump<R, W>(mut src: R, redactor: &Redactor, out: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut writer = redactor.writer(out);
    let mut chunk = [0u8; 8192];
    loop {
        let n = src.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&chunk[..n])?;
    }
    writer.close()
}
