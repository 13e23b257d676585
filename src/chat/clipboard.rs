//! Copy-to-clipboard.
//!
//! Tries the platform clipboard command first.  When none is available (for
//! example over SSH) it falls back to the OSC 52 escape sequence, which most
//! terminal emulators forward to the system clipboard and others ignore.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Writes the OSC 52 sequence that places `content` on the clipboard.
pub fn write_osc52<W: Write>(writer: &mut W, content: &str) -> io::Result<()> {
    let encoded = STANDARD.encode(content.as_bytes());
    write!(writer, "\x1b]52;c;{}\x07", encoded)?;
    writer.flush()
}

/// Copies `content` to the clipboard.
///
/// Best effort: failures are logged and otherwise ignored.
pub fn copy_message(content: &str) -> bool {
    match copy_with_command(content) {
        Ok(()) => return true,
        Err(err) => tracing::debug!(error = %err, "no clipboard command, using OSC 52"),
    }
    let mut stdout = io::stdout().lock();
    match write_osc52(&mut stdout, content) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "failed to copy message to clipboard");
            false
        }
    }
}

fn copy_with_command(text: &str) -> Result<(), String> {
    #[cfg(target_os = "macos")]
    {
        return run_with_stdin("pbcopy", &[], text);
    }
    #[cfg(target_os = "windows")]
    {
        return run_with_stdin("cmd", &["/C", "clip"], text);
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        if run_with_stdin("wl-copy", &[], text).is_ok() {
            return Ok(());
        }
        if run_with_stdin("xclip", &["-selection", "clipboard"], text).is_ok() {
            return Ok(());
        }
        run_with_stdin("xsel", &["--clipboard", "--input"], text)
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), String> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| format!("clipboard command `{cmd}` not available"))?;
    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input.as_bytes());
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(format!("clipboard command `{cmd}` failed")),
    }
}
