//! Collaborator primitives the host normally provides: process launch,
//! URL open, clipboard write.

use std::io::Write;
use std::process::{Command, Stdio};

use walker_core::{Action, platform_opener};

/// Execute one resolved action. Returns a short human description of what
/// happened, or a message describing why the primitive failed.
pub fn execute(action: &Action) -> Result<String, String> {
    match action {
        Action::Launch { program, arguments } => {
            let mut command = Command::new(program);
            if let Some(arguments) = arguments {
                command.arg(arguments);
            }
            command
                .spawn()
                .map(|_| format!("launched {program}"))
                .map_err(|err| format!("failed to launch {program}: {err}"))
        }
        Action::OpenUrl { url } => {
            let opener = platform_opener();
            Command::new(opener)
                .arg(url)
                .spawn()
                .map(|_| format!("opened {url}"))
                .map_err(|err| format!("failed to open {url}: {err}"))
        }
        Action::CopyText { text } => write_clipboard_text(text)
            .map(|()| "copied to clipboard".to_string())
            .ok_or_else(|| "no clipboard tool available".to_string()),
        Action::ReloadConfig => Ok("reload requested".to_string()),
    }
}

fn write_clipboard_text(text: &str) -> Option<()> {
    #[cfg(target_os = "macos")]
    {
        run_pipe("pbcopy", &[], text)
    }

    #[cfg(target_os = "linux")]
    {
        run_pipe("wl-copy", &[], text)
            .or_else(|| run_pipe("xclip", &["-selection", "clipboard"], text))
            .or_else(|| run_pipe("xsel", &["--clipboard", "--input"], text))
    }

    #[cfg(target_os = "windows")]
    {
        run_pipe(
            "powershell",
            &["-NoProfile", "-Command", "Set-Clipboard -Value ($input | Out-String)"],
            text,
        )
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        let _ = text;
        None
    }
}

#[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
fn run_pipe(program: &str, args: &[&str], input: &str) -> Option<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    child
        .stdin
        .as_mut()
        .and_then(|stdin| stdin.write_all(input.as_bytes()).ok())?;

    let status = child.wait().ok()?;
    status.success().then_some(())
}
