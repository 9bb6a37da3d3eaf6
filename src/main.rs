//! skelgen CLI: turns the method signature on the clipboard into a skeleton.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use skelgen::{generate, Config, TemplateRegistry};

const USAGE: &str = "Usage:
1. Copy the method you want to test
2. Run 'skelgen [-f] -t TemplateName'
3. Paste the skeleton that has been written to your clipboard";

/// Generate Go test stubs and mocks from a copied method signature.
#[derive(Parser)]
#[command(name = "skelgen", version, about, after_help = USAGE)]
struct Cli {
    /// Name of the template to render
    #[arg(short = 't', long = "template", value_name = "TemplateName")]
    template: Option<String>,

    /// Reformat the generated source
    #[arg(short = 'f', long)]
    format: bool,

    /// Config file with user templates
    #[arg(long, env = skelgen::config::CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Read the signature from stdin instead of the clipboard
    #[arg(long)]
    stdin: bool,

    /// Write the result to stdout instead of the clipboard
    #[arg(long)]
    stdout: bool,

    /// List available template names and exit
    #[arg(long)]
    list: bool,

    /// Own the clipboard with the text read from stdin until replaced
    #[arg(long = SERVE_CLIPBOARD, hide = true)]
    serve_clipboard: bool,
}

const SERVE_CLIPBOARD: &str = "serve-clipboard";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skelgen=warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = if cli.serve_clipboard {
        serve_clipboard()
    } else {
        run(cli)
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::discover(cli.config.as_deref())?;
    let registry = TemplateRegistry::from_config(&config)?;

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let name = cli
        .template
        .as_deref()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow!("invalid TemplateName"))?;
    let template = registry.get(name)?;

    let src = read_signature(cli.stdin)?;
    debug!(template = name, bytes = src.len(), "read signature");

    let out = generate(&src, template, cli.format || config.format)?;
    write_output(&out, cli.stdout)
}

fn read_signature(from_stdin: bool) -> Result<String> {
    if from_stdin {
        let mut src = String::new();
        io::stdin()
            .read_to_string(&mut src)
            .context("failed to read stdin")?;
        return Ok(src);
    }
    let mut clipboard = arboard::Clipboard::new().context("clipboard not available")?;
    clipboard
        .get_text()
        .context("failed to read text from clipboard")
}

fn write_output(out: &[u8], to_stdout: bool) -> Result<()> {
    if to_stdout {
        let mut stdout = io::stdout().lock();
        stdout.write_all(out)?;
        return stdout.flush().map_err(Into::into);
    }
    let text = String::from_utf8(out.to_vec()).context("generated text is not UTF-8")?;
    set_clipboard(text)
}

// X11 and Wayland selections live only as long as their owner, so a detached
// copy of this binary keeps serving the text after we exit.
#[cfg(target_os = "linux")]
fn set_clipboard(text: String) -> Result<()> {
    let exe = std::env::current_exe().context("cannot locate own executable")?;
    let mut child = serve_command(&exe)
        .spawn()
        .context("failed to start clipboard owner")?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("clipboard owner has no stdin"))?;
    stdin
        .write_all(text.as_bytes())
        .context("failed to hand text to clipboard owner")?;
    debug!(pid = child.id(), bytes = text.len(), "clipboard owner started");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_clipboard(text: String) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard not available")?;
    clipboard
        .set_text(text)
        .context("failed to write text to clipboard")
}

fn serve_command(exe: &Path) -> Command {
    let mut cmd = Command::new(exe);
    cmd.arg(format!("--{SERVE_CLIPBOARD}"))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

#[cfg(target_os = "linux")]
fn serve_clipboard() -> Result<()> {
    use arboard::SetExtLinux;

    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read clipboard text")?;
    let mut clipboard = arboard::Clipboard::new().context("clipboard not available")?;
    // Blocks until another program takes the selection.
    clipboard
        .set()
        .wait()
        .text(text)
        .context("failed to write text to clipboard")
}

#[cfg(not(target_os = "linux"))]
fn serve_clipboard() -> Result<()> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read clipboard text")?;
    set_clipboard(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn serve_flag_is_hidden() {
        let cmd = Cli::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_long() == Some(SERVE_CLIPBOARD))
            .unwrap();
        assert!(arg.is_hide_set());

        let cli = Cli::try_parse_from(["skelgen", "--serve-clipboard"]).unwrap();
        assert!(cli.serve_clipboard);
    }

    #[test]
    fn clipboard_owner_reexecs_with_serve_flag() {
        let cmd = serve_command(Path::new("/usr/bin/skelgen"));
        assert_eq!(cmd.get_program(), "/usr/bin/skelgen");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["--serve-clipboard"]);
    }
}
