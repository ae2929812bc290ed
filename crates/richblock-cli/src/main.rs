mod app;
mod input;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
        MouseButton, MouseEventKind, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use richblock_config::Config;
use std::{
    env,
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

use crate::app::App;
use crate::input::KeyEncoding;

fn usage(program: &str) -> String {
    format!("Usage: {program} [--config <path>]")
}

/// Config file named on the command line, if any
fn parse_args(args: &[String]) -> Result<Option<PathBuf>, String> {
    let program = args.first().map(String::as_str).unwrap_or("richblock-cli");
    match args {
        [_] => Ok(None),
        [_, flag, path] if flag == "--config" => Ok(Some(PathBuf::from(path))),
        _ => Err(usage(program)),
    }
}

fn init_logging(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    // The terminal belongs to the UI, so log lines go to the file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let explicit_config = match parse_args(&args) {
        Ok(path) => path,
        Err(usage) => {
            eprintln!("{usage}");
            process::exit(1);
        }
    };

    let config_path = explicit_config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from_path(&config_path) {
        Ok(Some(config)) => config,
        Ok(None) if explicit_config.is_some() => {
            eprintln!("Error: Config file '{}' not found", config_path.display());
            process::exit(1);
        }
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    init_logging(&config.log_path())?;
    log::info!("richblock starting with config {}", config_path.display());

    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Without the enhancement protocol ctrl+digit chords never reach us
    let encoding = if supports_keyboard_enhancement().unwrap_or(false) {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        KeyEncoding::Enhanced
    } else {
        log::warn!("terminal lacks keyboard enhancement, ctrl+1 and ctrl+2 are unavailable");
        KeyEncoding::Legacy
    };

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app, encoding);

    // Restore terminal
    if encoding == KeyEncoding::Enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("{err:?}");
        println!("{err:?}");
    }
    log::info!("richblock exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    encoding: KeyEncoding,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                if let Some(key) = input::key_event(&key, encoding) {
                    app.on_key(key);
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                app.on_click(mouse.column, mouse.row);
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(&args(&["richblock-cli"])), Ok(None));
        assert_eq!(
            parse_args(&args(&["richblock-cli", "--config", "/tmp/rb.toml"])),
            Ok(Some(PathBuf::from("/tmp/rb.toml")))
        );
        assert_eq!(
            parse_args(&args(&["richblock-cli", "notes"])),
            Err("Usage: richblock-cli [--config <path>]".to_string())
        );
        assert!(parse_args(&args(&["richblock-cli", "--config"])).is_err());
    }
}
