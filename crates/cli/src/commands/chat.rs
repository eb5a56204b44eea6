//! `deskmate chat` — interactive or single-message chat mode.

use anyhow::Context;
use deskmate_config::AppConfig;
use deskmate_core::session::Session;
use deskmate_engine::MonitorState;

pub async fn run(message: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    if let Err(e) = config.ensure_credentials() {
        eprintln!();
        eprintln!("  ERROR: {e}");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    DESKMATE_API_KEY    (generic)");
        eprintln!("    OPENROUTER_API_KEY  (recommended)");
        eprintln!("    OPENAI_API_KEY      (for OpenAI direct)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        anyhow::bail!("No API key found. See above for setup instructions.");
    }

    let mut engine = super::build_engine(&config);
    let mut session = Session::new();

    if let Some(msg) = message {
        // Single message mode: no briefing, one exchange.
        eprint!("  Thinking...");
        let reply = engine.respond(&mut session, &msg).await;
        eprint!("\r              \r");
        println!("{reply}");
        return Ok(());
    }

    println!();
    println!("  Deskmate — interactive session");
    println!("  Model chain: {}", config.llm.models.join(" → "));
    println!("  Commands: /clear  /save <path>  /quit");
    println!();

    // Proactive briefing runs before the first prompt is shown.
    if config.briefing.enabled {
        if engine.start_session(&mut session).await == MonitorState::Briefed {
            if let Some(turn) = session.turns().last() {
                print_assistant(&turn.text);
            }
        }
    }

    let stdin = std::io::stdin();
    loop {
        print_prompt()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(a, b)| (a, b)) {
            ("/quit", _) | ("exit", _) => break,
            ("/clear", _) => {
                session.clear();
                println!("  (memory cleared)");
                continue;
            }
            ("/save", path) if !path.is_empty() => {
                match session.to_json() {
                    Ok(json) => {
                        std::fs::write(path, json)
                            .with_context(|| format!("Failed to write {path}"))?;
                        println!("  (session saved to {path})");
                    }
                    Err(e) => eprintln!("  [Error] export failed: {e}"),
                }
                continue;
            }
            ("/save", _) => {
                println!("  usage: /save <path>");
                continue;
            }
            _ => {}
        }

        eprint!("  ...");
        let reply = engine.respond(&mut session, line).await;
        eprint!("\r     \r");
        print_assistant(&reply);
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

fn print_prompt() -> anyhow::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_assistant(text: &str) {
    println!();
    for line in text.lines() {
        println!("  Deskmate > {line}");
    }
    println!();
}
