//! Headless mode for the adventure.
//!
//! A line-oriented protocol for scripts and agents. Each turn prints tagged
//! blocks so output can be parsed without screen scraping.

use std::io::{self, BufRead, Write};

use adventure_core::{HeadlessGame, ImageSize, Scene, StoryResponse, TurnAction};

/// Whether the input loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

const HELP: &[&str] = &[
    "  #quit              - Exit the game",
    "  #status            - Show quest, inventory, choices and image size",
    "  #size [1K|2K|4K]   - Set the image size, or cycle it with no argument",
    "  #help              - Show this help",
    "  1-9                - Take a suggested choice",
    "  (anything else is sent as your action)",
];

/// Run the game in headless mode over stdin/stdout.
pub async fn run_headless(mut game: HeadlessGame) -> anyhow::Result<()> {
    let mut stdout = io::stdout();

    writeln!(stdout, "=== Infinite Adventure (headless) ===")?;
    writeln!(stdout, "Commands:")?;
    for line in HELP {
        writeln!(stdout, "{line}")?;
    }
    writeln!(stdout)?;

    play(&mut game, TurnAction::Start, &mut stdout).await?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };

        if handle_line(&mut game, &line, &mut stdout).await? == Flow::Quit {
            break;
        }
    }

    Ok(())
}

/// Handle one line of input.
pub async fn handle_line(
    game: &mut HeadlessGame,
    line: &str,
    out: &mut impl Write,
) -> io::Result<Flow> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Flow::Continue);
    }

    if let Some(command) = line.strip_prefix('#') {
        let flow = handle_command(game, command, out)?;
        out.flush()?;
        return Ok(flow);
    }

    match game.parse_action(line) {
        Ok(action) => play(game, action, out).await?,
        Err(e) => writeln!(out, "[ERROR] {e}")?,
    }
    out.flush()?;
    Ok(Flow::Continue)
}

fn handle_command(game: &mut HeadlessGame, command: &str, out: &mut impl Write) -> io::Result<Flow> {
    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts.first().copied() {
        Some("quit") | Some("exit") => {
            writeln!(out, "Goodbye!")?;
            return Ok(Flow::Quit);
        }
        Some("status") => {
            writeln!(out, "[STATUS]")?;
            writeln!(out, "  Turn: {}", game.turn_count())?;
            writeln!(out, "  Quest: {}", game.quest())?;
            writeln!(out, "  Inventory: {}", join_or_empty(game.inventory()))?;
            writeln!(out, "  Image size: {}", game.image_size())?;
            if let Some(scene) = game.scene() {
                writeln!(out, "  Scene: {}", scene.location())?;
            }
            write_choices(out, game.choices())?;
        }
        Some("size") => match parts.get(1) {
            Some(arg) => match arg.parse::<ImageSize>() {
                Ok(size) => {
                    game.set_image_size(size);
                    writeln!(out, "[SIZE] {size}")?;
                }
                Err(e) => writeln!(out, "[ERROR] {e}")?,
            },
            None => {
                let size = game.cycle_image_size();
                writeln!(out, "[SIZE] {size}")?;
            }
        },
        Some("help") => {
            writeln!(out, "[HELP]")?;
            for line in HELP {
                writeln!(out, "{line}")?;
            }
        }
        _ => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
    }
    Ok(Flow::Continue)
}

/// Play both phases, printing the story before the scene is painted.
async fn play(game: &mut HeadlessGame, action: TurnAction, out: &mut impl Write) -> io::Result<()> {
    let story = match game.take_turn(action).await {
        Ok(story) => story,
        Err(e) => {
            writeln!(out, "[ERROR] {e}")?;
            return Ok(());
        }
    };

    write_story(out, &story)?;
    out.flush()?;

    let scene = game.paint_scene(&story.image_prompt).await;
    write_scene(out, scene)?;
    writeln!(out)?;
    Ok(())
}

fn write_story(out: &mut impl Write, story: &StoryResponse) -> io::Result<()> {
    writeln!(out, "[STORY]")?;
    for para in story.narrative.split("\n\n") {
        writeln!(out, "{para}")?;
    }
    writeln!(out, "[QUEST] {}", story.quest)?;
    writeln!(out, "[INVENTORY] {}", join_or_empty(&story.inventory))?;
    write_choices(out, &story.choices)
}

fn write_choices(out: &mut impl Write, choices: &[String]) -> io::Result<()> {
    writeln!(out, "[CHOICES]")?;
    for (i, choice) in choices.iter().enumerate() {
        writeln!(out, "  {}. {choice}", i + 1)?;
    }
    Ok(())
}

fn write_scene(out: &mut impl Write, scene: &Scene) -> io::Result<()> {
    writeln!(out, "[SCENE] {} {}", scene.size, scene.location())
}

fn join_or_empty(items: &[String]) -> String {
    if items.is_empty() {
        "(empty)".to_string()
    } else {
        items.join(", ")
    }
}
