//! Storm Gambit - Entry Point
//!
//! A small interactive loop around the decision core: advance turns, watch
//! storms and autonomous behavior, answer intervention requests, issue
//! empathy commands, and ask the opponent for moves.

use clap::Parser;

use storm_gambit::core::error::Result;
use storm_gambit::core::types::PieceId;
use storm_gambit::emotion::empathy::EmpathyCommand;
use storm_gambit::game::session::{GameSession, TurnOutcome};
use storm_gambit::opponent::style::style_by_name;

use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(name = "storm-gambit", about = "Emotional board game core, demo loop")]
struct Args {
    /// RNG seed for a reproducible match
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Opponent style (nurturing, patient, guarded, erratic, harsh, or a
    /// data/opponent_styles file name)
    #[arg(long, default_value = "guarded")]
    style: String,

    /// Run this many turns non-interactively (0 = interactive loop)
    #[arg(long, default_value_t = 0)]
    turns: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "storm_gambit=info".to_string()),
        )
        .init();

    let args = Args::parse();
    let style = style_by_name(&args.style)?;
    tracing::info!(seed = args.seed, style = %style.name, "starting session");

    let mut session = GameSession::standard(args.seed, style);

    if args.turns > 0 {
        run_headless(&mut session, args.turns)?;
        return Ok(());
    }

    println!("\n=== STORM GAMBIT ===");
    println!("Every piece remembers. Play gently.");
    println!();
    println!("Commands:");
    println!("  tick / t              - Advance one turn");
    println!("  status / s            - Piece overview");
    println!("  weather / w           - Sky state and forecast");
    println!("  empathy <id> <cmd>    - validate|soothe|encourage|give_space|listen");
    println!("  approve / block       - Answer a pending intervention");
    println!("  move / m              - Opponent chooses and plays a move");
    println!("  events [n]            - Show the last n events (default 10)");
    println!("  quit / q              - Exit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["quit"] | ["q"] => break,
            ["tick"] | ["t"] => match session.advance_turn() {
                Ok(TurnOutcome::Complete) => print_turn_events(&session),
                Ok(TurnOutcome::AwaitingIntervention(id)) => {
                    print_turn_events(&session);
                    println!("! decision {id} pending: approve or block");
                }
                Err(e) => println!("error: {e}"),
            },
            ["status"] | ["s"] => print_status(&session),
            ["weather"] | ["w"] => print_weather(&session),
            ["approve"] => resolve(&mut session, true),
            ["block"] => resolve(&mut session, false),
            ["move"] | ["m"] => match session.request_opponent_move() {
                Ok(Some(chosen)) => {
                    if let Some(empathy) = &chosen.empathy {
                        println!("  \"{}\"", empathy.line);
                    }
                    println!(
                        "  opponent moves piece {} to {} (score {:.1})",
                        chosen.piece.0, chosen.descriptor.to, chosen.score
                    );
                }
                Ok(None) => println!("  opponent has no move"),
                Err(e) => println!("error: {e}"),
            },
            ["empathy", id, cmd] => {
                let Ok(id) = id.parse::<u32>() else {
                    println!("error: bad piece id");
                    continue;
                };
                match parse_command(cmd) {
                    Some(command) => match session.submit_empathy(PieceId(id), command) {
                        Ok(outcome) => println!(
                            "  trust {:+.1}{}",
                            outcome.trust_delta,
                            if outcome.regulated { ", regulated" } else { "" }
                        ),
                        Err(e) => println!("error: {e}"),
                    },
                    None => println!("error: unknown command {cmd}"),
                }
            }
            ["events"] => print_events(&session, 10),
            ["events", n] => print_events(&session, n.parse().unwrap_or(10)),
            [] => {}
            _ => println!("unknown command"),
        }
    }

    Ok(())
}

/// Auto-run: approve every intervention, let the opponent move each turn.
fn run_headless(session: &mut GameSession, turns: u64) -> Result<()> {
    for _ in 0..turns {
        let mut outcome = session.advance_turn()?;
        while let TurnOutcome::AwaitingIntervention(id) = outcome {
            outcome = session.resolve_intervention(id, true)?;
        }
        session.request_opponent_move()?;
    }
    print_status(session);
    print_weather(session);
    println!(
        "{} events over {} turns, {} storms",
        session.events.len(),
        session.world.turn,
        session.storm.history.len()
    );
    Ok(())
}

fn resolve(session: &mut GameSession, approved: bool) {
    let Some(pending) = session.pending_decision() else {
        println!("  nothing pending");
        return;
    };
    let id = pending.id;
    match session.resolve_intervention(id, approved) {
        Ok(TurnOutcome::Complete) => println!("  resolved, turn finished"),
        Ok(TurnOutcome::AwaitingIntervention(next)) => {
            println!("! decision {next} pending: approve or block")
        }
        Err(e) => println!("error: {e}"),
    }
}

fn parse_command(cmd: &str) -> Option<EmpathyCommand> {
    EmpathyCommand::all()
        .into_iter()
        .find(|c| c.id() == cmd)
}

fn print_status(session: &GameSession) {
    println!("turn {}", session.world.turn);
    for piece in &session.world.pieces {
        let state = match piece.subtype() {
            Some(kind) => kind.id(),
            None => "regulated",
        };
        println!(
            "  [{}] {:<8} {:?} {} trust {:+.1} {}{}",
            piece.id.0,
            piece.name,
            piece.team,
            piece.position,
            piece.trust(),
            state,
            if piece.captured { " (captured)" } else { "" },
        );
    }
}

fn print_weather(session: &GameSession) {
    let report = session.weather_report();
    println!(
        "sky {:?}, forecast {} (p = {:.2})",
        report.sky,
        report.forecast.id(),
        report.probability
    );
    if let Some(status) = session.storm_status() {
        println!(
            "  {} ({:?}), {} turns left, {} affected, epicenter {}",
            status.name, status.phase, status.remaining, status.affected, status.epicenter
        );
    }
}

fn print_turn_events(session: &GameSession) {
    for entry in session.events.events_for_turn(session.world.turn) {
        println!("  {:?}", entry.event);
    }
}

fn print_events(session: &GameSession, n: usize) {
    let start = session.events.len().saturating_sub(n);
    for entry in &session.events.entries[start..] {
        println!("  [turn {}] {:?}", entry.turn, entry.event);
    }
}
