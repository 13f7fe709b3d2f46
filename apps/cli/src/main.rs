#![deny(warnings)]

//! Line-oriented front end: reads commands from stdin and prints what happened.

mod command;

use anyhow::{bail, Context, Result};
use command::{Command, HELP};
use monopoly_config::GameConfig;
use monopoly_core::{DeckKind, GameResult, Owner};
use monopoly_runtime::{net_worth, Game, GameEvent, Prompter};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    board: PathBuf,
    cards: PathBuf,
    rules: Option<PathBuf>,
    seed: Option<u64>,
    version: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        board: PathBuf::from("assets/board.txt"),
        cards: PathBuf::from("assets/cards.txt"),
        rules: None,
        seed: None,
        version: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().with_context(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--board" => args.board = value()?.into(),
            "--cards" => args.cards = value()?.into(),
            "--rules" => args.rules = Some(value()?.into()),
            "--seed" => {
                let seed = value()?;
                args.seed = Some(seed.parse().with_context(|| format!("invalid seed `{seed}`"))?);
            }
            "--version" => args.version = true,
            other => bail!("unknown argument `{other}`"),
        }
    }
    Ok(args)
}

/// Asks the player at the terminal which card to take.
struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn choose_card(&mut self, player: &str, deck: DeckKind, count: usize) -> usize {
        loop {
            print!("{player}, pick a {deck} card (1-{count}): ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            match io::stdin().lock().read_line(&mut line) {
                Ok(0) | Err(_) => return 1,
                Ok(_) => {}
            }
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return n,
                _ => println!("enter a number between 1 and {count}"),
            }
        }
    }
}

fn show_player(game: &Game) -> GameResult<()> {
    let p = game.current()?;
    let avatar = &p.avatar;
    let cell = &game.board().cell(avatar.position())?.name;
    println!(
        "{} [{} {}] on {cell} | balance {} | net worth {}",
        p.name,
        avatar.id,
        avatar.archetype,
        p.balance,
        net_worth(game.board(), p)
    );
    println!(
        "throws left {} | {} mode{}{}",
        avatar.throws_remaining(),
        if avatar.is_special() { "special" } else { "basic" },
        if avatar.is_jailed() { " | in jail" } else { "" },
        if avatar.cooldown() > 0 { " | cooling down" } else { "" },
    );
    for &pos in &p.properties {
        if let Some(prop) = game.board().property(pos) {
            let mortgaged = if prop.mortgaged { " (mortgaged)" } else { "" };
            println!("  {}{mortgaged}, {} buildings", prop.name, prop.buildings.len());
        }
    }
    Ok(())
}

fn show_trades(game: &Game) {
    let name = |id| game.ledger().owner_name(Owner::Player(id));
    for t in game.trades().trades() {
        println!(
            "{}: {} -> {} {:?} ({})",
            t.id,
            name(t.proposer),
            name(t.target),
            t.kind,
            t.state
        );
    }
}

fn show_stats(game: &Game, player: Option<&str>) -> GameResult<()> {
    let Some(name) = player else {
        print!("{}", game.stats());
        return Ok(());
    };
    let s = game.player_stats(name)?;
    println!("laps {} | throws {} | jail visits {}", s.laps, s.throws, s.jail_visits);
    println!(
        "investment {} | taxes {} | rent paid {} | rent received {}",
        s.investment, s.taxes, s.rent_paid, s.rent_received
    );
    println!(
        "go bonuses {} | prizes {} | expenses {}",
        s.go_bonuses, s.prizes, s.expenses
    );
    Ok(())
}

fn run(game: &mut Game, command: Command, prompter: &mut dyn Prompter) -> GameResult<Vec<GameEvent>> {
    let events = match command {
        Command::Create { name, archetype } => game.add_player(&name, &archetype)?,
        Command::Start => game.start()?,
        Command::Roll(dice) => game.roll(dice, prompter)?,
        Command::Next => game.continue_move(prompter)?,
        Command::End => game.end_turn()?,
        Command::Bail => game.pay_bail()?,
        Command::Mode => game.toggle_mode()?,
        Command::Buy => game.buy()?,
        Command::Build { kind, count } => game.build(kind, count)?,
        Command::Sell { kind, property, count } => game.sell(kind, &property, count)?,
        Command::Mortgage(p) => game.mortgage(&p)?,
        Command::Unmortgage(p) => game.unmortgage(&p)?,
        Command::Trade { target, offer } => {
            let kind = offer.resolve(game.board())?;
            game.propose_trade(&target, kind)?
        }
        Command::Accept(id) => game.accept_trade(&id)?,
        Command::Withdraw(id) => game.withdraw_trade(&id)?,
        Command::Bankrupt => game.declare_bankruptcy()?,
        Command::Trades => {
            show_trades(game);
            Vec::new()
        }
        Command::Player => {
            show_player(game)?;
            Vec::new()
        }
        Command::Stats(name) => {
            show_stats(game, name.as_deref())?;
            Vec::new()
        }
        Command::Help => {
            println!("{HELP}");
            Vec::new()
        }
        Command::Quit => Vec::new(),
    };
    Ok(events)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = parse_args()?;
    if args.version {
        println!("monopoly {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_SHA"));
        return Ok(());
    }

    let mut config = GameConfig::load(&args.board, &args.cards, args.rules.as_deref())
        .context("cannot load the game configuration")?;
    if let Some(seed) = args.seed {
        config.rules.rng_seed = seed;
    }
    let mut game = Game::new(config)?;
    info!(board = %args.board.display(), cards = %args.cards.display(), "ready");
    println!("type `help` for the list of commands");

    let mut prompter = StdinPrompter;
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = match command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {e}");
                continue;
            }
        };
        match run(&mut game, command, &mut prompter) {
            Ok(events) => {
                for event in events {
                    println!("{event}");
                }
            }
            Err(e) if e.is_fatal() => {
                return Err(e).context("the game reached an inconsistent state");
            }
            Err(e) => {
                warn!(error = %e, "command rejected");
                println!("error: {e}");
            }
        }
    }
    Ok(())
}
