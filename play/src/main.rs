mod agent;
mod game;
mod human;

use crate::agent::{Agent, PolicyAgent, RandomAgent};
use crate::game::{play_game, play_series};
use crate::human::play_human;
use clap::{Args, Parser, Subcommand, ValueEnum};
use nn::policy::PolicyModel;
use nn::vocab::MoveVocab;
use shakmaty::Color;
use std::error::Error;
use std::path::Path;
use std::rc::Rc;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plays a single game between two move sources
    Play(PlayCommand),
    /// Plays a series of games with alternating colors and tallies wins
    Match(MatchCommand),
    /// Plays an interactive game against the model
    Human(HumanCommand),
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Uniform random over legal moves
    Random,
    /// The trained policy network
    Model,
}

impl Source {
    fn label(self) -> &'static str {
        match self {
            Source::Random => "random",
            Source::Model => "model",
        }
    }
}

#[derive(Args)]
struct ModelArgs {
    /// The policy network weight file
    #[arg(long, value_name = ".nn file")]
    model: Option<String>,

    /// The move vocabulary JSON saved at training time
    #[arg(long, value_name = "vocab.json")]
    vocab: Option<String>,
}

#[derive(Args)]
struct PlayCommand {
    #[clap(flatten)]
    model_args: ModelArgs,

    /// Move source for the white pieces
    #[arg(long, value_enum, default_value = "model")]
    white: Source,

    /// Move source for the black pieces
    #[arg(long, value_enum, default_value = "random")]
    black: Source,

    /// Print the board after every move
    #[arg(long, default_value = "false")]
    print_game: bool,

    /// Seed for the random move source
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct MatchCommand {
    #[clap(flatten)]
    model_args: ModelArgs,

    /// First move source (plays white on even-numbered games)
    #[arg(long, value_enum, default_value = "model")]
    a: Source,

    /// Second move source
    #[arg(long, value_enum, default_value = "random")]
    b: Source,

    /// Number of games to play
    #[arg(long, default_value = "50")]
    games: usize,

    /// Seed for the random move source
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct HumanCommand {
    #[clap(flatten)]
    model_args: ModelArgs,

    /// Side played by the human
    #[arg(long, value_enum, default_value = "white")]
    color: SideArg,
}

#[derive(ValueEnum, Clone, Copy)]
enum SideArg {
    White,
    Black,
}

/// Model and vocabulary loaded once at startup and shared by every agent
/// that needs them.
struct ModelContext {
    model: Rc<PolicyModel>,
    vocab: Rc<MoveVocab>,
}

fn load_context(args: &ModelArgs) -> Result<ModelContext, Box<dyn Error>> {
    let model_path = args
        .model
        .as_deref()
        .ok_or("--model is required for the model move source")?;
    let vocab_path = args
        .vocab
        .as_deref()
        .ok_or("--vocab is required for the model move source")?;

    let model = PolicyModel::load(model_path)?;
    println!("Policy net: {}", model.arch);
    println!("Policy size: {} params", model.params);

    let vocab = MoveVocab::load(Path::new(vocab_path))?;
    if vocab.len() != model.num_moves() {
        return Err(format!(
            "vocabulary has {} moves but the model outputs {}",
            vocab.len(),
            model.num_moves()
        )
        .into());
    }

    Ok(ModelContext {
        model: Rc::new(model),
        vocab: Rc::new(vocab),
    })
}

fn load_context_if(
    args: &ModelArgs,
    needed: bool,
) -> Result<Option<ModelContext>, Box<dyn Error>> {
    if needed {
        Ok(Some(load_context(args)?))
    } else {
        Ok(None)
    }
}

fn build_agent(
    source: Source,
    context: Option<&ModelContext>,
    seed: Option<u64>,
) -> Result<Box<dyn Agent>, Box<dyn Error>> {
    Ok(match source {
        Source::Random => Box::new(RandomAgent::new(seed)),
        Source::Model => {
            let context = context.ok_or("model context missing")?;
            Box::new(PolicyAgent::new(context.model.clone(), context.vocab.clone()))
        }
    })
}

fn run_play(cmd: PlayCommand) -> Result<(), Box<dyn Error>> {
    let needs_model = cmd.white == Source::Model || cmd.black == Source::Model;
    let context = load_context_if(&cmd.model_args, needs_model)?;

    let mut white = build_agent(cmd.white, context.as_ref(), cmd.seed)?;
    let mut black = build_agent(cmd.black, context.as_ref(), cmd.seed)?;

    let outcome = play_game(white.as_mut(), black.as_mut(), cmd.print_game);
    println!("Result: {}", outcome);

    Ok(())
}

fn run_match(cmd: MatchCommand) -> Result<(), Box<dyn Error>> {
    let needs_model = cmd.a == Source::Model || cmd.b == Source::Model;
    let context = load_context_if(&cmd.model_args, needs_model)?;

    let mut a = build_agent(cmd.a, context.as_ref(), cmd.seed)?;
    let mut b = build_agent(cmd.b, context.as_ref(), cmd.seed)?;

    let standings = play_series(a.as_mut(), b.as_mut(), cmd.games, true);

    println!("\nFinal standings:");
    println!("Wins {}: {}", cmd.a.label(), standings.wins_a);
    println!("Wins {}: {}", cmd.b.label(), standings.wins_b);
    println!("Draws: {}", standings.draws);
    if standings.unfinished > 0 {
        println!("Aborted: {}", standings.unfinished);
    }

    Ok(())
}

fn run_human(cmd: HumanCommand) -> Result<(), Box<dyn Error>> {
    let context = load_context(&cmd.model_args)?;
    let mut agent = PolicyAgent::new(context.model.clone(), context.vocab.clone());

    let human_color = match cmd.color {
        SideArg::White => Color::White,
        SideArg::Black => Color::Black,
    };

    play_human(&mut agent, human_color);

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    match args.command {
        Commands::Play(cmd) => run_play(cmd),
        Commands::Match(cmd) => run_match(cmd),
        Commands::Human(cmd) => run_human(cmd),
    }
}
