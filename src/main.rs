use std::{
    io::{self, Read, Write},
    os::fd::AsRawFd,
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use lib_2048::Game;
use log::info;
use rand::Rng;

mod config;
mod input;
mod render;

use config::Config;
use input::{Command, Cooldown, KeyDecoder};

#[derive(Debug, Parser)]
#[command(author, version, about = "Play 2048 in the terminal (arrows or WASD, r restarts, q quits)")]
struct Cli {
    /// TOML file with `cooldown_ms`, `seed` and `high_score` keys
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for tile spawns (random when omitted)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// High score carried over from an earlier session
    #[arg(long, value_name = "SCORE")]
    high_score: Option<u64>,

    /// Minimum delay between accepted moves
    #[arg(long, value_name = "MS")]
    cooldown_ms: Option<u64>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml(path)?,
            None => Config::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }

        if let Some(high_score) = self.high_score {
            config.high_score = high_score;
        }

        if let Some(cooldown_ms) = self.cooldown_ms {
            config.cooldown_ms = cooldown_ms;
        }

        Ok(config)
    }
}

fn play_interactive<R: Rng>(
    out: &mut (impl AsRawFd + Write),
    input: &mut impl Read,
    game: &mut Game<R>,
    config: &Config,
) -> Result<()> {
    let decoder = KeyDecoder::new().context("building key decoder")?;
    let mut cooldown = Cooldown::new(config.cooldown());

    let mut buf = [0u8; 128];
    let mut buf_len = 0;

    let _terminal = render::setup_terminal(out).context("switching terminal to raw input")?;
    render::draw_board(out, game.grid(), game.score(), game.high_score())?;

    loop {
        let read = input.read(&mut buf[buf_len..])?;

        if read == 0 {
            return Ok(());
        }

        buf_len += read;

        let (commands, consumed) = decoder.decode(&buf[..buf_len]);

        for command in commands {
            match command {
                Command::Quit => return Ok(()),
                Command::Restart => {
                    game.restart();
                    cooldown.reset();

                    render::draw_board(out, game.grid(), game.score(), game.high_score())?;
                }
                Command::Move(direction) => {
                    if game.is_over() || !cooldown.try_acquire(Instant::now()) {
                        continue;
                    }

                    let old_grid = *game.grid();
                    let old_score = game.score();

                    let turn = game.apply_move(direction);

                    if turn.moved {
                        render::redraw_board(
                            out,
                            &old_grid,
                            game.grid(),
                            old_score,
                            game.score(),
                            game.high_score(),
                        )?;
                    }

                    if game.is_over() {
                        render::draw_game_over(out)?;
                    }
                }
            }
        }

        // An unfinished escape sequence that fills the whole buffer is garbage.
        let consumed = if consumed == 0 && buf_len == buf.len() {
            buf_len
        } else {
            consumed
        };

        buf.copy_within(consumed..buf_len, 0);
        buf_len -= consumed;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = cli.into_config()?;

    let mut game = match config.seed {
        Some(seed) => Game::seeded(seed, config.high_score),
        None => Game::from_entropy(config.high_score),
    };

    info!("starting with {config:?}");

    let mut stdout = io::stdout().lock();
    let mut stdin = io::stdin().lock();

    play_interactive(&mut stdout, &mut stdin, &mut game, &config)?;

    info!(
        "finished with score {} (high score {})",
        game.score(),
        game.high_score()
    );

    stdout.write_all(b"\n")?;

    Ok(())
}
