use std::{
    io::{self, Write},
    mem::MaybeUninit,
    os::fd::{AsRawFd, RawFd},
};

use lib_2048::{Grid, N};

const SQUARE_HEIGHT: usize = 3;
const PAD_ABOVE: usize = (SQUARE_HEIGHT - 1) / 2;
const TOP_ROW: &[u8] = "┏━━━━━━━┳━━━━━━━┳━━━━━━━┳━━━━━━━┓\n".as_bytes();
const SEPARATOR_ROW: &[u8] = "┣━━━━━━━╋━━━━━━━╋━━━━━━━╋━━━━━━━┫\n".as_bytes();
const BOTTOM_ROW: &[u8] = "┗━━━━━━━┻━━━━━━━┻━━━━━━━┻━━━━━━━┛\n".as_bytes();
const EMPTY_ROW: &[u8] = "┃       ┃       ┃       ┃       ┃\n".as_bytes();
const EMPTY_CELL: &[u8] = "┃       ".as_bytes();
const COLOUR_TABLE: [u8; 7] = [90, 33, 31, 32, 33, 36, 35];

/// Lines between the score line and the line below the board, inclusive of the score line.
const SCORE_LINE: usize = SQUARE_HEIGHT * N + N + 2;

fn tile_colour(value: u32) -> Option<u8> {
    (value != 0).then(|| COLOUR_TABLE[(value.trailing_zeros() as usize - 1) % COLOUR_TABLE.len()])
}

/// Lines above the cursor at which the top of grid row `row` is drawn, counting the line the
/// cursor rests on after a full draw as 0.
const fn row_line(row: usize) -> usize {
    1 + SQUARE_HEIGHT + (SQUARE_HEIGHT + 1) * (N - 1 - row)
}

fn move_cursor(out: &mut impl Write, current_line: usize, target_line: usize) -> io::Result<()> {
    if target_line > current_line {
        write!(out, "\x1b[{}F", target_line - current_line)
    } else if target_line < current_line {
        write!(out, "\x1b[{}E", current_line - target_line)
    } else {
        write!(out, "\r")
    }
}

fn write_score_line(out: &mut impl Write, score: u64, high_score: u64) -> io::Result<()> {
    write!(out, "Score: {score:<10}High: {high_score}\x1b[K")
}

fn draw_board_row(out: &mut impl Write, cells: &[u32; N]) -> io::Result<()> {
    for line in 0..SQUARE_HEIGHT {
        if line != 0 {
            out.write_all(b"\x1b[E")?;
        }

        for &value in cells {
            match tile_colour(value) {
                Some(colour) if line == PAD_ABOVE => {
                    write!(out, "┃\x1b[7m\x1b[{colour}m{value:^7}\x1b[m")?;
                }
                Some(colour) => write!(out, "┃\x1b[{}m       \x1b[m", colour + 10)?,
                None => out.write_all(EMPTY_CELL)?,
            }
        }
    }

    Ok(())
}

pub fn draw_board(out: &mut impl Write, grid: &Grid, score: u64, high_score: u64) -> io::Result<()> {
    out.write_all(b"\n")?;
    write_score_line(out, score, high_score)?;
    out.write_all(b"\n")?;
    out.write_all(TOP_ROW)?;

    for i in 0..N {
        if i != 0 {
            out.write_all(SEPARATOR_ROW)?;
        }

        for _ in 0..SQUARE_HEIGHT {
            out.write_all(EMPTY_ROW)?;
        }
    }

    out.write_all(BOTTOM_ROW)?;

    redraw_board(out, &Grid::EMPTY, grid, score, score, high_score)
}

/// Rewrites the rows that differ between `old_grid` and `new_grid`, and the score line if the
/// score changed. The cursor must be on the line below a board drawn by [`draw_board`].
pub fn redraw_board(
    out: &mut impl Write,
    old_grid: &Grid,
    new_grid: &Grid,
    old_score: u64,
    new_score: u64,
    high_score: u64,
) -> io::Result<()> {
    let mut current_line = if new_score != old_score {
        write!(out, "\x1b[{SCORE_LINE}F")?;
        write_score_line(out, new_score, high_score)?;

        SCORE_LINE
    } else {
        0
    };

    let changed_rows = (0..N).filter(|&row| old_grid.rows()[row] != new_grid.rows()[row]);

    for row in changed_rows {
        let target_line = row_line(row);

        move_cursor(out, current_line, target_line)?;
        draw_board_row(out, &new_grid.rows()[row])?;

        current_line = target_line - (SQUARE_HEIGHT - 1);
    }

    if current_line != 0 {
        write!(out, "\x1b[{current_line}E")?;
    }

    out.flush()
}

pub fn draw_game_over(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"Game over. Press r to play again or q to quit.\n")?;
    out.flush()
}

/// Restores the terminal mode captured by [`setup_terminal`] when dropped.
pub struct TerminalGuard {
    fd: RawFd,
    original: libc::termios,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSADRAIN, &self.original);
        }
    }
}

/// Turns off echo and line buffering so single key presses reach the game.
pub fn setup_terminal(fd: &impl AsRawFd) -> io::Result<TerminalGuard> {
    let fd = fd.as_raw_fd();
    let mut termios = MaybeUninit::uninit();

    let original = unsafe {
        if libc::tcgetattr(fd, termios.as_mut_ptr()) != 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "Error calling tcgetattr",
            ));
        }

        termios.assume_init()
    };

    let mut termios = original;
    termios.c_lflag &= !(libc::ECHO | libc::ICANON);

    unsafe {
        if libc::tcsetattr(fd, libc::TCSADRAIN, &termios) != 0 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "Error calling tcsetattr",
            ));
        }
    }

    Ok(TerminalGuard { fd, original })
}
