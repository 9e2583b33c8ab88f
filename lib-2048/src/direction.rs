use crate::game::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Right = 2,
    Left = 3,
}

impl Direction {
    pub fn iter() -> impl Iterator<Item = Self> {
        [Self::Up, Self::Down, Self::Right, Self::Left].into_iter()
    }

    /// Unit vector as `(dx, dy)`, with `y` growing downwards.
    pub const fn vector(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Right => (1, 0),
            Self::Left => (-1, 0),
        }
    }
}

impl TryFrom<(i32, i32)> for Direction {
    type Error = GameError;

    fn try_from((dx, dy): (i32, i32)) -> Result<Self, Self::Error> {
        match (dx, dy) {
            (0, -1) => Ok(Self::Up),
            (0, 1) => Ok(Self::Down),
            (1, 0) => Ok(Self::Right),
            (-1, 0) => Ok(Self::Left),
            _ => Err(GameError::InvalidDirection { dx, dy }),
        }
    }
}
