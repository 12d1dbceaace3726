use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the block model surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("Unknown block kind: {0}")]
    UnknownBlockKind(String),

    #[error("Invalid direction value: {0}")]
    InvalidDirection(u8),
}

/// The instruction a placed block stands for.
///
/// `Unknown` absorbs unrecognized kinds from external input so a run can
/// treat them as no-op steps instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Move,
    Turn,
    If,
    Loop,
    Wait,
    #[serde(other)]
    Unknown,
}

impl BlockKind {
    /// Palette label shown for blocks of this kind.
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Move => "Move Forward",
            BlockKind::Turn => "Turn Right",
            BlockKind::If => "If Wall Ahead",
            BlockKind::Loop => "Repeat 3 times",
            BlockKind::Wait => "Wait 1 second",
            BlockKind::Unknown => "Unknown",
        }
    }

    /// Parameters a freshly dropped block of this kind starts with.
    pub fn default_params(self) -> BlockParams {
        match self {
            BlockKind::Move => BlockParams::Move { steps: 1 },
            BlockKind::Turn => BlockParams::Turn {
                direction: TurnDirection::Right,
            },
            BlockKind::If => BlockParams::If {
                condition: "wall".to_string(),
            },
            BlockKind::Loop => BlockParams::Loop { count: 3 },
            BlockKind::Wait => BlockParams::Wait { duration_seconds: 1 },
            BlockKind::Unknown => BlockParams::None,
        }
    }
}

impl std::str::FromStr for BlockKind {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(BlockKind::Move),
            "turn" => Ok(BlockKind::Turn),
            "if" => Ok(BlockKind::If),
            "loop" => Ok(BlockKind::Loop),
            "wait" => Ok(BlockKind::Wait),
            _ => Err(ProgramError::UnknownBlockKind(s.to_string())),
        }
    }
}

/// Turn direction parameter. Accepted on turn blocks, but only the
/// right-turn behavior is implemented by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Kind-specific block parameters, fixed at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockParams {
    Move { steps: u32 },
    Turn { direction: TurnDirection },
    If { condition: String },
    Loop { count: u32 },
    Wait { duration_seconds: u32 },
    None,
}

/// Canvas coordinates of a placed block. Used for visual placement and to
/// derive execution order, never as grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One placed instruction block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: Uuid,
    pub kind: BlockKind,
    pub label: String,
    pub params: BlockParams,
    pub position: Position,
    pub created_at: DateTime<Utc>,
}

impl Block {
    /// Construct a block with a fresh id and kind-default label and params.
    pub fn new(kind: BlockKind, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            label: kind.label().to_string(),
            params: kind.default_params(),
            position,
            created_at: Utc::now(),
        }
    }
}

/// Robot facing, cyclic. Wire format is the integer 0..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Direction {
    East,
    South,
    West,
    North,
}

impl Direction {
    /// Unit grid step along the current facing.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
        }
    }

    /// One fixed 90-degree clockwise step.
    pub fn turned_right(self) -> Self {
        match self {
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::North => Direction::East,
        }
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::East => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::North => 3,
        }
    }
}

impl TryFrom<u8> for Direction {
    type Error = ProgramError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::East),
            1 => Ok(Direction::South),
            2 => Ok(Direction::West),
            3 => Ok(Direction::North),
            other => Err(ProgramError::InvalidDirection(other)),
        }
    }
}

/// The simulated robot.
///
/// `energy` is decorative in the current instruction set; no instruction
/// consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotState {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    pub energy: u8,
}

impl RobotState {
    /// State every run and reset begins from.
    pub fn initial() -> Self {
        Self {
            x: 1,
            y: 1,
            direction: Direction::East,
            energy: 100,
        }
    }
}

impl Default for RobotState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_kind_parses_known_strings() {
        assert_eq!("move".parse::<BlockKind>().unwrap(), BlockKind::Move);
        assert_eq!("turn".parse::<BlockKind>().unwrap(), BlockKind::Turn);
        assert_eq!("if".parse::<BlockKind>().unwrap(), BlockKind::If);
        assert_eq!("loop".parse::<BlockKind>().unwrap(), BlockKind::Loop);
        assert_eq!("wait".parse::<BlockKind>().unwrap(), BlockKind::Wait);
    }

    #[test]
    fn block_kind_rejects_unknown_strings() {
        let err = "jetpack".parse::<BlockKind>().unwrap_err();
        assert_eq!(err, ProgramError::UnknownBlockKind("jetpack".to_string()));
    }

    #[test]
    fn unknown_kind_deserializes_to_catch_all() {
        let kind: BlockKind = serde_json::from_str("\"jetpack\"").unwrap();
        assert_eq!(kind, BlockKind::Unknown);
    }

    #[test]
    fn default_params_match_palette_templates() {
        assert_eq!(
            BlockKind::Move.default_params(),
            BlockParams::Move { steps: 1 }
        );
        assert_eq!(
            BlockKind::Turn.default_params(),
            BlockParams::Turn {
                direction: TurnDirection::Right
            }
        );
        assert_eq!(
            BlockKind::Loop.default_params(),
            BlockParams::Loop { count: 3 }
        );
    }

    #[test]
    fn direction_cycles_clockwise() {
        let mut direction = Direction::East;
        for _ in 0..4 {
            direction = direction.turned_right();
        }
        assert_eq!(direction, Direction::East);
        assert_eq!(Direction::East.turned_right(), Direction::South);
    }

    #[test]
    fn direction_round_trips_through_wire_format() {
        for value in 0u8..4 {
            let direction = Direction::try_from(value).unwrap();
            assert_eq!(u8::from(direction), value);
        }
        assert_eq!(
            Direction::try_from(4).unwrap_err(),
            ProgramError::InvalidDirection(4)
        );
    }

    #[test]
    fn robot_state_serializes_direction_as_integer() {
        let json = serde_json::to_value(RobotState::initial()).unwrap();
        assert_eq!(json["direction"], 0);
        assert_eq!(json["x"], 1);
        assert_eq!(json["energy"], 100);
    }
}
