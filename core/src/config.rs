//! Tunable parameters shared by every crate that takes part in a session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{MazeGeometry, DEFAULT_CELL_SIZE, DEFAULT_WALL_THICKNESS};

/// Collision radius of the player in world units.
pub const PLAYER_RADIUS: f32 = 10.0;

/// Player movement speed in world units per second.
pub const PLAYER_SPEED: f32 = 280.0;

/// Longest displacement resolved by a single collision sub-step.
pub const DEFAULT_SUBSTEP_LENGTH: f32 = 0.25;

const DEFAULT_MAZE_WIDTH: u32 = 30;
const DEFAULT_MAZE_HEIGHT: u32 = 30;
const DEFAULT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;
const DEFAULT_PURSUER_COUNT: usize = 20;
const DEFAULT_PURSUER_RADIUS: f32 = 10.0;
const DEFAULT_PURSUER_SPEED: f32 = 200.0;
const DEFAULT_AGGRO_RADIUS: f32 = 3.0 * DEFAULT_CELL_SIZE;
const DEFAULT_MIN_SPAWN_DISTANCE: u32 = 4;
const DEFAULT_MAX_SPAWN_ATTEMPTS: u32 = 64;

/// Parameters describing a complete chase session.
///
/// Every field has a default, so configuration files only need to name the
/// values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of maze columns.
    pub maze_width: u32,
    /// Number of maze rows.
    pub maze_height: u32,
    /// Seed feeding maze generation and spawn placement.
    pub seed: u64,
    /// Side length of a maze cell in world units.
    pub cell_size: f32,
    /// Thickness of every wall segment in world units.
    pub wall_thickness: f32,
    /// Collision radius of the player.
    pub player_radius: f32,
    /// Player speed in world units per second, used by shells to scale intents.
    pub player_speed: f32,
    /// Number of pursuers spawned when the session starts.
    pub pursuer_count: usize,
    /// Collision radius of every pursuer.
    pub pursuer_radius: f32,
    /// Pursuer speed in world units per second.
    pub pursuer_speed: f32,
    /// Distance at which a dormant pursuer starts chasing the player.
    pub aggro_radius: f32,
    /// Minimum distance, in cells, between the player and a spawn cell.
    pub min_spawn_distance: u32,
    /// Random draws attempted before spawn placement falls back to a fixed offset.
    pub max_spawn_attempts: u32,
    /// Longest displacement resolved by a single collision sub-step.
    pub substep_length: f32,
}

impl SessionConfig {
    /// World-space embedding of the maze described by this configuration.
    #[must_use]
    pub const fn geometry(&self) -> MazeGeometry {
        MazeGeometry::new(self.cell_size, self.wall_thickness)
    }

    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maze_width == 0 || self.maze_height == 0 {
            return Err(ConfigError::EmptyMaze {
                width: self.maze_width,
                height: self.maze_height,
            });
        }

        positive("cell_size", self.cell_size)?;
        positive("wall_thickness", self.wall_thickness)?;
        positive("player_radius", self.player_radius)?;
        positive("player_speed", self.player_speed)?;
        positive("pursuer_radius", self.pursuer_radius)?;
        positive("pursuer_speed", self.pursuer_speed)?;
        positive("aggro_radius", self.aggro_radius)?;
        positive("substep_length", self.substep_length)?;

        if self.wall_thickness >= self.cell_size {
            return Err(ConfigError::WallTooThick {
                wall_thickness: self.wall_thickness,
                cell_size: self.cell_size,
            });
        }

        let corridor = self.cell_size - self.wall_thickness;
        for radius in [self.player_radius, self.pursuer_radius] {
            if radius * 2.0 >= corridor {
                return Err(ConfigError::RadiusTooLarge { radius, corridor });
            }
        }

        let capacity = usize::try_from(u64::from(self.maze_width) * u64::from(self.maze_height))
            .unwrap_or(usize::MAX)
            .saturating_sub(1);
        if self.pursuer_count > capacity {
            return Err(ConfigError::TooManyPursuers {
                requested: self.pursuer_count,
                capacity,
            });
        }

        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            maze_width: DEFAULT_MAZE_WIDTH,
            maze_height: DEFAULT_MAZE_HEIGHT,
            seed: DEFAULT_SEED,
            cell_size: DEFAULT_CELL_SIZE,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            player_radius: PLAYER_RADIUS,
            player_speed: PLAYER_SPEED,
            pursuer_count: DEFAULT_PURSUER_COUNT,
            pursuer_radius: DEFAULT_PURSUER_RADIUS,
            pursuer_speed: DEFAULT_PURSUER_SPEED,
            aggro_radius: DEFAULT_AGGRO_RADIUS,
            min_spawn_distance: DEFAULT_MIN_SPAWN_DISTANCE,
            max_spawn_attempts: DEFAULT_MAX_SPAWN_ATTEMPTS,
            substep_length: DEFAULT_SUBSTEP_LENGTH,
        }
    }
}

/// Reasons a [`SessionConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The maze has no cells.
    #[error("maze dimensions {width}x{height} contain no cells")]
    EmptyMaze {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// A length, speed or radius is zero, negative or not finite.
    #[error("{field} must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied for the field.
        value: f32,
    },
    /// Walls would fill entire cells.
    #[error("wall thickness {wall_thickness} must be smaller than the cell size {cell_size}")]
    WallTooThick {
        /// Requested wall thickness.
        wall_thickness: f32,
        /// Requested cell size.
        cell_size: f32,
    },
    /// An agent would not fit between two walls.
    #[error("agent radius {radius} does not fit a corridor {corridor} units wide")]
    RadiusTooLarge {
        /// Offending agent radius.
        radius: f32,
        /// Free width between two parallel walls.
        corridor: f32,
    },
    /// More pursuers were requested than there are cells besides the player's.
    #[error("{requested} pursuers requested but the maze hosts at most {capacity}")]
    TooManyPursuers {
        /// Requested number of pursuers.
        requested: usize,
        /// Number of cells available to pursuers.
        capacity: usize,
    },
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_maze() {
        let config = SessionConfig {
            maze_height: 0,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyMaze {
                width: 30,
                height: 0
            })
        );
    }

    #[test]
    fn rejects_non_finite_speed() {
        let config = SessionConfig {
            pursuer_speed: f32::NAN,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "pursuer_speed",
                ..
            })
        ));
    }

    #[test]
    fn rejects_agents_wider_than_corridors() {
        let config = SessionConfig {
            cell_size: 20.0,
            wall_thickness: 4.0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RadiusTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_more_pursuers_than_cells() {
        let config = SessionConfig {
            maze_width: 2,
            maze_height: 2,
            pursuer_count: 4,
            ..SessionConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyPursuers {
                requested: 4,
                capacity: 3
            })
        );
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: SessionConfig =
            toml::from_str("maze_width = 12\npursuer_count = 3\n").expect("parse config");

        assert_eq!(config.maze_width, 12);
        assert_eq!(config.pursuer_count, 3);
        assert_eq!(config.maze_height, SessionConfig::default().maze_height);
        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
    }
}
