/// Terrain synthesis error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// Corner array length does not match `width * height`
    GridSizeMismatch {
        width: usize,
        height: usize,
        corners: usize,
    },

    /// A tile's corners span more tiers than a step code can encode ('A'..='Z')
    TierSpreadOutOfRange { x: usize, y: usize, spread: i32 },

    /// Tier differences that do not fit in 'A'..='Z'
    StepOutOfRange { tiers: [i16; 4] },

    /// Step code text that is not four uppercase ASCII letters
    InvalidStepCode(String),
}

impl std::fmt::Display for TerrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainError::GridSizeMismatch {
                width,
                height,
                corners,
            } => match width.checked_mul(*height) {
                Some(expected) => write!(
                    f,
                    "Grid size mismatch: {}x{} grid needs {} corners, got {}",
                    width, height, expected, corners
                ),
                None => write!(
                    f,
                    "Grid size mismatch: {}x{} grid needs more corners than fit in memory, got {}",
                    width, height, corners
                ),
            },
            TerrainError::TierSpreadOutOfRange { x, y, spread } => write!(
                f,
                "Tile ({}, {}) spans {} elevation tiers, step codes encode at most 25",
                x, y, spread
            ),
            TerrainError::StepOutOfRange { tiers } => {
                write!(f, "Tiers {:?} cannot be encoded as a step code", tiers)
            }
            TerrainError::InvalidStepCode(code) => write!(f, "Invalid step code: {:?}", code),
        }
    }
}

impl std::error::Error for TerrainError {}

/// Result type for terrain operations
pub type Result<T> = std::result::Result<T, TerrainError>;
