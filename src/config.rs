use crate::simulation::ShapeKind;

/// Initial window size in logical pixels
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 800;

// ============================================
// Wave Physics
// ============================================

/// Stroke width every wave is created with (pixels)
pub const WAVE_STROKE_WIDTH: f32 = 2.0;

/// Per-tick multiplicative decay of wave energy
pub const ENERGY_DECAY: f32 = 0.995;

/// Per-tick multiplicative decay of wave strength
pub const STRENGTH_DECAY: f32 = 0.99;

/// A wave whose strength or energy falls to this value is dead
pub const DEATH_THRESHOLD: f32 = 0.01;

/// Base color of every wave before any collision recolors it
pub const WAVE_BASE_COLOR: [u8; 3] = [255, 255, 255];

/// Collision damping applied to the stronger wave of a touching pair
pub const COLLISION_ENERGY_LOSS: f32 = 0.9;
pub const COLLISION_SPEED_LOSS: f32 = 0.95;
pub const COLLISION_STRENGTH_LOSS: f32 = 0.95;

// ============================================
// Droplet Physics
// ============================================

/// Horizontal spring pulling a droplet back over its launch point
pub const DROPLET_RECENTER: f32 = 0.02;

/// Damping on horizontal integration
pub const DROPLET_DRIFT: f32 = 0.2;

/// Gravity per tick before the configured multiplier
pub const DROPLET_GRAVITY: f32 = 0.8;

/// Alpha lost per tick once a droplet has landed
pub const DROPLET_FADE: f32 = 0.1;

/// Strength of the wave a droplet leaves when it lands
pub const DROPLET_WAVE_STRENGTH: f32 = 0.22;

/// Droplet radius range (pixels)
pub const DROPLET_SIZE_MIN: f32 = 1.0;
pub const DROPLET_SIZE_MAX: f32 = 3.0;

// ============================================
// Splash
// ============================================

/// Strength of the wave directly under the pointer
pub const PRIMARY_WAVE_STRENGTH: f32 = 1.0;

/// Strength of the first secondary wave, and the drop per following one
pub const SECONDARY_WAVE_STRENGTH: f32 = 0.7;
pub const SECONDARY_WAVE_STEP: f32 = 0.2;

/// Jitter box (pixels) for secondary waves before the spread multiplier
pub const SECONDARY_WAVE_OFFSET: f32 = 5.0;

// ============================================
// Pool (height-field) Scene
// ============================================

/// Pixels per height-field cell
pub const POOL_RESOLUTION: f32 = 5.0;

/// Damping applied each step to the height field
pub const POOL_DAMPING: f32 = 0.98;

/// Height injected by a click
pub const POOL_IMPULSE: f32 = 100.0;

// ============================================
// Defaults for runtime settings
// ============================================

pub const DEFAULT_DROPLET_COUNT: u32 = 20;
pub const DEFAULT_DROPLET_VELOCITY: f32 = 15.0;
pub const DEFAULT_WAVE_SPEED: f32 = 5.0;
pub const DEFAULT_WAVE_STRENGTH: f32 = 1.0;
pub const DEFAULT_BACKGROUND_FADE: f32 = 0.1;
pub const DEFAULT_GRAVITY_INTENSITY: f32 = 1.0;
pub const DEFAULT_SECONDARY_WAVES: u32 = 3;
pub const DEFAULT_SPLASH_DELAY: f32 = 0.0;
pub const DEFAULT_SPLASH_SPREAD: f32 = 1.0;
pub const DEFAULT_AUTO_CLICK_INTERVAL: f32 = 1.5;

// ============================================
// Control step sizes (keyboard)
// ============================================

pub const WAVE_SPEED_STEP: f32 = 0.5;
pub const WAVE_STRENGTH_STEP: f32 = 0.1;
pub const FADE_STEP: f32 = 0.02;
pub const GRAVITY_STEP: f32 = 0.1;
pub const DROPLET_COUNT_STEP: u32 = 5;
pub const DROPLET_VELOCITY_STEP: f32 = 1.0;
pub const SPLASH_DELAY_STEP: f32 = 0.05;
pub const SPLASH_SPREAD_STEP: f32 = 0.5;

/// Named droplet palettes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    White,
    Blue,
    Green,
    Purple,
}

impl Palette {
    pub const ALL: [Palette; 4] = [Palette::White, Palette::Blue, Palette::Green, Palette::Purple];

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Palette::White => [255, 255, 255],
            Palette::Blue => [100, 149, 237],
            Palette::Green => [50, 205, 50],
            Palette::Purple => [138, 43, 226],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::White => "white",
            Palette::Blue => "blue",
            Palette::Green => "green",
            Palette::Purple => "purple",
        }
    }

    /// Look up a palette by name, falling back to white
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Palette::White)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Whether colliding waves pick up new colors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Monochrome,
    Colorful,
}

/// What gets painted beneath the waves
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneMode {
    /// Fading black background
    Rings,
    /// Damped height-field water under the rings
    Pool,
}

/// Runtime configuration, mutated by the controls between frames
#[derive(Clone, Debug)]
pub struct Settings {
    pub droplet_count: u32,
    pub droplet_velocity: f32,
    pub wave_speed: f32,
    pub wave_strength: f32,
    pub background_fade: f32,
    pub palette: Palette,
    pub trail_effect: bool,
    pub gravity_intensity: f32,
    pub color_mode: ColorMode,
    pub shape: ShapeKind,
    pub available_shapes: Vec<ShapeKind>,
    pub random_shape: bool,
    /// Seconds between staggered secondary waves (0 = all at once)
    pub splash_delay: f32,
    pub splash_spread: f32,
    pub particles: bool,
    pub secondary_waves: u32,
    pub auto_click_interval: f32,
    pub collision_damping: bool,
    pub scene: SceneMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            droplet_count: DEFAULT_DROPLET_COUNT,
            droplet_velocity: DEFAULT_DROPLET_VELOCITY,
            wave_speed: DEFAULT_WAVE_SPEED,
            wave_strength: DEFAULT_WAVE_STRENGTH,
            background_fade: DEFAULT_BACKGROUND_FADE,
            palette: Palette::White,
            trail_effect: false,
            gravity_intensity: DEFAULT_GRAVITY_INTENSITY,
            color_mode: ColorMode::Monochrome,
            shape: ShapeKind::Circle,
            available_shapes: ShapeKind::ALL.to_vec(),
            random_shape: false,
            splash_delay: DEFAULT_SPLASH_DELAY,
            splash_spread: DEFAULT_SPLASH_SPREAD,
            particles: true,
            secondary_waves: DEFAULT_SECONDARY_WAVES,
            auto_click_interval: DEFAULT_AUTO_CLICK_INTERVAL,
            collision_damping: false,
            scene: SceneMode::Rings,
        }
    }
}

/// Environment variable naming the starting shape
pub const SHAPE_ENV: &str = "SPLASH_SHAPE";

/// Environment variable naming the starting droplet palette
pub const PALETTE_ENV: &str = "SPLASH_PALETTE";

impl Settings {
    /// Defaults with the starting shape and palette taken from the
    /// environment when set
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_names(
            std::env::var(SHAPE_ENV).ok().as_deref(),
            std::env::var(PALETTE_ENV).ok().as_deref(),
        );
        settings
    }

    /// Unknown names fall back to `circle` and `white`
    fn apply_names(&mut self, shape: Option<&str>, palette: Option<&str>) {
        if let Some(name) = shape {
            self.shape = ShapeKind::from_name(name);
            log::info!("Starting shape: {}", self.shape.name());
        }
        if let Some(name) = palette {
            self.palette = Palette::from_name(name);
            log::info!("Starting palette: {}", self.palette.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_lookup_falls_back_to_white() {
        assert_eq!(Palette::from_name("Purple"), Palette::Purple);
        assert_eq!(Palette::from_name(" blue "), Palette::Blue);
        assert_eq!(Palette::from_name("octarine"), Palette::White);
    }

    #[test]
    fn test_palette_cycle_wraps() {
        let mut palette = Palette::White;
        for _ in 0..Palette::ALL.len() {
            palette = palette.next();
        }
        assert_eq!(palette, Palette::White);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.shape, ShapeKind::Circle);
        assert_eq!(settings.color_mode, ColorMode::Monochrome);
        assert_eq!(settings.secondary_waves, 3);
        assert_eq!(settings.available_shapes.len(), ShapeKind::ALL.len());
        assert!(settings.particles);
    }

    #[test]
    fn test_named_overrides_fail_soft() {
        let mut settings = Settings::default();
        settings.apply_names(Some("spiral"), Some("green"));
        assert_eq!(settings.shape, ShapeKind::Spiral);
        assert_eq!(settings.palette, Palette::Green);

        settings.apply_names(Some("hexagon"), Some("octarine"));
        assert_eq!(settings.shape, ShapeKind::Circle);
        assert_eq!(settings.palette, Palette::White);

        settings.apply_names(None, None);
        assert_eq!(settings.shape, ShapeKind::Circle);
    }
}
