/// Procedural pattern a wave is drawn with, fixed when the wave is spawned
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Mandala,
    Spiral,
    Fireworks,
    Fractal,
    EtherealPlasma,
    QuantumSingularity,
    FractalConsciousness,
    CosmicMandala,
    FractalDendrite,
    QuantumInterference,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 13] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Triangle,
        ShapeKind::Mandala,
        ShapeKind::Spiral,
        ShapeKind::Fireworks,
        ShapeKind::Fractal,
        ShapeKind::EtherealPlasma,
        ShapeKind::QuantumSingularity,
        ShapeKind::FractalConsciousness,
        ShapeKind::CosmicMandala,
        ShapeKind::FractalDendrite,
        ShapeKind::QuantumInterference,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Square => "square",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Mandala => "mandala",
            ShapeKind::Spiral => "spiral",
            ShapeKind::Fireworks => "fireworks",
            ShapeKind::Fractal => "fractal",
            ShapeKind::EtherealPlasma => "ethereal-plasma",
            ShapeKind::QuantumSingularity => "quantum-singularity",
            ShapeKind::FractalConsciousness => "fractal-consciousness",
            ShapeKind::CosmicMandala => "cosmic-mandala",
            ShapeKind::FractalDendrite => "fractal-dendrite",
            ShapeKind::QuantumInterference => "quantum-interference",
        }
    }

    /// Parse a shape identifier; unknown names fall back to `circle`
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(ShapeKind::Circle)
    }

    /// Next shape in declaration order, wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Whether the pattern animates with wall-clock time
    pub fn is_time_varying(self) -> bool {
        !matches!(
            self,
            ShapeKind::Circle | ShapeKind::Square | ShapeKind::Triangle | ShapeKind::Mandala
        )
    }
}
