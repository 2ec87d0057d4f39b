/// Presentation state for a node, eased toward its targets every tick
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub label_opacity: f32,
    /// Multiplier on the base label size
    pub label_scale: f32,
    /// Current glow sprite size (pulse and emphasis applied)
    pub glow_size: f32,
    /// Pulse phase in `[0, 2π)`, stable per node id
    pub phase: f32,
}

impl NodeVisual {
    pub fn new(phase: f32, base_glow: f32) -> Self {
        NodeVisual {
            phase,
            glow_size: base_glow,
            ..Default::default()
        }
    }
}

impl Default for NodeVisual {
    fn default() -> Self {
        NodeVisual {
            label_opacity: 0.5,
            label_scale: 0.8,
            glow_size: 5.0,
            phase: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkVisual {
    pub opacity: f32,
}

impl Default for LinkVisual {
    fn default() -> Self {
        LinkVisual { opacity: 0.05 }
    }
}
