/// Keys held during the current tick, supplied by whatever input device
/// fronts the simulation (terminal, test harness).
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
    pub special: bool,
    pub quit: bool,
}

impl InputState {
    pub fn idle() -> Self {
        Self::default()
    }
}
