//! `FrMsg` — a diagnostic message attached to `FrRawData`.

#[derive(Debug, Clone, Default)]
pub struct FrMsg {
    pub message: String,
    pub severity: i32,
    pub alarm: u32,
}
