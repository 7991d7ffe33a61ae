/// Distinguishes a cold boot from a soft reset (the console's reset button).
///
/// The two differ in exactly one observable way at this layer: `PowerOn`
/// randomizes CPU RAM before the CPU/PPU/APU reset sequence runs; `Soft`
/// leaves RAM contents exactly as they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetKind {
    /// Cold boot: RAM contents are indeterminate on real hardware.
    PowerOn,
    /// Reset line pulsed while already running: RAM is preserved.
    Soft,
}

impl ResetKind {
    /// Whether this reset kind scrambles CPU RAM before handing control back
    /// to the CPU.
    pub const fn randomizes_ram(self) -> bool {
        matches!(self, Self::PowerOn)
    }
}
