pub mod apu;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod mem_block;
pub mod memory;
pub mod nes;
pub mod ppu;
pub mod reset_kind;
pub mod rng;
pub mod state;

pub use nes::{Nes, NesBuilder};

#[cfg(test)]
pub(crate) mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Number of randomized seeds each instruction-level CPU test runs under.
    pub(crate) const TEST_COUNT: u32 = 200;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_file(true)
            .with_line_number(true)
            .with_max_level(Level::TRACE)
            .pretty()
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
    }
}
