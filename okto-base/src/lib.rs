//! Core of the okto CHIP-8 emulator.
//!
//! [`machine::Machine`] owns the whole machine state and executes one
//! instruction per [`step`](machine::Machine::step); [`runner`] drives the
//! instruction and timer clocks on a dedicated thread. Rendering, input
//! mapping and ROM file handling belong to a frontend.

pub mod font;
pub mod instruction;
pub mod keypad;
pub mod machine;
pub mod memory;
pub mod runner;
pub mod screen;
pub mod timer;
