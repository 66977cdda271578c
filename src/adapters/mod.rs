//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter      | Implements      | Connects to                     |
//! |--------------|-----------------|---------------------------------|
//! | `mem_link`   | SerialPort      | In-memory byte queues (tests)   |
//! | `stdio_link` | SerialPort      | Process stdin / stdout          |
//! | `delay`      | `DelayNs`       | `std::thread::sleep` / nothing  |

pub mod delay;
pub mod mem_link;
pub mod stdio_link;

pub use delay::{NoopDelay, StdDelay};
pub use mem_link::MemLink;
pub use stdio_link::StdioLink;
