//! Engine backend implementations.
//!
//! Selector rules and URL parameters follow each engine's server-side
//! HTML as of writing; they are brittle by nature and carry no
//! stability guarantee.

mod aol;
mod ask;
mod bing;
mod duckduckgo;
mod startpage;
mod torch;
mod yahoo;

pub use aol::Aol;
pub use ask::Ask;
pub use bing::Bing;
pub use duckduckgo::DuckDuckGo;
pub use startpage::Startpage;
pub use torch::Torch;
pub use yahoo::Yahoo;
