pub mod menu;
pub mod page;
pub mod stack;
pub mod theme;

#[cfg(not(target_arch = "wasm32"))]
pub mod backend;
#[cfg(not(target_arch = "wasm32"))]
pub mod content;

#[cfg(target_arch = "wasm32")]
pub mod frontend;
